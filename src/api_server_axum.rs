use crate::engine::bars::{Timeframes, compact_timeframes};
use crate::engine::{
    self, BestStrike, ChartLevels, EngineConfig, IndicatorFrame, OptionSide, OptionsFilter,
    PriceSeries, PricingConfig, RawChain, RiskConfig, SetupResult, Snapshot, SnapshotReport,
};
use crate::error::EngineError;
use crate::utility::Timer;
use anyhow::Result;
use axum::{
    Router,
    extract::{Query, State},
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// -----------------------------------------------
// API REQUEST/RESPONSE MODELS
// -----------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SeriesRequest {
    pub bars: PriceSeries,
    #[serde(default)]
    pub risk: Option<RiskConfig>,
}

#[derive(Debug, Deserialize)]
pub struct StrikeRequest {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    pub chain: RawChain,
    #[serde(default)]
    pub filter: Option<OptionsFilter>,
    #[serde(default)]
    pub pricing: Option<PricingConfig>,
}

fn default_symbol() -> String {
    "SPY".to_string()
}

#[derive(Debug, Deserialize)]
pub struct DeltaQuery {
    pub spot: f64,
    pub strike: f64,
    pub t_years: f64,
    pub iv: f64,
    #[serde(default)]
    pub rate: f64,
    pub side: OptionSide,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DeltaResponse {
    pub delta: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub processing_time_ms: Option<u64>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T, timer: &Timer) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            processing_time_ms: Some(timer.elapsed_ms()),
        }
    }

    fn failed(error: impl ToString, timer: &Timer) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            processing_time_ms: Some(timer.elapsed_ms()),
        }
    }

    fn from_result(result: Result<T, EngineError>, timer: &Timer) -> Self {
        match result {
            Ok(data) => Self::ok(data, timer),
            Err(e) => Self::failed(e, timer),
        }
    }
}

// -----------------------------------------------
// APPLICATION STATE
// -----------------------------------------------

#[derive(Clone)]
pub struct AppState {
    config: Arc<EngineConfig>,
}

impl AppState {
    pub fn new(config: EngineConfig) -> Self {
        Self { config: Arc::new(config) }
    }
}

// -----------------------------------------------
// API HANDLERS
// -----------------------------------------------

/// POST /api/indicators - RSI and MACD aligned with the bars
async fn post_indicators(Json(req): Json<SeriesRequest>) -> Json<ApiResponse<IndicatorFrame>> {
    let timer = Timer::start_with_threshold("api indicators", 250);
    let frame = engine::compute_indicators(&req.bars);
    Json(ApiResponse::ok(frame, &timer))
}

/// POST /api/timeframes - 5m and 15m views of 1m bars
async fn post_timeframes(Json(req): Json<SeriesRequest>) -> Json<ApiResponse<Timeframes>> {
    let timer = Timer::start_with_threshold("api timeframes", 250);
    Json(ApiResponse::from_result(compact_timeframes(&req.bars), &timer))
}

/// POST /api/setup - Directional setup at the last close
async fn post_setup(
    State(app_state): State<AppState>,
    Json(req): Json<SeriesRequest>,
) -> Json<ApiResponse<SetupResult>> {
    let timer = Timer::start_with_threshold("api setup", 250);
    let risk = req.risk.unwrap_or(app_state.config.risk);
    Json(ApiResponse::from_result(engine::compute_setup(&req.bars, &risk), &timer))
}

/// POST /api/levels - Pivots, swing levels, targets and stop for the hourly chart
async fn post_levels(
    State(app_state): State<AppState>,
    Json(req): Json<SeriesRequest>,
) -> Json<ApiResponse<ChartLevels>> {
    let timer = Timer::start_with_threshold("api levels", 250);
    let risk = req.risk.unwrap_or(app_state.config.risk);
    let result = engine::compute_setup(&req.bars, &risk)
        .and_then(|setup| engine::chart_levels(&req.bars, &setup));
    Json(ApiResponse::from_result(result, &timer))
}

/// POST /api/strike - Best call and put from a raw chain
async fn post_strike(
    State(app_state): State<AppState>,
    Json(req): Json<StrikeRequest>,
) -> Json<ApiResponse<BestStrike>> {
    let timer = Timer::start_with_threshold("api strike", 250);
    let filter = req.filter.unwrap_or(app_state.config.options);
    let pricing = req.pricing.unwrap_or(app_state.config.pricing);

    let candidates = engine::normalize_chain(&req.symbol, &req.chain, &pricing);
    let best = engine::select_best_strike(&candidates, req.chain.spot, &filter);
    Json(ApiResponse::ok(best, &timer))
}

/// POST /api/snapshot - Both pipelines over one snapshot
async fn post_snapshot(
    State(app_state): State<AppState>,
    Json(snapshot): Json<Snapshot>,
) -> Json<ApiResponse<SnapshotReport>> {
    let timer = Timer::start_with_threshold("api snapshot", 250);
    let report = engine::process_snapshot(&snapshot, &app_state.config);
    Json(ApiResponse::ok(report, &timer))
}

/// GET /api/delta?spot=500&strike=505&t_years=0.01&iv=0.2&side=CALL
async fn get_delta(Query(query): Query<DeltaQuery>) -> Json<ApiResponse<DeltaResponse>> {
    let timer = Timer::start_with_threshold("api delta", 250);
    let delta = engine::estimate_delta(query.spot, query.strike, query.t_years, query.iv, query.rate, query.side);
    Json(ApiResponse::ok(DeltaResponse { delta }, &timer))
}

/// GET /api/config - Active engine configuration
async fn get_config(State(app_state): State<AppState>) -> Json<ApiResponse<EngineConfig>> {
    let timer = Timer::start_with_threshold("api config", 250);
    Json(ApiResponse::ok(*app_state.config, &timer))
}

// -----------------------------------------------
// SERVER SETUP
// -----------------------------------------------

pub fn router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/indicators", post(post_indicators))
        .route("/api/timeframes", post(post_timeframes))
        .route("/api/setup", post(post_setup))
        .route("/api/levels", post(post_levels))
        .route("/api/strike", post(post_strike))
        .route("/api/snapshot", post(post_snapshot))
        .route("/api/delta", get(get_delta))
        .route("/api/config", get(get_config))
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

pub async fn start_server(port: u16, config: EngineConfig) -> Result<()> {
    let app = router(AppState::new(config));

    let addr = format!("127.0.0.1:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(%addr, "engine API listening");
    println!("🚀 Engine API running on http://{}", addr);
    println!("📋 Available endpoints:");
    println!("   POST /api/indicators");
    println!("   POST /api/timeframes");
    println!("   POST /api/setup");
    println!("   POST /api/levels");
    println!("   POST /api/strike");
    println!("   POST /api/snapshot");
    println!("   GET  /api/delta?spot=500&strike=505&t_years=0.01&iv=0.2&side=CALL");
    println!("   GET  /api/config");
    println!();

    axum::serve(listener, app).await?;
    Ok(())
}
