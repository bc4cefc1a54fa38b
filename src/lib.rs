pub mod api_server_axum;
pub mod app_config;
pub mod commands;
pub mod engine;
pub mod error;
pub mod logging;
pub mod utility;

// Re-exports for convenience
pub use engine::{
    BestStrike, Bias, EngineConfig, IndicatorFrame, OptionCandidate, OptionSide, OptionsFilter,
    PriceBar, PriceSeries, RiskConfig, SetupResult, compute_indicators, compute_setup,
    estimate_delta, select_best_strike,
};
pub use error::{EngineError, EngineResult};
