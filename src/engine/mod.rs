pub mod bars;
pub mod chain;
pub mod config;
pub mod indicators;
pub mod levels;
pub mod models;
pub mod processor;
pub mod selector;
pub mod sensitivity;
pub mod session;
pub mod setup;

// Re-exports (public API)
pub use config::{EngineConfig, OptionsFilter, PricingConfig, RiskConfig};
pub use models::{
    BestStrike, Bias, IndicatorFrame, OptionCandidate, OptionSide, PivotSet, PriceBar,
    PriceSeries, RawChain, RawOptionRow, SetupResult, Snapshot, SwingLevel,
};
pub use indicators::{compute_indicators, ema, macd, pivot_points, rsi, swing_levels, Macd};
pub use setup::{classify_bias, compute_setup, risk_levels};
pub use sensitivity::{estimate_delta, norm_cdf};
pub use chain::{chain_expiry, normalize_chain};
pub use selector::{passes_filter, rank_order, select_best_strike, select_side};
pub use levels::{chart_levels, ChartLevels};
pub use processor::{process_batch, process_snapshot, SnapshotReport};
