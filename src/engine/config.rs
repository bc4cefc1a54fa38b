use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

// -----------------------------------------------
// SETUP COMPOSER
// -----------------------------------------------
pub const MIN_SETUP_BARS: usize = 50;
pub const RSI_PERIOD: usize = 14;
pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;
pub const BULLISH_RSI: f64 = 55.0;
pub const BEARISH_RSI: f64 = 45.0;

pub const DEFAULT_STOP_PCT: f64 = 0.01;
pub const DEFAULT_TARGET1_PCT: f64 = 0.005;
pub const DEFAULT_TARGET2_PCT: f64 = 0.01;
pub const DEFAULT_TARGET3_PCT: f64 = 0.015;

// -----------------------------------------------
// LEVELS
// -----------------------------------------------
pub const SWING_WINDOW_RADIUS: usize = 2;
pub const SWING_MERGE_TOLERANCE: f64 = 0.003;
pub const MAX_SWING_LEVELS: usize = 12;
pub const CHART_SWING_LOOKBACK: usize = 200;
pub const CHART_BAR_MINUTES: i64 = 60;

// -----------------------------------------------
// OPTIONS FILTER
// -----------------------------------------------
pub const DEFAULT_DELTA_MIN: f64 = 0.20;
pub const DEFAULT_DELTA_MAX: f64 = 0.35;
pub const DEFAULT_MAX_SPREAD: f64 = 0.30;
pub const DEFAULT_MIN_VOLUME: u64 = 200;
pub const DEFAULT_MIN_OPEN_INTEREST: u64 = 500;

// -----------------------------------------------
// PRICING
// -----------------------------------------------
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.0;
pub const DEFAULT_FALLBACK_IV: f64 = 0.25;
pub const MIN_IMPLIED_VOL: f64 = 0.01;
pub const MIN_EXPIRY_SECS: f64 = 60.0;
pub const SECONDS_PER_YEAR: f64 = 365.0 * 24.0 * 3600.0;

/// Percentage offsets applied to the last close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    pub stop_pct: f64,
    pub target1_pct: f64,
    pub target2_pct: f64,
    pub target3_pct: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            stop_pct: DEFAULT_STOP_PCT,
            target1_pct: DEFAULT_TARGET1_PCT,
            target2_pct: DEFAULT_TARGET2_PCT,
            target3_pct: DEFAULT_TARGET3_PCT,
        }
    }
}

impl RiskConfig {
    pub fn from_env() -> Self {
        Self {
            stop_pct: env_or("DEFAULT_STOP_PCT", DEFAULT_STOP_PCT),
            target1_pct: env_or("DEFAULT_TARGET1_PCT", DEFAULT_TARGET1_PCT),
            target2_pct: env_or("DEFAULT_TARGET2_PCT", DEFAULT_TARGET2_PCT),
            target3_pct: env_or("DEFAULT_TARGET3_PCT", DEFAULT_TARGET3_PCT),
        }
    }
}

/// Risk and liquidity bounds for option candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionsFilter {
    pub delta_min: f64,
    pub delta_max: f64,
    pub max_spread: f64,
    pub min_volume: u64,
    pub min_open_interest: u64,
}

impl Default for OptionsFilter {
    fn default() -> Self {
        Self {
            delta_min: DEFAULT_DELTA_MIN,
            delta_max: DEFAULT_DELTA_MAX,
            max_spread: DEFAULT_MAX_SPREAD,
            min_volume: DEFAULT_MIN_VOLUME,
            min_open_interest: DEFAULT_MIN_OPEN_INTEREST,
        }
    }
}

impl OptionsFilter {
    pub fn from_env() -> Self {
        Self {
            delta_min: env_or("OPT_PREFERRED_DELTA_MIN", DEFAULT_DELTA_MIN),
            delta_max: env_or("OPT_PREFERRED_DELTA_MAX", DEFAULT_DELTA_MAX),
            max_spread: env_or("OPT_MAX_SPREAD", DEFAULT_MAX_SPREAD),
            min_volume: env_or("OPT_MIN_VOLUME", DEFAULT_MIN_VOLUME),
            min_open_interest: env_or("OPT_MIN_OI", DEFAULT_MIN_OPEN_INTEREST),
        }
    }
}

/// Inputs for turning raw chain rows into candidates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    pub rate: f64,
    pub fallback_iv: f64,
    pub min_iv: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rate: DEFAULT_RISK_FREE_RATE,
            fallback_iv: DEFAULT_FALLBACK_IV,
            min_iv: MIN_IMPLIED_VOL,
        }
    }
}

impl PricingConfig {
    pub fn from_env() -> Self {
        Self {
            rate: env_or("OPT_RISK_FREE_RATE", DEFAULT_RISK_FREE_RATE),
            fallback_iv: env_or("OPT_FALLBACK_IV", DEFAULT_FALLBACK_IV),
            min_iv: MIN_IMPLIED_VOL,
        }
    }
}

/// Full engine configuration, passed explicitly into each operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub risk: RiskConfig,
    pub options: OptionsFilter,
    pub pricing: PricingConfig,
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self {
            risk: RiskConfig::from_env(),
            options: OptionsFilter::from_env(),
            pricing: PricingConfig::from_env(),
        }
    }
}

/// Read `key` from the environment, keeping `default` when unset or unparseable.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    parse_or(key, std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T>(key: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr + Copy,
{
    match raw {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, "ignoring unparseable config value");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.risk.stop_pct, 0.01);
        assert_eq!(cfg.risk.target3_pct, 0.015);
        assert_eq!(cfg.options.delta_min, 0.20);
        assert_eq!(cfg.options.delta_max, 0.35);
        assert_eq!(cfg.options.min_volume, 200);
        assert_eq!(cfg.options.min_open_interest, 500);
        assert_eq!(cfg.pricing.fallback_iv, 0.25);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: OptionsFilter = serde_json::from_str(r#"{"max_spread": 0.5}"#).unwrap();
        assert_eq!(cfg.max_spread, 0.5);
        assert_eq!(cfg.min_volume, DEFAULT_MIN_VOLUME);
    }

    #[test]
    fn test_parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or("OPT_MIN_VOLUME", Some("not-a-number"), 7u64), 7);
        assert_eq!(parse_or("OPT_MIN_VOLUME", Some(" 42 "), 7u64), 42);
        assert_eq!(parse_or("OPT_MIN_VOLUME", None, 7u64), 7);
        assert_eq!(parse_or("OPT_MAX_SPREAD", Some("0.5"), 0.3f64), 0.5);
    }
}
