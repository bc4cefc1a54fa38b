use super::config::{BEARISH_RSI, BULLISH_RSI, MIN_SETUP_BARS, RiskConfig};
use super::indicators::compute_indicators;
use super::models::{Bias, PriceSeries, SetupResult};
use crate::error::{EngineError, EngineResult};
use tracing::debug;

/// Classify momentum from the last MACD/signal pair and the last RSI.
pub fn classify_bias(macd_last: f64, signal_last: f64, rsi_last: f64) -> Bias {
    if macd_last > signal_last && rsi_last > BULLISH_RSI {
        Bias::Bullish
    } else if macd_last < signal_last && rsi_last < BEARISH_RSI {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}

/// Targets above and stop below `price`.
///
/// Offsets are fixed upward for targets and downward for the stop; they are
/// not re-signed by bias, so a bearish setup still reports targets above price.
pub fn risk_levels(price: f64, risk: &RiskConfig) -> ([f64; 3], f64) {
    let targets = [
        price * (1.0 + risk.target1_pct),
        price * (1.0 + risk.target2_pct),
        price * (1.0 + risk.target3_pct),
    ];
    let stop = price * (1.0 - risk.stop_pct);
    (targets, stop)
}

/// Directional setup at the last close of `series`.
///
/// Fails with [`EngineError::InsufficientData`] for fewer than 50 bars, or
/// when the last RSI reading is missing or still warming up.
pub fn compute_setup(series: &PriceSeries, risk: &RiskConfig) -> EngineResult<SetupResult> {
    let insufficient = EngineError::InsufficientData {
        required: MIN_SETUP_BARS,
        actual: series.len(),
    };
    if series.len() < MIN_SETUP_BARS {
        return Err(insufficient);
    }
    let Some(last_bar) = series.last() else {
        return Err(insufficient);
    };

    let frame = compute_indicators(series);
    let last = frame.len() - 1;
    let Some(rsi_last) = frame.confident_rsi(last) else {
        return Err(insufficient);
    };
    let macd_last = frame.macd_line[last];
    let signal_last = frame.signal_line[last];

    let bias = classify_bias(macd_last, signal_last, rsi_last);
    let price = last_bar.close;
    let (targets, stop) = risk_levels(price, risk);

    debug!(
        bars = series.len(),
        price,
        rsi = rsi_last,
        macd = macd_last,
        signal = signal_last,
        %bias,
        "setup classified"
    );

    Ok(SetupResult { price, targets, stop, bias })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::models::PriceBar;
    use chrono::{Duration, TimeZone, Utc};

    fn series(closes: &[f64]) -> PriceSeries {
        let t0 = Utc.with_ymd_and_hms(2025, 3, 3, 14, 30, 0).unwrap();
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::new(t0 + Duration::minutes(i as i64), c, c, c, c, 1.0))
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_classify_bias_rules() {
        assert_eq!(classify_bias(1.0, 0.5, 60.0), Bias::Bullish);
        assert_eq!(classify_bias(-1.0, 0.5, 40.0), Bias::Bearish);
        // disagreement
        assert_eq!(classify_bias(1.0, 0.5, 40.0), Bias::Neutral);
        assert_eq!(classify_bias(-1.0, 0.5, 60.0), Bias::Neutral);
        // boundaries are exclusive
        assert_eq!(classify_bias(1.0, 0.5, 55.0), Bias::Neutral);
        assert_eq!(classify_bias(-1.0, 0.5, 45.0), Bias::Neutral);
    }

    #[test]
    fn test_risk_levels_default_offsets() {
        let (targets, stop) = risk_levels(100.0, &RiskConfig::default());
        assert!((targets[0] - 100.5).abs() < 1e-9);
        assert!((targets[1] - 101.0).abs() < 1e-9);
        assert!((targets[2] - 101.5).abs() < 1e-9);
        assert!((stop - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_series_is_insufficient() {
        let s = series(&vec![100.0; 49]);
        let err = compute_setup(&s, &RiskConfig::default()).unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { required: 50, actual: 49 });
        assert!(err.is_no_signal());

        let err = compute_setup(&PriceSeries::empty(), &RiskConfig::default()).unwrap_err();
        assert!(err.is_no_signal());
    }

    #[test]
    fn test_falling_series_is_bearish_with_upward_targets() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64 * 0.5).collect();
        let setup = compute_setup(&series(&closes), &RiskConfig::default()).unwrap();
        assert_eq!(setup.bias, Bias::Bearish);
        assert_eq!(setup.price, 170.5);
        assert!(setup.targets.iter().all(|t| *t > setup.price));
        assert!(setup.stop < setup.price);
    }
}
