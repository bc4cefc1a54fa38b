use spx_alert_engine::engine::session::{is_market_open, pick_expiry, time_to_expiry_years};
use spx_alert_engine::engine::{
    OptionSide, OptionsFilter, PricingConfig, RawChain, RawOptionRow, estimate_delta,
    normalize_chain, select_best_strike,
};
use chrono::{NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

fn expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn row(strike: f64, side: OptionSide, bid: f64, ask: f64, iv: Option<f64>) -> RawOptionRow {
    RawOptionRow {
        strike,
        side,
        bid: Some(bid),
        ask: Some(ask),
        volume: Some(800),
        open_interest: Some(2_000),
        implied_volatility: iv,
        expiry: expiry(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards_return_zero() {
        for side in [OptionSide::Call, OptionSide::Put] {
            assert_eq!(estimate_delta(500.0, 500.0, -0.01, 0.2, 0.0, side), 0.0);
            assert_eq!(estimate_delta(500.0, 500.0, 0.01, -0.2, 0.0, side), 0.0);
            assert_eq!(estimate_delta(500.0, 0.0, 0.01, 0.2, 0.0, side), 0.0);
            assert_eq!(estimate_delta(500.0, 500.0, f64::INFINITY, 0.2, 0.0, side), 0.0);
        }
    }

    #[test]
    fn test_call_delta_falls_as_strike_rises() {
        let strikes = [490.0, 495.0, 500.0, 505.0, 510.0];
        let deltas: Vec<f64> = strikes
            .iter()
            .map(|&k| estimate_delta(500.0, k, 2.0 / 365.0, 0.18, 0.0, OptionSide::Call))
            .collect();
        assert!(deltas.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_time_to_expiry_same_day() {
        // 15:00 New York, one hour before the close.
        let now = Utc.with_ymd_and_hms(2025, 3, 3, 20, 0, 0).unwrap();
        let t = time_to_expiry_years(now, expiry());
        assert!((t - 3600.0 / (365.0 * 24.0 * 3600.0)).abs() < 1e-12);

        // After the close the clock is pushed out six hours.
        let late = Utc.with_ymd_and_hms(2025, 3, 3, 22, 0, 0).unwrap();
        let t = time_to_expiry_years(late, expiry());
        assert!((t - 6.0 * 3600.0 / (365.0 * 24.0 * 3600.0)).abs() < 1e-12);
    }

    #[test]
    fn test_pick_expiry_prefers_today() {
        let today = expiry();
        let later = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
        assert_eq!(pick_expiry(&[later, today], today), Some(today));
        assert_eq!(pick_expiry(&[later], today), Some(later));
        assert_eq!(pick_expiry(&[], today), None);
    }

    #[test]
    fn test_market_hours() {
        // 2025-03-03 is a Monday; New York is UTC-5.
        assert!(is_market_open(Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap()));
        assert!(!is_market_open(Utc.with_ymd_and_hms(2025, 3, 3, 13, 0, 0).unwrap()));
        assert!(!is_market_open(Utc.with_ymd_and_hms(2025, 3, 1, 15, 0, 0).unwrap()));
    }

    #[test]
    fn test_chain_to_best_strike() {
        // Far enough out of the money to land in the default delta band.
        let chain = RawChain {
            spot: 500.0,
            as_of: Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap(),
            rows: vec![
                row(500.0, OptionSide::Call, 1.90, 2.00, Some(0.15)),
                row(502.0, OptionSide::Call, 0.95, 1.05, Some(0.15)),
                row(498.0, OptionSide::Put, 0.95, 1.05, Some(0.15)),
                row(497.0, OptionSide::Put, 0.60, 1.40, Some(0.15)),
                row(503.0, OptionSide::Call, 0.0, 0.0, None),
            ],
        };
        let candidates = normalize_chain("SPY", &chain, &PricingConfig::default());
        assert_eq!(candidates.len(), 4);

        for c in &candidates {
            match c.side {
                OptionSide::Call => assert!(c.delta > 0.0),
                OptionSide::Put => assert!(c.delta < 0.0),
            }
        }

        let wide = OptionsFilter { delta_min: 0.0, delta_max: 1.0, ..OptionsFilter::default() };
        let best = select_best_strike(&candidates, chain.spot, &wide);
        assert_eq!(best.call.map(|c| c.strike), Some(500.0));
        // 497 is too wide; 498 is the only put left.
        assert_eq!(best.put.map(|p| p.strike), Some(498.0));
    }

    #[test]
    fn test_missing_iv_uses_fallback() {
        let as_of = Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap();
        let chain = RawChain {
            spot: 500.0,
            as_of,
            rows: vec![row(505.0, OptionSide::Call, 1.0, 1.1, None)],
        };
        let pricing = PricingConfig::default();
        let out = normalize_chain("SPY", &chain, &pricing);
        let t = time_to_expiry_years(as_of, expiry());
        let expected = estimate_delta(500.0, 505.0, t, pricing.fallback_iv, pricing.rate, OptionSide::Call);
        assert_eq!(out[0].delta, expected);
    }

    proptest! {
        #[test]
        fn call_minus_put_is_one(
            spot in 50.0f64..1_000.0,
            moneyness in 0.8f64..1.2,
            t in 0.0005f64..2.0,
            iv in 0.01f64..1.5,
            rate in -0.01f64..0.08,
        ) {
            let strike = spot * moneyness;
            let call = estimate_delta(spot, strike, t, iv, rate, OptionSide::Call);
            let put = estimate_delta(spot, strike, t, iv, rate, OptionSide::Put);
            prop_assert!((call - put - 1.0).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&call));
            prop_assert!((-1.0..=0.0).contains(&put));
        }
    }
}
