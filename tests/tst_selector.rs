use spx_alert_engine::engine::{
    OptionCandidate, OptionSide, OptionsFilter, passes_filter, select_best_strike,
};
use chrono::NaiveDate;
use proptest::prelude::*;

fn candidate(strike: f64, side: OptionSide, delta: f64, spread: f64, volume: u64, oi: u64) -> OptionCandidate {
    OptionCandidate {
        symbol: "SPY".to_string(),
        strike,
        side,
        delta,
        bid: 2.0,
        ask: 2.0 + spread,
        spread,
        volume,
        open_interest: oi,
        expiry: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
    }
}

fn arb_side() -> impl Strategy<Value = OptionSide> {
    prop_oneof![Just(OptionSide::Call), Just(OptionSide::Put)]
}

prop_compose! {
    fn arb_candidate()(
        strike in 480.0f64..520.0,
        side in arb_side(),
        delta in 0.0f64..1.0,
        spread in 0.0f64..1.0,
        volume in 0u64..2_000,
        oi in 0u64..4_000,
    ) -> OptionCandidate {
        let signed = match side {
            OptionSide::Call => delta,
            OptionSide::Put => -delta,
        };
        candidate(strike.round(), side, signed, spread, volume, oi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_the_money_call_is_selected() {
        let chain = vec![
            candidate(500.0, OptionSide::Call, 0.28, 0.10, 500, 1000),
            candidate(505.0, OptionSide::Call, 0.22, 0.05, 900, 3000),
        ];
        let best = select_best_strike(&chain, 500.0, &OptionsFilter::default());
        let call = best.call.unwrap();
        assert_eq!(call.strike, 500.0);
        assert_eq!(call.delta, 0.28);
        assert!(best.put.is_none());
        assert_eq!(best.underlying, 500.0);
    }

    #[test]
    fn test_wide_puts_are_absent() {
        let chain = vec![
            candidate(500.0, OptionSide::Call, 0.30, 0.10, 500, 1000),
            candidate(495.0, OptionSide::Put, -0.30, 0.5, 5000, 9000),
            candidate(490.0, OptionSide::Put, -0.25, 0.5, 5000, 9000),
        ];
        let best = select_best_strike(&chain, 500.0, &OptionsFilter::default());
        assert!(best.call.is_some());
        assert!(best.put.is_none());
    }

    #[test]
    fn test_put_delta_is_judged_by_magnitude() {
        let chain = vec![
            candidate(498.0, OptionSide::Put, -0.30, 0.10, 500, 1000),
            candidate(500.0, OptionSide::Put, -0.50, 0.10, 500, 1000),
        ];
        let best = select_best_strike(&chain, 500.0, &OptionsFilter::default());
        assert_eq!(best.put.map(|p| p.strike), Some(498.0));
    }

    #[test]
    fn test_band_edges_are_inclusive() {
        let f = OptionsFilter::default();
        assert!(passes_filter(&candidate(500.0, OptionSide::Call, 0.20, 0.30, 200, 500), &f));
        assert!(passes_filter(&candidate(500.0, OptionSide::Call, 0.35, 0.0, 200, 500), &f));
        assert!(!passes_filter(&candidate(500.0, OptionSide::Call, 0.36, 0.0, 200, 500), &f));
        assert!(!passes_filter(&candidate(500.0, OptionSide::Call, 0.30, 0.31, 200, 500), &f));
        assert!(!passes_filter(&candidate(500.0, OptionSide::Call, 0.30, 0.1, 199, 500), &f));
        assert!(!passes_filter(&candidate(500.0, OptionSide::Call, 0.30, 0.1, 200, 499), &f));
    }

    #[test]
    fn test_empty_chain() {
        let best = select_best_strike(&[], 500.0, &OptionsFilter::default());
        assert!(best.call.is_none() && best.put.is_none());
    }

    proptest! {
        #[test]
        fn selected_candidates_pass_the_filter(
            chain in proptest::collection::vec(arb_candidate(), 0..40),
            spot in 480.0f64..520.0,
        ) {
            let filter = OptionsFilter::default();
            let best = select_best_strike(&chain, spot, &filter);

            for (picked, side) in [(&best.call, OptionSide::Call), (&best.put, OptionSide::Put)] {
                match picked {
                    Some(c) => {
                        prop_assert_eq!(c.side, side);
                        prop_assert!(passes_filter(c, &filter));
                        // Nothing passing on the same side sits closer to spot.
                        let dist = (c.strike - spot).abs();
                        for other in chain.iter().filter(|o| o.side == side && passes_filter(o, &filter)) {
                            prop_assert!((other.strike - spot).abs() >= dist);
                        }
                    }
                    None => prop_assert!(
                        !chain.iter().any(|o| o.side == side && passes_filter(o, &filter))
                    ),
                }
            }
        }

        #[test]
        fn selection_is_idempotent(
            chain in proptest::collection::vec(arb_candidate(), 0..40),
            spot in 480.0f64..520.0,
        ) {
            let filter = OptionsFilter::default();
            let first = select_best_strike(&chain, spot, &filter);
            let second = select_best_strike(&chain, spot, &filter);
            prop_assert_eq!(first, second);
        }
    }
}
