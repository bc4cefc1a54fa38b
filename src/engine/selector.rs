use super::config::OptionsFilter;
use super::models::{BestStrike, OptionCandidate, OptionSide};
use std::cmp::Ordering;
use tracing::debug;

/// True when `candidate` sits inside every configured bound.
///
/// The delta band applies to magnitude, so puts (negative delta) are
/// judged the same way as calls.
pub fn passes_filter(candidate: &OptionCandidate, filter: &OptionsFilter) -> bool {
    let sensitivity = candidate.delta.abs();
    sensitivity >= filter.delta_min
        && sensitivity <= filter.delta_max
        && candidate.spread <= filter.max_spread
        && candidate.volume >= filter.min_volume
        && candidate.open_interest >= filter.min_open_interest
}

/// Ranking order: strike distance from spot ascending, then spread
/// ascending, then volume descending.
pub fn rank_order(a: &OptionCandidate, b: &OptionCandidate, spot: f64) -> Ordering {
    let dist_a = (a.strike - spot).abs();
    let dist_b = (b.strike - spot).abs();
    dist_a
        .total_cmp(&dist_b)
        .then_with(|| a.spread.total_cmp(&b.spread))
        .then_with(|| b.volume.cmp(&a.volume))
}

/// Best surviving candidate on `side`, or `None` when nothing passes.
///
/// Ties on every ranking key resolve to the earliest row in `chain`.
pub fn select_side<'a>(
    chain: &'a [OptionCandidate],
    side: OptionSide,
    spot: f64,
    filter: &OptionsFilter,
) -> Option<&'a OptionCandidate> {
    let survivors: Vec<&OptionCandidate> = chain
        .iter()
        .filter(|c| c.side == side && passes_filter(c, filter))
        .collect();

    debug!(
        %side,
        offered = chain.iter().filter(|c| c.side == side).count(),
        survivors = survivors.len(),
        "options filter applied"
    );

    // min_by keeps the first of equal elements
    survivors
        .into_iter()
        .min_by(|a, b| rank_order(a, b, spot))
}

/// Best call and best put for `spot`, selected independently.
pub fn select_best_strike(chain: &[OptionCandidate], spot: f64, filter: &OptionsFilter) -> BestStrike {
    BestStrike {
        underlying: spot,
        call: select_side(chain, OptionSide::Call, spot, filter).cloned(),
        put: select_side(chain, OptionSide::Put, spot, filter).cloned(),
    }
}
