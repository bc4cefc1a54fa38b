use super::chain::normalize_chain;
use super::config::EngineConfig;
use super::levels::{ChartLevels, chart_levels};
use super::models::{BestStrike, SetupResult, Snapshot};
use super::selector::select_best_strike;
use super::setup::compute_setup;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Both pipelines run over one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotReport {
    pub symbol: String,
    pub bars: usize,
    pub setup: Option<SetupResult>,
    /// Why no setup was produced, when it was not.
    pub no_signal: Option<String>,
    pub levels: Option<ChartLevels>,
    pub best_strike: Option<BestStrike>,
}

impl SnapshotReport {
    pub fn has_signal(&self) -> bool {
        self.setup.is_some()
    }
}

/// Run the setup composer and the options selector over `snapshot`.
///
/// The two pipelines are independent: a missing setup does not prevent a
/// strike selection and vice versa.
pub fn process_snapshot(snapshot: &Snapshot, cfg: &EngineConfig) -> SnapshotReport {
    let (setup, no_signal) = match compute_setup(&snapshot.bars, &cfg.risk) {
        Ok(setup) => (Some(setup), None),
        Err(e) => {
            if e.is_no_signal() {
                info!(symbol = %snapshot.symbol, reason = %e, "no signal");
            } else {
                warn!(symbol = %snapshot.symbol, error = %e, "setup rejected input");
            }
            (None, Some(e.to_string()))
        }
    };

    let levels = setup.as_ref().and_then(|s| match chart_levels(&snapshot.bars, s) {
        Ok(levels) => Some(levels),
        Err(e) => {
            warn!(symbol = %snapshot.symbol, error = %e, "chart levels unavailable");
            None
        }
    });

    let best_strike = snapshot.chain.as_ref().map(|chain| {
        let candidates = normalize_chain(&snapshot.symbol, chain, &cfg.pricing);
        select_best_strike(&candidates, chain.spot, &cfg.options)
    });

    SnapshotReport {
        symbol: snapshot.symbol.clone(),
        bars: snapshot.bars.len(),
        setup,
        no_signal,
        levels,
        best_strike,
    }
}

/// Process many snapshots in parallel; output order matches input order.
pub fn process_batch(snapshots: &[Snapshot], cfg: &EngineConfig) -> Vec<SnapshotReport> {
    snapshots
        .par_iter()
        .map(|snapshot| process_snapshot(snapshot, cfg))
        .collect()
}
