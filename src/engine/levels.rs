use super::bars::resample;
use super::config::{CHART_BAR_MINUTES, CHART_SWING_LOOKBACK};
use super::indicators::{pivot_points, swing_levels};
use super::models::{PivotSet, PriceSeries, SetupResult, SwingLevel};
use crate::error::EngineResult;
use serde::{Deserialize, Serialize};

/// Horizontal levels for an hourly chart of the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartLevels {
    pub hourly_bars: usize,
    pub last_close: Option<f64>,
    /// From the last completed hourly bar; absent with fewer than two bars.
    pub pivots: Option<PivotSet>,
    pub swings: Vec<SwingLevel>,
    pub targets: [f64; 3],
    pub stop: f64,
}

pub fn chart_levels(series: &PriceSeries, setup: &SetupResult) -> EngineResult<ChartLevels> {
    let hourly = resample(series, CHART_BAR_MINUTES)?;
    let bars = hourly.bars();

    let pivots = match bars {
        [.., prior, _current] => Some(pivot_points(prior.high, prior.low, prior.close)),
        _ => None,
    };
    let swings = swing_levels(bars, CHART_SWING_LOOKBACK.min(bars.len()));

    Ok(ChartLevels {
        hourly_bars: bars.len(),
        last_close: hourly.last().map(|b| b.close),
        pivots,
        swings,
        targets: setup.targets,
        stop: setup.stop,
    })
}
