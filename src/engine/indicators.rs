//! Stateless indicator functions over ordered price sequences.
//!
//! Every function returns output aligned index-for-index with its input and
//! never yields NaN or infinity for finite input.

use super::config::{
    MACD_FAST, MACD_SIGNAL, MACD_SLOW, MAX_SWING_LEVELS, RSI_PERIOD, SWING_MERGE_TOLERANCE,
    SWING_WINDOW_RADIUS,
};
use super::models::{IndicatorFrame, PivotSet, PriceBar, PriceSeries, SwingLevel};
use serde::{Deserialize, Serialize};

/// MACD line, signal line and histogram, aligned with the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Macd {
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// Exponential moving average with `α = 2/(span+1)`.
///
/// Seeded with the first observation (no look-ahead):
///   out[0] = x[0]
///   out[i] = α·x[i] + (1−α)·out[i−1]
///
/// A `span` of 0 is treated as 1, which makes the EMA follow the input.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);
    smooth(values, alpha)
}

fn smooth(values: &[f64], alpha: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Relative Strength Index with Wilder-style exponential smoothing
/// (centre of mass `period − 1`, i.e. `α = 1/period`).
///
/// Position 0 has no prior change and is `None`. Where the smoothed loss is
/// exactly zero the reading is 100. Non-finite inputs produce `None` at that
/// position and leave the smoothing state untouched.
///
/// The first `period` positions are under-determined; see
/// [`IndicatorFrame::confident_rsi`].
pub fn rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let alpha = 1.0 / period.max(1) as f64;
    let mut out = Vec::with_capacity(values.len());

    let mut prev_close: Option<f64> = None;
    let mut averages: Option<(f64, f64)> = None;

    for &close in values {
        if !close.is_finite() {
            out.push(None);
            continue;
        }
        let Some(prev) = prev_close.replace(close) else {
            out.push(None);
            continue;
        };

        let change = close - prev;
        let gain = change.max(0.0);
        let loss = (-change).max(0.0);

        let (avg_gain, avg_loss) = match averages {
            None => (gain, loss),
            Some((g, l)) => (alpha * gain + (1.0 - alpha) * g, alpha * loss + (1.0 - alpha) * l),
        };
        averages = Some((avg_gain, avg_loss));

        let value = if avg_loss == 0.0 {
            100.0
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        };
        out.push(Some(value.clamp(0.0, 100.0)));
    }
    out
}

pub fn macd(values: &[f64], fast: usize, slow: usize, signal: usize) -> Macd {
    let fast_ema = ema(values, fast);
    let slow_ema = ema(values, slow);
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal_line = ema(&macd_line, signal);
    let histogram = macd_line
        .iter()
        .zip(&signal_line)
        .map(|(m, s)| m - s)
        .collect();

    Macd { macd_line, signal_line, histogram }
}

/// Floor-trader pivots from one completed bar.
///
/// S1 is anchored on the close (`2P - C`), so unlike R1 it is not a mirror
/// of the range and the levels are not guaranteed to be ordered.
pub fn pivot_points(high: f64, low: f64, close: f64) -> PivotSet {
    let p = (high + low + close) / 3.0;
    PivotSet {
        p,
        r1: 2.0 * p - low,
        s1: 2.0 * p - close,
        r2: p + (high - low),
        s2: p - (high - low),
        r3: high + 2.0 * (p - low),
        s3: low - 2.0 * (high - p),
    }
}

/// Local extrema of the closes within the last `lookback` bars.
///
/// A point qualifies when it is the max (or min) of the 5-point window
/// centred on it and that window is not flat. Levels are sorted by price,
/// any level within 0.3% of the window's mean close of the previously kept
/// level is dropped, and the last 12 are returned.
pub fn swing_levels(bars: &[PriceBar], lookback: usize) -> Vec<SwingLevel> {
    let start = bars.len().saturating_sub(lookback);
    let window = &bars[start..];
    let radius = SWING_WINDOW_RADIUS;
    if window.len() < 2 * radius + 1 {
        return Vec::new();
    }

    let closes: Vec<f64> = window.iter().map(|b| b.close).collect();
    let mean = closes.iter().sum::<f64>() / closes.len() as f64;

    let mut levels = Vec::new();
    for i in radius..closes.len() - radius {
        let neighbourhood = &closes[i - radius..=i + radius];
        let hi = neighbourhood.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = neighbourhood.iter().copied().fold(f64::INFINITY, f64::min);
        if hi <= lo {
            continue;
        }
        if closes[i] == hi || closes[i] == lo {
            levels.push(SwingLevel { timestamp: window[i].timestamp, price: closes[i] });
        }
    }

    // Stable: equal prices keep time order, so the earliest wins the merge.
    levels.sort_by(|a, b| a.price.total_cmp(&b.price));

    let tolerance = mean * SWING_MERGE_TOLERANCE;
    let mut pruned: Vec<SwingLevel> = Vec::with_capacity(levels.len());
    for level in levels {
        match pruned.last() {
            Some(kept) if (level.price - kept.price).abs() <= tolerance => {}
            _ => pruned.push(level),
        }
    }

    let keep_from = pruned.len().saturating_sub(MAX_SWING_LEVELS);
    pruned.split_off(keep_from)
}

/// RSI(14) and MACD(12, 26, 9) on the closes of `series`.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorFrame {
    let closes = series.closes();
    let Macd { macd_line, signal_line, histogram } = macd(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);

    IndicatorFrame {
        timestamps: series.timestamps(),
        rsi: rsi(&closes, RSI_PERIOD),
        macd_line,
        signal_line,
        histogram,
        rsi_warmup: RSI_PERIOD,
    }
}
