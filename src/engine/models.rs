use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// One OHLCV sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl PriceBar {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { timestamp, open, high, low, close, volume }
    }

    /// Checks finiteness, non-negativity and `low <= min(open, close) <= max(open, close) <= high`.
    pub fn check(&self) -> Result<(), String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(format!("{} is not finite", name));
            }
            if value < 0.0 {
                return Err(format!("{} is negative ({})", name, value));
            }
        }

        let body_low = self.open.min(self.close);
        let body_high = self.open.max(self.close);
        if self.low > body_low || body_high > self.high {
            return Err(format!(
                "range violated: low {} / open {} / close {} / high {}",
                self.low, self.open, self.close, self.high
            ));
        }
        Ok(())
    }
}

/// Validated, strictly time-ordered run of bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(bars: Vec<PriceBar>) -> EngineResult<Self> {
        for (index, bar) in bars.iter().enumerate() {
            bar.check()
                .map_err(|reason| EngineError::InvalidBar { index, reason })?;
        }
        if let Some(index) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(EngineError::UnorderedSeries { index: index + 1 });
        }
        Ok(Self { bars })
    }

    pub fn empty() -> Self {
        Self { bars: Vec::new() }
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = EngineError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        PriceSeries::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

/// RSI and MACD aligned index-for-index with the source series.
///
/// `rsi[i]` is `None` where no value can be computed. Values before
/// `rsi_warmup` exist but are under-determined and should not drive decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub timestamps: Vec<DateTime<Utc>>,
    pub rsi: Vec<Option<f64>>,
    pub macd_line: Vec<f64>,
    pub signal_line: Vec<f64>,
    pub histogram: Vec<f64>,
    pub rsi_warmup: usize,
}

impl IndicatorFrame {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// RSI at `index`, only once past the warm-up region.
    pub fn confident_rsi(&self, index: usize) -> Option<f64> {
        if index < self.rsi_warmup {
            return None;
        }
        self.rsi.get(index).copied().flatten()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Bias::Bullish => write!(f, "Bullish"),
            Bias::Bearish => write!(f, "Bearish"),
            Bias::Neutral => write!(f, "Neutral"),
        }
    }
}

/// Directional call with price targets and a stop, taken at the last close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupResult {
    pub price: f64,
    pub targets: [f64; 3],
    pub stop: f64,
    pub bias: Bias,
}

/// Floor-trader pivots from one completed bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotSet {
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "R1")]
    pub r1: f64,
    #[serde(rename = "S1")]
    pub s1: f64,
    #[serde(rename = "R2")]
    pub r2: f64,
    #[serde(rename = "S2")]
    pub s2: f64,
    #[serde(rename = "R3")]
    pub r3: f64,
    #[serde(rename = "S3")]
    pub s3: f64,
}

impl PivotSet {
    /// Levels in label order P, R1, S1, R2, S2, R3, S3.
    pub fn labelled(&self) -> [(&'static str, f64); 7] {
        [
            ("P", self.p),
            ("R1", self.r1),
            ("S1", self.s1),
            ("R2", self.r2),
            ("S2", self.s2),
            ("R3", self.r3),
            ("S3", self.s3),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingLevel {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OptionSide {
    Call,
    Put,
}

impl fmt::Display for OptionSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OptionSide::Call => write!(f, "CALL"),
            OptionSide::Put => write!(f, "PUT"),
        }
    }
}

/// Normalized chain row, ready for filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionCandidate {
    pub symbol: String,
    pub strike: f64,
    pub side: OptionSide,
    pub delta: f64,
    pub bid: f64,
    pub ask: f64,
    pub spread: f64,
    pub volume: u64,
    pub open_interest: u64,
    pub expiry: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestStrike {
    pub underlying: f64,
    pub call: Option<OptionCandidate>,
    pub put: Option<OptionCandidate>,
}

/// Chain row as delivered by the options-chain collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOptionRow {
    pub strike: f64,
    pub side: OptionSide,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default, deserialize_with = "de_count")]
    pub volume: Option<u64>,
    #[serde(default, alias = "oi", deserialize_with = "de_count")]
    pub open_interest: Option<u64>,
    #[serde(default, alias = "impliedVolatility")]
    pub implied_volatility: Option<f64>,
    pub expiry: NaiveDate,
}

/// Contract counts arrive as integers or as floats (`500.0`) from feeds that
/// fill gaps with NaN. Fractions are truncated; negative or non-finite become `None`.
fn de_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?;
    Ok(raw
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.trunc() as u64))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChain {
    pub spot: f64,
    pub as_of: DateTime<Utc>,
    pub rows: Vec<RawOptionRow>,
}

/// Everything one analysis run needs for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub symbol: String,
    pub bars: PriceSeries,
    #[serde(default)]
    pub chain: Option<RawChain>,
}
