use super::models::{PriceBar, PriceSeries};
use crate::error::EngineResult;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

/// Aggregate `series` into `minutes`-wide buckets aligned to the epoch.
///
/// open = first, high = max, low = min, close = last, volume = sum.
/// Buckets with no source bars are omitted.
pub fn resample(series: &PriceSeries, minutes: i64) -> EngineResult<PriceSeries> {
    let width = minutes.max(1) * 60;
    let mut out: Vec<PriceBar> = Vec::new();
    let mut current: Option<(i64, PriceBar)> = None;

    for bar in series.bars() {
        let bucket = bar.timestamp.timestamp().div_euclid(width) * width;
        match current.as_mut() {
            Some((key, agg)) if *key == bucket => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => {
                if let Some((_, done)) = current.take() {
                    out.push(done);
                }
                let mut start = *bar;
                start.timestamp = bucket_start(bucket, bar.timestamp);
                current = Some((bucket, start));
            }
        }
    }
    if let Some((_, done)) = current {
        out.push(done);
    }

    PriceSeries::new(out)
}

fn bucket_start(epoch_secs: i64, fallback: DateTime<Utc>) -> DateTime<Utc> {
    Utc.timestamp_opt(epoch_secs, 0).single().unwrap_or(fallback)
}

/// The 1m input alongside 5m and 15m views derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct Timeframes {
    pub m1: PriceSeries,
    pub m5: PriceSeries,
    pub m15: PriceSeries,
}

pub fn compact_timeframes(one_minute: &PriceSeries) -> EngineResult<Timeframes> {
    Ok(Timeframes {
        m1: one_minute.clone(),
        m5: resample(one_minute, 5)?,
        m15: resample(one_minute, 15)?,
    })
}
