use super::config::PricingConfig;
use super::models::{OptionCandidate, RawChain, RawOptionRow};
use super::sensitivity::estimate_delta;
use super::session::{exchange_date, pick_expiry, time_to_expiry_years};
use crate::error::{EngineError, EngineResult};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Turn a raw chain snapshot into filterable candidates.
///
/// Only one expiry is kept: the session's own if listed, else the next one
/// (see [`chain_expiry`]). Rows that cannot be quoted (no ask, crossed book,
/// bad strike) are dropped and logged; the rest carry a signed delta priced
/// at `chain.as_of`.
pub fn normalize_chain(symbol: &str, chain: &RawChain, pricing: &PricingConfig) -> Vec<OptionCandidate> {
    let Some(expiry) = chain_expiry(chain) else {
        debug!(symbol, "empty chain");
        return Vec::new();
    };

    let mut candidates = Vec::new();
    let mut dropped = 0usize;
    let mut other_expiry = 0usize;

    for (index, row) in chain.rows.iter().enumerate() {
        if row.expiry != expiry {
            other_expiry += 1;
            continue;
        }
        match normalize_row(index, symbol, row, chain, pricing) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => {
                dropped += 1;
                warn!(symbol, error = %e, "dropping chain row");
            }
        }
    }

    debug!(symbol, %expiry, kept = candidates.len(), dropped, other_expiry, "chain normalized");
    candidates
}

/// Expiry the chain is ranked on, picked from the distinct expiries listed
/// in `chain.rows` relative to the exchange date of `chain.as_of`.
pub fn chain_expiry(chain: &RawChain) -> Option<NaiveDate> {
    let mut expiries: Vec<NaiveDate> = chain.rows.iter().map(|r| r.expiry).collect();
    expiries.sort_unstable();
    expiries.dedup();
    pick_expiry(&expiries, exchange_date(chain.as_of))
}

/// Normalize one row: fill missing quotes with zero, fall back to the
/// configured IV, price the delta.
pub fn normalize_row(
    index: usize,
    symbol: &str,
    row: &RawOptionRow,
    chain: &RawChain,
    pricing: &PricingConfig,
) -> EngineResult<OptionCandidate> {
    let invalid = |reason: String| EngineError::InvalidChainRow { index, reason };

    if !row.strike.is_finite() || row.strike <= 0.0 {
        return Err(invalid(format!("strike {} is not positive", row.strike)));
    }

    let bid = finite_or_zero(row.bid);
    let ask = finite_or_zero(row.ask);
    if ask <= 0.0 {
        return Err(invalid("no ask".to_string()));
    }
    if ask < bid {
        return Err(invalid(format!("crossed quote bid {} > ask {}", bid, ask)));
    }

    let iv = row
        .implied_volatility
        .filter(|v| v.is_finite())
        .unwrap_or(pricing.fallback_iv)
        .max(pricing.min_iv);
    let t_years = time_to_expiry_years(chain.as_of, row.expiry);
    let delta = estimate_delta(chain.spot, row.strike, t_years, iv, pricing.rate, row.side);

    Ok(OptionCandidate {
        symbol: symbol.to_string(),
        strike: row.strike,
        side: row.side,
        delta,
        bid,
        ask,
        spread: (ask - bid).max(0.0),
        volume: row.volume.unwrap_or(0),
        open_interest: row.open_interest.unwrap_or(0),
        expiry: row.expiry,
    })
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}
