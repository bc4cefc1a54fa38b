//! Closed-form option delta for ranking purposes.
//!
//! d1 = (ln(S/K) + (r + σ²/2)·T) / (σ·√T)
//! Δcall = Φ(d1), Δput = Φ(d1) − 1

use super::models::OptionSide;

/// Error function, Abramowitz & Stegun 7.1.26 (max error 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    sign * y
}

/// Standard normal CDF.
pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// Approximate delta of a European option.
///
/// Returns exactly `0.0` when spot, strike, volatility or time is not a
/// positive finite number.
pub fn estimate_delta(spot: f64, strike: f64, t_years: f64, iv: f64, rate: f64, side: OptionSide) -> f64 {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(spot) && positive(strike) && positive(t_years) && positive(iv)) || !rate.is_finite() {
        return 0.0;
    }

    let d1 = ((spot / strike).ln() + (rate + 0.5 * iv * iv) * t_years) / (iv * t_years.sqrt());
    if !d1.is_finite() {
        return 0.0;
    }

    let cdf = norm_cdf(d1);
    match side {
        OptionSide::Call => cdf,
        OptionSide::Put => cdf - 1.0,
    }
}
