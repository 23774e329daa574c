//! Black-Scholes pricing for European options.

use chrono::{DateTime, Utc};

use crate::contract::{intrinsic_value, Contract, OptionKind};

/// Annualised risk-free rate used for every theoretical value.
pub const RISK_FREE_RATE: f64 = 0.035;

/// Inputs shared by all pricing calls.
#[derive(Debug, Clone)]
pub struct PricingInput {
    /// Current underlying spot price.
    pub spot: f64,
    /// Annualised risk-free rate (e.g. 0.035 = 3.5 %).
    pub risk_free_rate: f64,
    /// Annualised implied volatility (e.g. 0.20 = 20 %).
    pub volatility: f64,
    /// Time to expiry in years.
    pub time_to_expiry: f64,
}

// ---------- normal distribution helpers (no external dep) ----------

/// Standard normal cumulative distribution function (Abramowitz & Stegun 26.2.17).
fn norm_cdf(x: f64) -> f64 {
    if x >= 8.0 {
        return 1.0;
    }
    if x <= -8.0 {
        return 0.0;
    }

    let a1 = 0.254829592_f64;
    let a2 = -0.284496736_f64;
    let a3 = 1.421413741_f64;
    let a4 = -1.453152027_f64;
    let a5 = 1.061405429_f64;
    let p = 0.3275911_f64;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x_abs = x.abs();
    let t = 1.0 / (1.0 + p * x_abs);
    let y =
        1.0 - (((((a5 * t + a4) * t) + a3) * t + a2) * t + a1) * t * (-x_abs * x_abs / 2.0).exp();

    0.5 * (1.0 + sign * y)
}

// ---------- Black-Scholes core ----------

/// Compute d1 and d2.
fn d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    let d2 = d1 - sigma * t.sqrt();
    (d1, d2)
}

/// Price a European option using the Black-Scholes model.
///
/// Expired options are worth their intrinsic value. Degenerate inputs that
/// make the closed form undefined (missing volatility, non-positive spot)
/// price at 0 instead of NaN.
pub fn black_scholes_price(kind: OptionKind, strike: f64, input: &PricingInput) -> f64 {
    let s = input.spot;
    let k = strike;
    let r = input.risk_free_rate;
    let sigma = input.volatility;
    let t = input.time_to_expiry;

    // Degenerate: expired option
    if t <= 0.0 {
        return intrinsic_value(kind, k, s);
    }

    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    let disc = (-r * t).exp();

    let price = match kind {
        OptionKind::Call => s * norm_cdf(d1) - k * disc * norm_cdf(d2),
        OptionKind::Put => k * disc * norm_cdf(-d2) - s * norm_cdf(-d1),
    };

    if price.is_finite() {
        price
    } else {
        0.0
    }
}

/// Theoretical value of `contract` at `spot` as of `as_of`.
///
/// `as_of` past the expiration is clamped to the expiration, and the
/// contract's own implied volatility drives the model.
pub fn contract_value(contract: &Contract, spot: f64, as_of: DateTime<Utc>) -> f64 {
    let input = PricingInput {
        spot,
        risk_free_rate: RISK_FREE_RATE,
        volatility: contract.implied_volatility.unwrap_or(f64::NAN),
        time_to_expiry: contract.years_to_expiration(as_of),
    };
    black_scholes_price(contract.option_type, contract.strike_f64(), &input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::tests::sample_contract;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn input(spot: f64, volatility: f64, time_to_expiry: f64) -> PricingInput {
        PricingInput {
            spot,
            risk_free_rate: 0.05,
            volatility,
            time_to_expiry,
        }
    }

    #[test]
    fn test_call_price_sanity() {
        let price = black_scholes_price(OptionKind::Call, 150.0, &input(155.0, 0.25, 0.25));
        // ITM call should be worth at least intrinsic ($5)
        assert!(price > 5.0, "call price = {price}");
        assert!(price < 20.0, "call price unreasonably high = {price}");
    }

    #[test]
    fn test_put_price_sanity() {
        let price = black_scholes_price(OptionKind::Put, 150.0, &input(145.0, 0.25, 0.25));
        assert!(price > 5.0, "put price = {price}");
        assert!(price < 20.0, "put price unreasonably high = {price}");
    }

    #[test]
    fn test_put_call_parity() {
        let inp = input(150.0, 0.30, 0.5);
        let c_price = black_scholes_price(OptionKind::Call, 150.0, &inp);
        let p_price = black_scholes_price(OptionKind::Put, 150.0, &inp);
        // C - P = S - K*exp(-rT)
        let lhs = c_price - p_price;
        let rhs = inp.spot - 150.0 * (-inp.risk_free_rate * inp.time_to_expiry).exp();
        assert!(
            (lhs - rhs).abs() < 0.01,
            "put-call parity violated: lhs={lhs}, rhs={rhs}"
        );
    }

    #[test]
    fn test_expired_option_returns_intrinsic() {
        assert_eq!(black_scholes_price(OptionKind::Call, 150.0, &input(160.0, 0.25, 0.0)), 10.0);
        assert_eq!(black_scholes_price(OptionKind::Put, 150.0, &input(160.0, 0.25, 0.0)), 0.0);
    }

    #[test]
    fn test_missing_volatility_prices_zero() {
        assert_eq!(
            black_scholes_price(OptionKind::Call, 150.0, &input(155.0, f64::NAN, 0.25)),
            0.0
        );
    }

    #[test]
    fn test_norm_cdf_boundaries() {
        assert!((norm_cdf(0.0) - 0.5).abs() < 1e-6);
        assert!(norm_cdf(8.0) == 1.0);
        assert!(norm_cdf(-8.0) == 0.0);
    }

    #[test]
    fn test_contract_value_clamps_past_expiration() {
        let c = sample_contract(OptionKind::Call, dec!(150));
        let late = c.expiration + Duration::days(10);
        assert_eq!(contract_value(&c, 160.0, late), 10.0);
    }

    #[test]
    fn test_contract_value_has_time_value() {
        let c = sample_contract(OptionKind::Call, dec!(150));
        let as_of = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
        let value = contract_value(&c, 150.0, as_of);
        assert!(value > 0.0, "ATM call should carry time value, got {value}");
        // repeated evaluation is bit-for-bit stable
        assert_eq!(value.to_bits(), contract_value(&c, 150.0, as_of).to_bits());
    }

    #[test]
    fn test_contract_value_without_volatility() {
        let mut c = sample_contract(OptionKind::Put, dec!(150));
        c.implied_volatility = None;
        let as_of = Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap();
        assert_eq!(contract_value(&c, 140.0, as_of), 0.0);
    }
}
