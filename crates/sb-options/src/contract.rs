use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::greeks::Greeks;

/// Milliseconds in one calendar day.
pub const MILLIS_PER_DAY: f64 = 86_400_000.0;
/// Days in an average year, leap years included.
pub const DAYS_PER_YEAR: f64 = 365.25;
/// Shares controlled by one equity option contract.
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Interest equivalents at or beyond this magnitude are numerically meaningless.
const INTEREST_EQUIVALENT_LIMIT: f64 = 100.0;

/// Call or put.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }

    /// Single-letter tag used in leg descriptions (`C` / `P`).
    pub fn initial(&self) -> char {
        match self {
            OptionKind::Call => 'C',
            OptionKind::Put => 'P',
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionKind::Call => write!(f, "Call"),
            OptionKind::Put => write!(f, "Put"),
        }
    }
}

impl FromStr for OptionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" => Ok(OptionKind::Call),
            "put" => Ok(OptionKind::Put),
            other => Err(other.to_string()),
        }
    }
}

/// One option instrument at a single strike, expiration and type.
///
/// Built once by the chain normalizer and never mutated afterwards; strategy
/// legs hold their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    /// Broker symbol, unique within a chain.
    pub symbol: String,
    /// Expiration exactly as the broker reported it.
    pub expiration_date_string: String,
    /// Parsed expiration (midnight UTC for date-only strings).
    pub expiration: DateTime<Utc>,
    pub strike: Decimal,
    pub option_type: OptionKind,
    pub bid: Option<f64>,
    pub ask: Option<f64>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub change: Option<f64>,
    pub last: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
    pub open_interest: Option<u64>,
    pub trade_date: Option<DateTime<Utc>>,
    pub greeks: Greeks,
    pub implied_volatility: Option<f64>,
    pub smooth_implied_volatility: Option<f64>,
    pub mark: Option<f64>,
    pub intrinsic_value: Option<f64>,
    pub extrinsic_value: Option<f64>,
    pub leverage_ratio: Option<f64>,
    pub interest_equivalent: Option<f64>,
}

impl Contract {
    /// Strike as a float for pricing arithmetic.
    pub fn strike_f64(&self) -> f64 {
        self.strike.to_f64().unwrap_or(0.0)
    }

    /// Expiration date as the broker listed it; this is the chain's index key.
    pub fn expiration_day(&self) -> NaiveDate {
        crate::chain::expiration_day(&self.expiration_date_string)
            .unwrap_or_else(|| self.expiration.date_naive())
    }

    pub fn expiration_millis(&self) -> i64 {
        self.expiration.timestamp_millis()
    }

    /// Years remaining until expiration from `as_of`.
    /// Returns 0 once `as_of` reaches the expiration.
    pub fn years_to_expiration(&self, as_of: DateTime<Utc>) -> f64 {
        let as_of = as_of.min(self.expiration);
        let millis = (self.expiration - as_of).num_milliseconds() as f64;
        millis / (MILLIS_PER_DAY * DAYS_PER_YEAR)
    }

    /// True if the option has expired relative to `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    /// Intrinsic value at an arbitrary spot price.
    pub fn intrinsic_at(&self, spot: f64) -> f64 {
        intrinsic_value(self.option_type, self.strike_f64(), spot)
    }

    /// True when the option is in-the-money.
    pub fn is_itm(&self, spot: f64) -> bool {
        self.intrinsic_at(spot) > 0.0
    }
}

impl fmt::Display for Contract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.symbol,
            self.expiration.format("%Y-%m-%d"),
            self.strike,
            self.option_type,
        )
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

/// Bid/ask midpoint rounded to cents, falling back to whichever side exists.
pub fn calculate_mark(bid: Option<f64>, ask: Option<f64>) -> Option<f64> {
    match (finite(bid), finite(ask)) {
        (Some(b), Some(a)) => Some(((b + a) / 2.0 * 100.0).round() / 100.0),
        (Some(b), None) => Some(b),
        (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

/// Intrinsic value of a call or put, never negative.
pub fn intrinsic_value(kind: OptionKind, strike: f64, spot: f64) -> f64 {
    let iv = match kind {
        OptionKind::Call => spot - strike,
        OptionKind::Put => strike - spot,
    };
    if iv > 0.0 {
        iv
    } else {
        0.0
    }
}

/// Intrinsic value for an untyped broker option type; `None` if it is neither
/// a call nor a put.
pub fn intrinsic_value_for(option_type: &str, strike: f64, spot: f64) -> Option<f64> {
    option_type
        .parse::<OptionKind>()
        .ok()
        .map(|kind| intrinsic_value(kind, strike, spot))
}

/// Time value above intrinsic, never negative.
pub fn extrinsic_value(intrinsic: Option<f64>, mark: Option<f64>) -> Option<f64> {
    let (intrinsic, mark) = (finite(intrinsic)?, finite(mark)?);
    Some((mark - intrinsic).max(0.0))
}

/// Exposure gained per dollar of premium: `(spot * delta - mark) / mark`.
pub fn leverage_ratio(delta: Option<f64>, mark: Option<f64>, spot: f64) -> Option<f64> {
    let mark = finite(mark).filter(|m| *m != 0.0)?;
    let delta = finite(delta)?;
    let ratio = (spot * delta - mark) / mark;
    ratio.is_finite().then_some(ratio)
}

/// Annualised extrinsic value relative to the delta-equivalent exposure.
///
/// Suppressed when any input is missing, the result is not finite, or its
/// magnitude reaches 100.
pub fn interest_equivalent(
    delta: Option<f64>,
    expiration: DateTime<Utc>,
    fetch_date: DateTime<Utc>,
    leverage_ratio: Option<f64>,
    extrinsic: Option<f64>,
    spot: f64,
) -> Option<f64> {
    let extrinsic = finite(extrinsic)?;
    let leverage = finite(leverage_ratio)?;
    let delta = finite(delta)?;

    let days = (expiration - fetch_date).num_milliseconds() as f64 / MILLIS_PER_DAY;
    let annual_extrinsic = extrinsic * (DAYS_PER_YEAR / days);
    let equivalent = annual_extrinsic / (spot * delta * leverage);

    (equivalent.is_finite() && equivalent.abs() < INTEREST_EQUIVALENT_LIMIT).then_some(equivalent)
}
