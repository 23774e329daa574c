//! Strategy valuation over spot/time grids and at expiration.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sb_types::StrategyError;

use crate::contract::CONTRACT_MULTIPLIER;
use crate::greeks::NetGreeks;
use crate::pricing::contract_value;
use crate::strategy::OptionStrategy;

/// Finite stand-in for an unbounded spot price.
pub const PAYOFF_SPOT_SENTINEL: f64 = 1e12;
/// Payoffs beyond this magnitude are reported as infinite.
pub const PAYOFF_CLAMP: f64 = 1e9;

/// Theoretical value of the whole position, rounded to 4 decimal places.
pub fn strategy_value(strategy: &OptionStrategy, spot: f64, as_of: DateTime<Utc>) -> f64 {
    let mut value = strategy.share_count as f64 * spot;
    for leg in &strategy.legs {
        value += contract_value(&leg.contract, spot, as_of)
            * leg.position_size as f64
            * CONTRACT_MULTIPLIER;
    }
    (value * 10_000.0).round() / 10_000.0
}

/// Spot price rounded to cents, used as a forecast column key.
pub fn spot_key(spot: f64) -> Option<Decimal> {
    let mut key = Decimal::from_f64_retain(spot)?.round_dp(2);
    key.rescale(2);
    Some(key)
}

/// Strategy values on a date × spot grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastTable {
    /// Row dates, ascending from the valuation date to the earliest expiration.
    pub dates: Vec<DateTime<Utc>>,
    /// Column spot prices, descending.
    pub spots: Vec<Decimal>,
    pub values: BTreeMap<DateTime<Utc>, BTreeMap<Decimal, f64>>,
}

impl ForecastTable {
    pub fn value(&self, date: DateTime<Utc>, spot: Decimal) -> Option<f64> {
        self.values.get(&date)?.get(&spot).copied()
    }

    pub fn row(&self, date: DateTime<Utc>) -> Option<&BTreeMap<Decimal, f64>> {
        self.values.get(&date)
    }
}

fn spot_axis(strategy: &OptionStrategy, spot: f64, spot_interval: f64, count: usize) -> Vec<(Decimal, f64)> {
    let mut points: Vec<(Decimal, f64)> = Vec::with_capacity(2 * count + 1 + strategy.legs.len());
    let mut push = |value: f64| {
        if let Some(key) = spot_key(value) {
            if !points.iter().any(|(k, _)| *k == key) {
                points.push((key, value));
            }
        }
    };

    push(spot);
    for step in 1..=count {
        let offset = spot_interval * step as f64;
        push(spot + offset);
        if spot - offset > 0.0 {
            push(spot - offset);
        }
    }
    for leg in &strategy.legs {
        if let Some(strike) = leg.contract.strike.to_f64() {
            push(strike);
        }
    }

    points.sort_by(|a, b| b.0.cmp(&a.0));
    points
}

fn date_axis(strategy: &OptionStrategy, as_of: DateTime<Utc>, date_interval: Duration) -> Vec<DateTime<Utc>> {
    let mut dates = Vec::new();
    if let Some(mut date) = strategy.earliest_expiration() {
        while date > as_of {
            dates.push(date);
            match date.checked_sub_signed(date_interval) {
                Some(previous) => date = previous,
                None => break,
            }
        }
    }
    dates.push(as_of);
    dates.reverse();
    dates
}

/// Forecast the strategy's value across spot prices and dates.
///
/// The spot axis is `spot` plus `spot_interval_count` steps either side and
/// every leg strike; generated points at or below zero are dropped. The date
/// axis steps back from the earliest leg expiration to `as_of`.
pub fn forecast_table(
    strategy: &OptionStrategy,
    spot: f64,
    as_of: DateTime<Utc>,
    date_interval: Duration,
    spot_interval: f64,
    spot_interval_count: usize,
) -> Result<ForecastTable, StrategyError> {
    if date_interval <= Duration::zero() {
        return Err(StrategyError::InvalidForecastInterval {
            message: format!("date interval must be positive, got {date_interval}"),
        });
    }
    if !(spot_interval.is_finite() && spot_interval > 0.0) {
        return Err(StrategyError::InvalidForecastInterval {
            message: format!("spot interval must be positive, got {spot_interval}"),
        });
    }

    let spots = spot_axis(strategy, spot, spot_interval, spot_interval_count);
    let dates = date_axis(strategy, as_of, date_interval);

    let values = dates
        .iter()
        .map(|date| {
            let row = spots
                .iter()
                .map(|(key, value)| (*key, strategy_value(strategy, *value, *date)))
                .collect();
            (*date, row)
        })
        .collect();

    Ok(ForecastTable {
        dates,
        spots: spots.into_iter().map(|(key, _)| key).collect(),
        values,
    })
}

/// Intrinsic-only value of the position if every leg expired at `spot`.
///
/// `+inf` is priced at a finite sentinel and any result beyond the clamp
/// is reported as signed infinity.
pub fn payoff_at_expiration(strategy: &OptionStrategy, spot: f64) -> f64 {
    let spot = if spot == f64::INFINITY {
        PAYOFF_SPOT_SENTINEL
    } else {
        spot
    };

    let mut payoff = strategy.share_count as f64 * spot;
    for leg in &strategy.legs {
        payoff += leg.contract.intrinsic_at(spot) * leg.position_size as f64 * CONTRACT_MULTIPLIER;
    }

    if payoff > PAYOFF_CLAMP {
        f64::INFINITY
    } else if payoff < -PAYOFF_CLAMP {
        f64::NEG_INFINITY
    } else {
        payoff
    }
}

/// Spot price at which the expiration payoff can change slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InflectionPoint {
    pub spot: f64,
    pub payoff: f64,
}

/// Expiration payoff at 0, at each distinct leg strike and at `+inf`.
///
/// The payoff is piecewise linear between strikes, so these points bound
/// every extreme.
pub fn inflection_prices(strategy: &OptionStrategy) -> Vec<InflectionPoint> {
    let mut strikes: Vec<Decimal> = strategy.legs.iter().map(|leg| leg.contract.strike).collect();
    strikes.sort();
    strikes.dedup();

    std::iter::once(0.0)
        .chain(strikes.iter().filter_map(|strike| strike.to_f64()))
        .chain(std::iter::once(f64::INFINITY))
        .map(|spot| InflectionPoint {
            spot,
            payoff: payoff_at_expiration(strategy, spot),
        })
        .collect()
}

/// Headline risk numbers for a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySummary {
    pub name: String,
    pub net_premium: f64,
    pub greeks: NetGreeks,
    pub max_gain: f64,
    /// Worst loss as a positive number; `+inf` when risk is unbounded.
    pub max_loss: f64,
    /// Share of the outcome range that is loss; only defined when both
    /// gain and loss are bounded.
    pub pot_odds: Option<f64>,
    pub undefined_risk: bool,
}

impl StrategySummary {
    pub fn new(strategy: &OptionStrategy) -> Self {
        let net_premium = strategy.net_premium();
        let mut max_gain = f64::NEG_INFINITY;
        let mut min_profit = f64::INFINITY;
        for point in inflection_prices(strategy) {
            let profit = point.payoff - net_premium;
            max_gain = max_gain.max(profit);
            min_profit = min_profit.min(profit);
        }
        let max_loss = -min_profit;

        let pot_odds = (max_gain.is_finite() && max_loss.is_finite())
            .then(|| max_loss / (max_gain + max_loss))
            .filter(|odds| odds.is_finite());

        Self {
            name: crate::classify::classify(strategy).to_string(),
            net_premium,
            greeks: strategy.net_greeks(),
            max_gain,
            max_loss,
            pot_odds,
            undefined_risk: max_loss == f64::INFINITY,
        }
    }
}
