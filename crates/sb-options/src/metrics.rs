//! Per-expiration rollups over a chain: open interest, volume, near-the-money
//! volatility, implied move and the max-pain heuristic.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use sb_types::{validation_error, SbError};

use crate::chain::OptionsChain;
use crate::contract::Contract;

/// Share of the combined near-the-money premium taken as the expected move.
pub const IMPLIED_MOVE_FACTOR: f64 = 0.85;

/// Rollup for one side (calls or puts) of one expiration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsPoint {
    pub implied_move: f64,
    pub ntm_implied_volatility: f64,
    pub total_volume: u64,
    pub total_open_interest: u64,
    pub open_interest_value: f64,
    pub maximum_pain: f64,
}

/// Selectable aggregate metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    ImpliedMove,
    NtmImpliedVolatility,
    TotalVolume,
    TotalOpenInterest,
    OpenInterestValue,
    MaximumPain,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::ImpliedMove,
        MetricKind::NtmImpliedVolatility,
        MetricKind::TotalVolume,
        MetricKind::TotalOpenInterest,
        MetricKind::OpenInterestValue,
        MetricKind::MaximumPain,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            MetricKind::ImpliedMove => "implied_move",
            MetricKind::NtmImpliedVolatility => "ntm_implied_volatility",
            MetricKind::TotalVolume => "total_volume",
            MetricKind::TotalOpenInterest => "total_open_interest",
            MetricKind::OpenInterestValue => "open_interest_value",
            MetricKind::MaximumPain => "maximum_pain",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MetricKind::ImpliedMove => "Implied Move",
            MetricKind::NtmImpliedVolatility => "NTM Implied Volatility",
            MetricKind::TotalVolume => "Total Volume",
            MetricKind::TotalOpenInterest => "Total Open Interest",
            MetricKind::OpenInterestValue => "Open Interest Value",
            MetricKind::MaximumPain => "Maximum Pain",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricKind {
    type Err = SbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| validation_error!("Unknown metric: {}", s))
    }
}

impl MetricsPoint {
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::ImpliedMove => self.implied_move,
            MetricKind::NtmImpliedVolatility => self.ntm_implied_volatility,
            MetricKind::TotalVolume => self.total_volume as f64,
            MetricKind::TotalOpenInterest => self.total_open_interest as f64,
            MetricKind::OpenInterestValue => self.open_interest_value,
            MetricKind::MaximumPain => self.maximum_pain,
        }
    }
}

/// Call and put rollups for one expiration date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpirationMetrics {
    pub call: MetricsPoint,
    pub put: MetricsPoint,
}

impl ExpirationMetrics {
    /// Put value over call value; `None` when the call side is zero.
    pub fn put_call_ratio(&self, kind: MetricKind) -> Option<f64> {
        let call = self.call.get(kind);
        (call != 0.0).then(|| self.put.get(kind) / call)
    }

    /// Spot price range implied by the expected move.
    pub fn implied_range(&self, spot: f64) -> (f64, f64) {
        let movement = self.call.implied_move;
        (spot - movement, spot + movement)
    }
}

/// Running state for one side's pass over its contracts.
struct SidePass {
    point: MetricsPoint,
    ntm_spread: Option<f64>,
    ntm_mark: f64,
    running_mark: f64,
}

impl SidePass {
    fn new() -> Self {
        Self {
            point: MetricsPoint::default(),
            ntm_spread: None,
            ntm_mark: 0.0,
            running_mark: 0.0,
        }
    }

    /// Fold one contract in and return the running mark total.
    fn add(&mut self, contract: &Contract, spot: f64) -> f64 {
        let mark = contract.mark.unwrap_or(0.0);
        let open_interest = contract.open_interest.unwrap_or(0);

        self.point.total_open_interest += open_interest;
        self.point.total_volume += contract.volume.unwrap_or(0);
        self.point.open_interest_value += open_interest as f64 * mark;

        let spread = (contract.strike_f64() - spot).abs();
        if self.ntm_spread.map_or(true, |best| spread < best) {
            self.ntm_spread = Some(spread);
            self.point.ntm_implied_volatility = contract.implied_volatility.unwrap_or(0.0);
            self.ntm_mark = mark;
        }

        self.running_mark += mark;
        self.running_mark
    }
}

fn by_strike<'a>(mut contracts: Vec<&'a Contract>) -> Vec<&'a Contract> {
    contracts.sort_by(|a, b| a.strike.cmp(&b.strike));
    contracts
}

fn expiration_metrics(chain: &OptionsChain, date: NaiveDate, multiplier: f64) -> ExpirationMetrics {
    use crate::contract::OptionKind::{Call, Put};

    let spot = chain.spot_price;
    let calls = by_strike(chain.contracts_at(date, Call));
    let puts = by_strike(chain.contracts_at(date, Put));

    // calls accumulate from the low strikes up, puts from the high strikes down
    let mut sums_at_strike: BTreeMap<Decimal, f64> = BTreeMap::new();
    let mut call_pass = SidePass::new();
    for contract in &calls {
        let running = call_pass.add(contract, spot);
        sums_at_strike.insert(contract.strike, running);
    }

    let mut put_pass = SidePass::new();
    for contract in puts.iter().rev() {
        let running = put_pass.add(contract, spot);
        if let Some(sum) = sums_at_strike.get_mut(&contract.strike) {
            *sum += running;
        }
    }

    let mut maximum_pain = 0.0;
    let mut highest: Option<f64> = None;
    for (strike, sum) in &sums_at_strike {
        if highest.map_or(true, |best| *sum > best) {
            highest = Some(*sum);
            maximum_pain = strike.to_f64().unwrap_or(0.0);
        }
    }

    let implied_move = (call_pass.ntm_mark + put_pass.ntm_mark) * IMPLIED_MOVE_FACTOR * multiplier;

    let mut call = call_pass.point;
    let mut put = put_pass.point;
    call.implied_move = implied_move;
    put.implied_move = implied_move;
    call.maximum_pain = maximum_pain;
    put.maximum_pain = maximum_pain;

    ExpirationMetrics { call, put }
}

/// Aggregate metrics for every expiration in the chain, keyed by date.
///
/// Contracts missing from the chain are skipped; missing marks, volumes and
/// open interest count as zero.
pub fn aggregate_metrics(chain: &OptionsChain, multiplier: f64) -> BTreeMap<NaiveDate, ExpirationMetrics> {
    chain
        .expirations()
        .into_iter()
        .map(|date| (date, expiration_metrics(chain, date, multiplier)))
        .collect()
}
