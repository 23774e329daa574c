//! User-assembled multi-leg option positions.
//!
//! Strategies are values: every edit returns a new strategy and leaves the
//! original untouched, so pricers and the classifier always see a settled
//! snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use sb_types::{ChainError, StrategyError};

use crate::chain::OptionsChain;
use crate::contract::{Contract, CONTRACT_MULTIPLIER};
use crate::greeks::NetGreeks;

/// One option position inside a strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyLeg {
    /// Frozen copy of the contract taken when the leg was added.
    pub contract: Contract,
    /// Contract symbol; unique within a strategy.
    pub id: String,
    /// Entry price per share.
    pub premium: f64,
    /// Signed number of contracts: positive is long, negative is short.
    pub position_size: i64,
}

impl StrategyLeg {
    /// Open one long contract at the current mark (0 when unquoted).
    pub fn new(contract: Contract) -> Self {
        Self {
            id: contract.symbol.clone(),
            premium: contract.mark.unwrap_or(0.0),
            position_size: 1,
            contract,
        }
    }

    pub fn is_long(&self) -> bool {
        self.position_size > 0
    }

    pub fn is_short(&self) -> bool {
        self.position_size < 0
    }

    /// Premium paid (positive) or received (negative) for this leg.
    pub fn cost(&self) -> f64 {
        self.premium * self.position_size as f64 * CONTRACT_MULTIPLIER
    }

    /// Short tag such as `LONG $100C`.
    pub fn description(&self) -> String {
        format!(
            "{} ${}{}",
            if self.is_long() { "LONG" } else { "SHORT" },
            self.contract.strike.normalize(),
            self.contract.option_type.initial()
        )
    }
}

/// Option legs plus an optional stock position in the underlying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionStrategy {
    pub legs: Vec<StrategyLeg>,
    /// Signed share count: positive is long stock, negative is short.
    pub share_count: i64,
    pub underlying_cost_basis: f64,
    pub spot_price: f64,
    pub fetch_date: DateTime<Utc>,
}

impl OptionStrategy {
    pub fn new(spot_price: f64, fetch_date: DateTime<Utc>) -> Self {
        Self {
            legs: Vec::new(),
            share_count: 0,
            underlying_cost_basis: spot_price,
            spot_price,
            fetch_date,
        }
    }

    /// Empty strategy priced off `chain`'s spot and fetch date.
    pub fn for_chain(chain: &OptionsChain) -> Self {
        Self::new(chain.spot_price, chain.fetch_date)
    }

    pub fn with_shares(&self, share_count: i64, cost_basis: f64) -> Self {
        Self {
            share_count,
            underlying_cost_basis: cost_basis,
            ..self.clone()
        }
    }

    /// Add one long contract. Adding a contract that is already a leg
    /// returns the strategy unchanged.
    pub fn with_leg(&self, contract: &Contract) -> Self {
        if self.leg(&contract.symbol).is_some() {
            debug!("Leg {} already in strategy, ignoring add", contract.symbol);
            return self.clone();
        }
        let mut next = self.clone();
        next.legs.push(StrategyLeg::new(contract.clone()));
        next
    }

    /// Add the chain's contract `symbol` as a leg.
    pub fn with_chain_leg(&self, chain: &OptionsChain, symbol: &str) -> Result<Self, ChainError> {
        let contract = chain.require_contract(symbol)?;
        Ok(self.with_leg(contract))
    }

    /// Drop the leg with `id`; unknown ids leave the strategy unchanged.
    pub fn without_leg(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.legs.retain(|leg| leg.id != id);
        next
    }

    pub fn with_leg_premium(&self, id: &str, premium: f64) -> Result<Self, StrategyError> {
        self.edit_leg(id, |leg| leg.premium = premium)
    }

    /// Change a leg's signed size. Zero is rejected: remove the leg instead.
    pub fn with_leg_size(&self, id: &str, size: i64) -> Result<Self, StrategyError> {
        if size == 0 {
            return Err(StrategyError::InvalidPositionSize {
                id: id.to_string(),
                size,
            });
        }
        self.edit_leg(id, |leg| leg.position_size = size)
    }

    fn edit_leg(
        &self,
        id: &str,
        edit: impl FnOnce(&mut StrategyLeg),
    ) -> Result<Self, StrategyError> {
        let mut next = self.clone();
        let leg = next
            .legs
            .iter_mut()
            .find(|leg| leg.id == id)
            .ok_or_else(|| StrategyError::LegNotFound { id: id.to_string() })?;
        edit(leg);
        Ok(next)
    }

    pub fn leg(&self, id: &str) -> Option<&StrategyLeg> {
        self.legs.iter().find(|leg| leg.id == id)
    }

    /// True when there are no legs and no shares.
    pub fn is_empty(&self) -> bool {
        self.legs.is_empty() && self.share_count == 0
    }

    pub fn earliest_expiration(&self) -> Option<DateTime<Utc>> {
        self.legs.iter().map(|leg| leg.contract.expiration).min()
    }

    /// Cash paid to open the position; negative for a net credit.
    pub fn net_premium(&self) -> f64 {
        self.share_count as f64 * self.underlying_cost_basis
            + self.legs.iter().map(StrategyLeg::cost).sum::<f64>()
    }

    /// Position-weighted greeks; missing greeks contribute nothing.
    pub fn net_greeks(&self) -> NetGreeks {
        let mut net = NetGreeks::zero();
        for leg in &self.legs {
            net.accumulate(
                &leg.contract.greeks,
                leg.position_size as f64 * CONTRACT_MULTIPLIER,
            );
        }
        net
    }

    /// Comma-separated leg tags, e.g. `LONG $100C, SHORT $110C`.
    pub fn leg_description(&self) -> String {
        self.legs
            .iter()
            .map(StrategyLeg::description)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
