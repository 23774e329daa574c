//! Call/put series over one slice of the chain, for plotting one contract
//! field against another.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chain::{LookupEntry, OptionsChain};
use crate::contract::{Contract, OptionKind};
use crate::field::ContractField;

/// One slice of the lookup table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKey {
    /// Every strike of one expiration.
    Expiration(NaiveDate),
    /// Every expiration of one strike.
    Strike(Decimal),
}

impl DatasetKey {
    /// Value of the axis the slice runs along: strike for an expiration
    /// slice, expiration millis for a strike slice.
    fn bound_value(&self, contract: &Contract) -> f64 {
        match self {
            DatasetKey::Expiration(_) => contract.strike_f64(),
            DatasetKey::Strike(_) => contract.expiration_millis() as f64,
        }
    }

    fn pairs_with(&self, call: &Contract, put: &Contract) -> bool {
        match self {
            DatasetKey::Expiration(_) => call.strike == put.strike,
            DatasetKey::Strike(_) => call.expiration == put.expiration,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub calls: Vec<(f64, f64)>,
    pub puts: Vec<(f64, f64)>,
}

impl Series {
    pub fn side(&self, kind: OptionKind) -> &[(f64, f64)] {
        match kind {
            OptionKind::Call => &self.calls,
            OptionKind::Put => &self.puts,
        }
    }
}

fn point(contract: &Contract, x: ContractField, y: ContractField) -> Option<(f64, f64)> {
    Some((x.value(contract)?, y.value(contract)?))
}

impl OptionsChain {
    fn dataset(&self, key: DatasetKey) -> Option<&LookupEntry> {
        match key {
            DatasetKey::Expiration(date) => self.lookup.expiration(date),
            DatasetKey::Strike(strike) => self.lookup.strike(strike),
        }
    }

    /// Plot `y` against `x` for matching call/put pairs in one slice.
    ///
    /// Calls are walked along the slice axis and each is paired with the put
    /// at the same strike (expiration slice) or expiration (strike slice).
    /// With `bounds`, emission starts at the first call at or above the lower
    /// bound and stops after the first call at or above the upper bound.
    /// Points with a missing `x` or `y` value are left out.
    pub fn series(
        &self,
        key: DatasetKey,
        x: ContractField,
        y: ContractField,
        bounds: Option<(f64, f64)>,
    ) -> Series {
        let mut series = Series::default();
        let Some(entry) = self.dataset(key) else {
            return series;
        };

        let mut calls: Vec<&Contract> = self.resolve(&entry.call).collect();
        calls.sort_by(|a, b| key.bound_value(a).total_cmp(&key.bound_value(b)));
        let puts: Vec<&Contract> = self.resolve(&entry.put).collect();

        let (lower, upper) = bounds.unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        let mut started = false;

        for call in calls {
            let bound = key.bound_value(call);
            if bound >= lower {
                started = true;
            }
            if started {
                if let Some(put) = puts.iter().find(|put| key.pairs_with(call, put)) {
                    series.calls.extend(point(call, x, y));
                    series.puts.extend(point(put, x, y));
                }
            }
            if bound >= upper {
                break;
            }
        }

        series
    }
}
