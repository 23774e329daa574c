//! Named, formatted access to contract fields for tables and chart axes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use sb_types::{format_value, validation_error, FieldFormat, SbError};

use crate::contract::Contract;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractField {
    Expiration,
    Strike,
    OptionType,
    Bid,
    Ask,
    Open,
    Close,
    Change,
    Last,
    High,
    Low,
    Volume,
    OpenInterest,
    TradeDate,
    Delta,
    Gamma,
    Theta,
    Rho,
    Vega,
    ImpliedVolatility,
    SmoothImpliedVolatility,
    IntrinsicValue,
    ExtrinsicValue,
    LeverageRatio,
    InterestEquivalent,
    Mark,
}

impl ContractField {
    pub const ALL: [ContractField; 26] = [
        ContractField::Expiration,
        ContractField::Strike,
        ContractField::OptionType,
        ContractField::Bid,
        ContractField::Ask,
        ContractField::Open,
        ContractField::Close,
        ContractField::Change,
        ContractField::Last,
        ContractField::High,
        ContractField::Low,
        ContractField::Volume,
        ContractField::OpenInterest,
        ContractField::TradeDate,
        ContractField::Delta,
        ContractField::Gamma,
        ContractField::Theta,
        ContractField::Rho,
        ContractField::Vega,
        ContractField::ImpliedVolatility,
        ContractField::SmoothImpliedVolatility,
        ContractField::IntrinsicValue,
        ContractField::ExtrinsicValue,
        ContractField::LeverageRatio,
        ContractField::InterestEquivalent,
        ContractField::Mark,
    ];

    /// Stable identifier, matching the serialized form.
    pub fn key(&self) -> &'static str {
        match self {
            ContractField::Expiration => "expiration",
            ContractField::Strike => "strike",
            ContractField::OptionType => "option_type",
            ContractField::Bid => "bid",
            ContractField::Ask => "ask",
            ContractField::Open => "open",
            ContractField::Close => "close",
            ContractField::Change => "change",
            ContractField::Last => "last",
            ContractField::High => "high",
            ContractField::Low => "low",
            ContractField::Volume => "volume",
            ContractField::OpenInterest => "open_interest",
            ContractField::TradeDate => "trade_date",
            ContractField::Delta => "delta",
            ContractField::Gamma => "gamma",
            ContractField::Theta => "theta",
            ContractField::Rho => "rho",
            ContractField::Vega => "vega",
            ContractField::ImpliedVolatility => "implied_volatility",
            ContractField::SmoothImpliedVolatility => "smooth_implied_volatility",
            ContractField::IntrinsicValue => "intrinsic_value",
            ContractField::ExtrinsicValue => "extrinsic_value",
            ContractField::LeverageRatio => "leverage_ratio",
            ContractField::InterestEquivalent => "interest_equivalent",
            ContractField::Mark => "mark",
        }
    }

    /// Display label.
    pub fn name(&self) -> &'static str {
        match self {
            ContractField::Expiration => "Expiration",
            ContractField::Strike => "Strike Price",
            ContractField::OptionType => "Option Type",
            ContractField::Bid => "Bid Price",
            ContractField::Ask => "Ask Price",
            ContractField::Open => "Open Price",
            ContractField::Close => "Close Price",
            ContractField::Change => "Day Change",
            ContractField::Last => "Last Price",
            ContractField::High => "High Price",
            ContractField::Low => "Low Price",
            ContractField::Volume => "Volume",
            ContractField::OpenInterest => "Open Interest",
            ContractField::TradeDate => "Trade Date",
            ContractField::Delta => "Delta",
            ContractField::Gamma => "Gamma",
            ContractField::Theta => "Theta",
            ContractField::Rho => "Rho",
            ContractField::Vega => "Vega",
            ContractField::ImpliedVolatility => "Implied Volatility",
            ContractField::SmoothImpliedVolatility => "Smooth IV",
            ContractField::IntrinsicValue => "Intrinsic Value",
            ContractField::ExtrinsicValue => "Extrinsic Value",
            ContractField::LeverageRatio => "Leverage Ratio",
            ContractField::InterestEquivalent => "Interest Equivalent",
            ContractField::Mark => "Mark",
        }
    }

    pub fn format(&self) -> FieldFormat {
        match self {
            ContractField::Expiration | ContractField::TradeDate => FieldFormat::DateMillis,
            ContractField::Strike => FieldFormat::Strike,
            ContractField::OptionType => FieldFormat::OptionType,
            ContractField::Volume | ContractField::OpenInterest => FieldFormat::Integer,
            ContractField::Delta
            | ContractField::Gamma
            | ContractField::Theta
            | ContractField::Rho
            | ContractField::Vega => FieldFormat::Greeks,
            ContractField::ImpliedVolatility
            | ContractField::SmoothImpliedVolatility
            | ContractField::InterestEquivalent => FieldFormat::Percentage,
            ContractField::Bid
            | ContractField::Ask
            | ContractField::Open
            | ContractField::Close
            | ContractField::Change
            | ContractField::Last
            | ContractField::High
            | ContractField::Low
            | ContractField::IntrinsicValue
            | ContractField::ExtrinsicValue
            | ContractField::LeverageRatio
            | ContractField::Mark => FieldFormat::Price,
        }
    }

    /// Numeric value of the field; dates are epoch milliseconds and the
    /// option type has none.
    pub fn value(&self, contract: &Contract) -> Option<f64> {
        let greeks = &contract.greeks;
        match self {
            ContractField::Expiration => Some(contract.expiration_millis() as f64),
            ContractField::Strike => Some(contract.strike_f64()),
            ContractField::OptionType => None,
            ContractField::Bid => contract.bid,
            ContractField::Ask => contract.ask,
            ContractField::Open => contract.open,
            ContractField::Close => contract.close,
            ContractField::Change => contract.change,
            ContractField::Last => contract.last,
            ContractField::High => contract.high,
            ContractField::Low => contract.low,
            ContractField::Volume => contract.volume.map(|v| v as f64),
            ContractField::OpenInterest => contract.open_interest.map(|v| v as f64),
            ContractField::TradeDate => contract.trade_date.map(|d| d.timestamp_millis() as f64),
            ContractField::Delta => greeks.delta,
            ContractField::Gamma => greeks.gamma,
            ContractField::Theta => greeks.theta,
            ContractField::Rho => greeks.rho,
            ContractField::Vega => greeks.vega,
            ContractField::ImpliedVolatility => contract.implied_volatility,
            ContractField::SmoothImpliedVolatility => contract.smooth_implied_volatility,
            ContractField::IntrinsicValue => contract.intrinsic_value,
            ContractField::ExtrinsicValue => contract.extrinsic_value,
            ContractField::LeverageRatio => contract.leverage_ratio,
            ContractField::InterestEquivalent => contract.interest_equivalent,
            ContractField::Mark => contract.mark,
        }
    }

    /// Field value formatted for display.
    pub fn display(&self, contract: &Contract) -> String {
        match self {
            ContractField::OptionType => contract.option_type.to_string(),
            _ => format_value(self.value(contract), self.format()),
        }
    }
}

impl fmt::Display for ContractField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ContractField {
    type Err = SbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ContractField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| validation_error!("Unknown contract field: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::tests::sample_contract;
    use crate::contract::OptionKind;
    use rust_decimal_macros::dec;

    #[test]
    fn test_keys_round_trip() {
        for field in ContractField::ALL {
            assert_eq!(field.key().parse::<ContractField>().unwrap(), field);
            let json = serde_json::to_string(&field).unwrap();
            assert_eq!(json, format!("\"{}\"", field.key()));
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = "gamme".parse::<ContractField>().unwrap_err();
        assert!(matches!(err, SbError::Validation(ref m) if m.contains("gamme")));
    }

    #[test]
    fn test_names_and_formats() {
        assert_eq!(ContractField::Strike.name(), "Strike Price");
        assert_eq!(ContractField::SmoothImpliedVolatility.to_string(), "Smooth IV");
        assert_eq!(ContractField::Expiration.format(), FieldFormat::DateMillis);
        assert_eq!(ContractField::LeverageRatio.format(), FieldFormat::Price);
        assert_eq!(ContractField::InterestEquivalent.format(), FieldFormat::Percentage);
    }

    #[test]
    fn test_values() {
        let c = sample_contract(OptionKind::Put, dec!(150));
        assert_eq!(ContractField::Strike.value(&c), Some(150.0));
        assert_eq!(ContractField::Mark.value(&c), Some(5.0));
        assert_eq!(ContractField::OpenInterest.value(&c), Some(100.0));
        assert_eq!(ContractField::Gamma.value(&c), None);
        assert_eq!(ContractField::OptionType.value(&c), None);
        assert_eq!(
            ContractField::Expiration.value(&c),
            Some(c.expiration_millis() as f64)
        );
    }

    #[test]
    fn test_display_values() {
        let c = sample_contract(OptionKind::Put, dec!(150));
        assert_eq!(ContractField::OptionType.display(&c), "Put");
        assert_eq!(ContractField::Expiration.display(&c), "2026-06-20");
        assert_eq!(ContractField::ImpliedVolatility.display(&c), "30.00%");
        assert_eq!(ContractField::Gamma.display(&c), "N/A");
    }
}
