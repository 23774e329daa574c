use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Strikeboard analytics core
#[derive(Error, Debug)]
pub enum SbError {
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),

    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Errors raised while normalizing broker data into an options chain
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChainError {
    #[error("Duplicate contract symbol: {symbol}")]
    DuplicateSymbol { symbol: String },

    #[error("Contract record {index} has no symbol")]
    MissingSymbol { index: usize },

    #[error("Invalid expiration date for {symbol}: {value}")]
    InvalidExpiration { symbol: String, value: String },

    #[error("Invalid option type for {symbol}: {value}")]
    InvalidOptionType { symbol: String, value: String },

    #[error("Contract {symbol} has no strike")]
    MissingStrike { symbol: String },

    #[error("Contract not found: {symbol}")]
    ContractNotFound { symbol: String },
}

/// Errors raised while editing or evaluating an option strategy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Strategy leg not found: {id}")]
    LegNotFound { id: String },

    #[error("Invalid position size for leg {id}: {size}")]
    InvalidPositionSize { id: String, size: i64 },

    #[error("Invalid forecast interval: {message}")]
    InvalidForecastInterval { message: String },
}

/// Result type alias for Strikeboard operations
pub type SbResult<T> = Result<T, SbError>;

/// Macro for creating validation errors
#[macro_export]
macro_rules! validation_error {
    ($($arg:tt)*) => {
        $crate::SbError::Validation(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::SbError::Config(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ChainError::DuplicateSymbol {
            symbol: "AAPL240119C00150000".to_string(),
        };

        assert!(error.to_string().contains("Duplicate"));
        assert!(error.to_string().contains("AAPL240119C00150000"));
    }

    #[test]
    fn test_error_conversion() {
        let strategy_error = StrategyError::LegNotFound {
            id: "SPY".to_string(),
        };
        let sb_error: SbError = strategy_error.into();

        match sb_error {
            SbError::Strategy(StrategyError::LegNotFound { id }) => assert_eq!(id, "SPY"),
            _ => panic!("Expected Strategy error"),
        }
    }

    #[test]
    fn test_macros() {
        let validation_err = validation_error!("Unknown field: {}", "foo");
        assert!(matches!(validation_err, SbError::Validation(ref m) if m == "Unknown field: foo"));

        let config_err = config_error!("spot_interval_count must be positive");
        assert!(config_err.to_string().starts_with("Configuration error"));
    }
}
