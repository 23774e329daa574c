use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Quote for the underlying of an options chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub name: String,
    pub spot_price: f64,
    pub change: f64,
}

impl StockQuote {
    pub fn new(symbol: &str, name: &str, spot_price: f64, change: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            spot_price,
            change,
        }
    }

    /// Day change as a fraction of the previous close.
    pub fn change_ratio(&self) -> Option<f64> {
        let previous = self.spot_price - self.change;
        if previous != 0.0 && previous.is_finite() {
            Some(self.change / previous)
        } else {
            None
        }
    }
}

impl fmt::Display for StockQuote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) {:.2}", self.symbol, self.name, self.spot_price)
    }
}

/// Quote as delivered by the broker feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    pub last: f64,
    #[serde(default)]
    pub change: f64,
}

impl From<RawQuote> for StockQuote {
    fn from(raw: RawQuote) -> Self {
        Self {
            symbol: raw.symbol,
            name: raw.description,
            spot_price: raw.last,
            change: raw.change,
        }
    }
}

/// Daily OHLCV quote for the underlying
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalQuote {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
    pub high: f64,
    pub low: f64,
    pub volume: u64,
}

impl HistoricalQuote {
    /// Close rounded to cents, as plotted next to implied-move bands.
    pub fn rounded_close(&self) -> f64 {
        (self.close * 100.0).round() / 100.0
    }
}
