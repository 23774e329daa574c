//! Human-readable rendering of analytics values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a numeric field should be rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    Price,
    Percentage,
    DateMillis,
    Greeks,
    Strike,
    Integer,
    /// Categorical field with no numeric rendering.
    OptionType,
}

impl fmt::Display for FieldFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldFormat::Price => "price",
            FieldFormat::Percentage => "percentage",
            FieldFormat::DateMillis => "date_millis",
            FieldFormat::Greeks => "greeks",
            FieldFormat::Strike => "strike",
            FieldFormat::Integer => "integer",
            FieldFormat::OptionType => "option_type",
        };
        write!(f, "{}", s)
    }
}

/// Render a value according to its field format.
///
/// Missing values render as `"N/A"`; NaN and categorical formats render empty.
pub fn format_value(value: Option<f64>, format: FieldFormat) -> String {
    let v = match value {
        Some(v) => v,
        None => return "N/A".to_string(),
    };
    if v.is_nan() {
        return String::new();
    }

    match format {
        FieldFormat::Price => format_price(v),
        FieldFormat::Percentage => percentage(v),
        FieldFormat::DateMillis => DateTime::<Utc>::from_timestamp_millis(v as i64)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        FieldFormat::Greeks => format!("{:.2}", v),
        FieldFormat::Strike => format!("${}", v),
        FieldFormat::Integer => format!("{}", v.round()),
        FieldFormat::OptionType => String::new(),
    }
}

/// `$1.50` / `-$1.50`.
pub fn format_price(value: f64) -> String {
    if value < 0.0 {
        format!("-${:.2}", value.abs())
    } else {
        format!("${:.2}", value)
    }
}

/// Ratio as a two-decimal percentage (`0.1234` → `12.34%`).
pub fn percentage(ratio: f64) -> String {
    format!("{:.2}%", ratio * 100.0)
}

/// Signed percent change between two prices, `"ERR"` when undefined.
pub fn percent_change(from: f64, to: f64) -> String {
    if to == 0.0 || from == 0.0 {
        return "ERR".to_string();
    }
    let ratio = to / from;
    if ratio >= 1.0 {
        format!("+{:.2}%", (ratio - 1.0) * 100.0)
    } else {
        format!("-{:.2}%", (1.0 - ratio) * 100.0)
    }
}

/// Abbreviate large magnitudes with K/M/B/T suffixes.
pub fn big_number(value: f64) -> String {
    const STEPS: [(f64, &str); 4] = [
        (1_000_000_000_000.0, "T"),
        (1_000_000_000.0, "B"),
        (1_000_000.0, "M"),
        (1_000.0, "K"),
    ];
    for (threshold, suffix) in STEPS {
        if value >= threshold {
            return format!("{:.2}{}", value / threshold, suffix);
        }
    }
    format!("{}", value.round())
}

/// Profit of `close` relative to an opening value. A negative opening value
/// is a credit, so the sign of the ratio flips.
pub fn net_profit_percentage(open: f64, close: f64) -> String {
    if open == 0.0 {
        return "N/A".to_string();
    }
    let mut ratio = (close - open) / open;
    if open < 0.0 {
        ratio = -ratio;
    }
    let sign = if ratio >= 0.0 { "+" } else { "-" };
    format!("{}{:.2}%", sign, (ratio * 100.0).abs())
}
