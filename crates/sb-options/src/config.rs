//! Tunable defaults for normalization, forecasting and aggregate metrics.
//!
//! Model constants (risk-free rate, payoff sentinels, the implied-move
//! factor) are deliberately absent: they live next to the code that uses them.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::Path;

use sb_types::{config_error, SbResult};

/// How the normalizer treats malformed broker records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Fail the whole chain on the first bad record instead of setting it
    /// aside in [`crate::chain::OptionsChain::rejected`].
    pub strict: bool,
}

/// Step between adjacent spot prices on a forecast axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpotInterval {
    /// Absolute step in dollars.
    Dollars(f64),
    /// Step as a percentage of the current spot price.
    Percent(f64),
}

impl SpotInterval {
    /// Absolute step at the given spot price.
    pub fn resolve(&self, spot: f64) -> f64 {
        match self {
            SpotInterval::Dollars(step) => *step,
            SpotInterval::Percent(pct) => spot * pct / 100.0,
        }
    }

    fn amount(&self) -> f64 {
        match self {
            SpotInterval::Dollars(v) | SpotInterval::Percent(v) => *v,
        }
    }
}

/// Grid used when forecasting a strategy across spot prices and dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Days between forecast rows.
    pub date_interval_days: i64,
    pub spot_interval: SpotInterval,
    /// Number of steps on each side of the current spot.
    pub spot_interval_count: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            date_interval_days: 7,
            spot_interval: SpotInterval::Percent(3.0),
            spot_interval_count: 4,
        }
    }
}

impl ForecastConfig {
    /// Resolve to the `(date step, spot step)` pair taken by
    /// [`crate::forecast::forecast_table`].
    pub fn resolve(&self, spot: f64) -> SbResult<(Duration, f64)> {
        Ok((self.date_step()?, self.spot_interval.resolve(spot)))
    }

    fn date_step(&self) -> SbResult<Duration> {
        Duration::try_days(self.date_interval_days).ok_or_else(|| {
            config_error!(
                "forecast.date_interval_days is out of range: {}",
                self.date_interval_days
            )
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Scales the implied move reported per expiration.
    pub implied_move_multiplier: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            implied_move_multiplier: 1.0,
        }
    }
}

/// Top-level analytics configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub normalizer: NormalizerConfig,
    pub forecast: ForecastConfig,
    pub metrics: MetricsConfig,
}

impl AnalyticsConfig {
    pub fn from_json_str(json: &str) -> SbResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SbResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> SbResult<()> {
        if self.forecast.date_interval_days <= 0 {
            return Err(config_error!(
                "forecast.date_interval_days must be positive, got {}",
                self.forecast.date_interval_days
            ));
        }
        self.forecast.date_step()?;
        let amount = self.forecast.spot_interval.amount();
        if !(amount.is_finite() && amount > 0.0) {
            return Err(config_error!(
                "forecast.spot_interval must be positive, got {}",
                amount
            ));
        }
        if self.forecast.spot_interval_count == 0 {
            return Err(config_error!("forecast.spot_interval_count must be at least 1"));
        }
        let multiplier = self.metrics.implied_move_multiplier;
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(config_error!(
                "metrics.implied_move_multiplier must be positive, got {}",
                multiplier
            ));
        }
        Ok(())
    }
}
