use serde::{Deserialize, Serialize};

/// Option greeks as quoted by the broker. Any of them may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    /// Rate of change of option price w.r.t. underlying price.
    pub delta: Option<f64>,
    /// Rate of change of delta w.r.t. underlying price.
    pub gamma: Option<f64>,
    /// Rate of change of option price w.r.t. time (per calendar day).
    pub theta: Option<f64>,
    /// Rate of change of option price w.r.t. volatility (per 1% move).
    pub vega: Option<f64>,
    /// Rate of change of option price w.r.t. risk-free rate (per 1% move).
    pub rho: Option<f64>,
}

/// Position-weighted greeks summed over the legs of a strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NetGreeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
    pub rho: f64,
}

impl NetGreeks {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Add `greeks` scaled by `weight`; missing greeks contribute nothing.
    pub fn accumulate(&mut self, greeks: &Greeks, weight: f64) {
        let scaled = |g: Option<f64>| g.filter(|v| v.is_finite()).map_or(0.0, |v| v * weight);
        self.delta += scaled(greeks.delta);
        self.gamma += scaled(greeks.gamma);
        self.theta += scaled(greeks.theta);
        self.vega += scaled(greeks.vega);
        self.rho += scaled(greeks.rho);
    }
}
