pub mod chain;
pub mod classify;
pub mod config;
pub mod contract;
pub mod field;
pub mod forecast;
pub mod greeks;
pub mod metrics;
pub mod pricing;
pub mod query;
pub mod strategy;

pub use chain::*;
pub use classify::*;
pub use config::*;
pub use contract::*;
pub use field::*;
pub use forecast::*;
pub use greeks::*;
pub use metrics::*;
pub use pricing::*;
pub use query::*;
pub use strategy::*;
