//! Strategy Layer - Z-Score Mean Reversion with Regime-Based Quoting
//!
//! Per instrument, each tick flows through:
//! - `PriceWindow`: bounded history of mid prices
//! - `StatisticsEngine`: rolling mean, std dev, z-score and volatility spike flag
//! - `RegimeClassifier`: stop-loss > entry > exit > market making
//! - `OrderSizer` / `QuoteBuilder`: turn the regime into concrete orders
//!
//! `StrategyEngine` wires these together behind the `QuotingStrategy` port.
//! `FixedFairValueStrategy` is the alternative for pinned-value instruments.

pub mod engine;
pub mod fixed_fair_value;
pub mod params;
pub mod presets;
pub mod quotes;
pub mod regime;
pub mod sizer;
pub mod statistics;
pub mod window;

pub use engine::{Evaluation, StrategyEngine};
pub use fixed_fair_value::{FixedFairValueConfig, FixedFairValueStrategy};
pub use params::{
    AggressiveQuotes, ConfigError, QuoteAnchor, SpikeGate, StdDevConvention, StopLoss,
    StrategyConfig,
};
pub use presets::Preset;
pub use quotes::{Intent, QuoteBuilder};
pub use regime::{FallbackReason, Regime, RegimeClassifier, StopTrigger};
pub use sizer::OrderSizer;
pub use statistics::{SignalSnapshot, StatisticsEngine};
pub use window::PriceWindow;
