//! zquote - Z-Score Signal and Quoting Engine Library
//!
//! One parametric per-instrument engine that turns order-book snapshots and
//! signed positions into orders: stop-loss liquidation, mean-reversion
//! entries and exits, or inventory-skewed passive market making.
//!
//! # Modules
//!
//! - `domain`: Core value types (OrderBookSnapshot, Order, MarketTick)
//! - `ports`: Trait abstractions (QuotingStrategy)
//! - `strategy`: Signal generation and quoting (StrategyEngine, presets)
//! - `application`: Per-tick dispatch across instruments
//! - `config`: Configuration loading and validation
//! - `adapters`: CLI and JSON-lines replay

pub mod domain;
pub mod ports;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;

pub use application::{Dispatcher, TickOrders};
pub use domain::{MarketTick, Order, OrderBookSnapshot, Side};
pub use ports::QuotingStrategy;
pub use strategy::{StrategyConfig, StrategyEngine};
