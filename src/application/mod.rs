//! Application Layer - Per-tick dispatch across instruments

pub mod dispatcher;

pub use dispatcher::{DispatchError, Dispatcher, TickOrders};
