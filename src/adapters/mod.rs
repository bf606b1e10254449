//! Adapters Layer - External System Implementations
//!
//! - CLI: Command-line interface handlers
//! - Replay: JSON-lines tick input and order output

pub mod cli;
pub mod replay;

pub use cli::CliApp;
pub use replay::{OrderRecord, ReplayError, ReplaySummary, TickReader};
