//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, InstrumentConfig, LoggingSection, load_config, parse_config,
    render_instrument,
};
