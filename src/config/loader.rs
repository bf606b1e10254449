//! Configuration Loader
//!
//! Loads and validates the quoting configuration from a TOML file:
//!
//! ```toml
//! [logging]
//! level = "info"
//!
//! [instruments.PRODUCT]
//! kind = "zscore"
//! lookback = 50
//! entry_z = 3.0
//! stop_loss = { distance = 10 }
//!
//! [instruments.PEARLS]
//! kind = "fixed_fair_value"
//! fair_value = 10000
//! max_position = 20
//!
//! [instruments.BANANAS]
//! kind = "preset"
//! name = "ash"
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::QuotingStrategy;
use crate::strategy::{
    ConfigError as StrategyConfigError, FixedFairValueConfig, FixedFairValueStrategy, Preset,
    StrategyConfig, StrategyEngine,
};

/// Environment variable that overrides `[logging] level`
pub const LOG_LEVEL_ENV: &str = "ZQUOTE_LOG_LEVEL";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub instruments: BTreeMap<String, InstrumentConfig>,
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl LoggingSection {
    /// Log level with environment variable override
    /// Checks ZQUOTE_LOG_LEVEL env var first, falls back to config value
    pub fn get_level(&self) -> String {
        std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| self.level.clone())
    }
}

/// One `[instruments.<NAME>]` table, selected by its `kind` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InstrumentConfig {
    Zscore(StrategyConfig),
    Preset { name: Preset },
    FixedFairValue(FixedFairValueConfig),
}

impl InstrumentConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            InstrumentConfig::Zscore(_) => "zscore",
            InstrumentConfig::Preset { .. } => "preset",
            InstrumentConfig::FixedFairValue(_) => "fixed_fair_value",
        }
    }

    pub fn position_limit(&self) -> i64 {
        match self {
            InstrumentConfig::Zscore(config) => config.max_position,
            InstrumentConfig::Preset { name } => name.config().max_position,
            InstrumentConfig::FixedFairValue(config) => config.max_position,
        }
    }

    pub fn validate(&self) -> Result<(), StrategyConfigError> {
        match self {
            InstrumentConfig::Zscore(config) => config.validate(),
            InstrumentConfig::Preset { name } => name.config().validate(),
            InstrumentConfig::FixedFairValue(config) => config.validate(),
        }
    }

    /// Construct the strategy this table describes for `instrument`
    pub fn build(&self, instrument: &str) -> Result<Box<dyn QuotingStrategy>, StrategyConfigError> {
        Ok(match self {
            InstrumentConfig::Zscore(config) => {
                Box::new(StrategyEngine::new(instrument, config.clone())?)
            }
            InstrumentConfig::Preset { name } => {
                Box::new(StrategyEngine::new(instrument, name.config())?)
            }
            InstrumentConfig::FixedFairValue(config) => {
                Box::new(FixedFairValueStrategy::new(instrument, config.clone())?)
            }
        })
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to render TOML: {0}")]
    RenderError(#[from] toml::ser::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("Invalid config for instrument {instrument}: {source}")]
    InstrumentError {
        instrument: String,
        #[source]
        source: StrategyConfigError,
    },
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

#[derive(Serialize)]
struct InstrumentTables<'a> {
    instruments: BTreeMap<&'a str, &'a InstrumentConfig>,
}

/// Render `instrument` as a standalone `[instruments.<NAME>]` document that
/// [`parse_config`] accepts
pub fn render_instrument(name: &str, instrument: &InstrumentConfig) -> Result<String, ConfigError> {
    let tables = InstrumentTables {
        instruments: BTreeMap::from([(name, instrument)]),
    };
    Ok(toml::to_string(&tables)?)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got {}",
                LOG_LEVELS, self.logging.level
            )));
        }

        if self.instruments.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [instruments.<NAME>] table is required".to_string(),
            ));
        }

        for (name, instrument) in &self.instruments {
            if name.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "instrument name cannot be empty".to_string(),
                ));
            }
            instrument
                .validate()
                .map_err(|source| ConfigError::InstrumentError {
                    instrument: name.clone(),
                    source,
                })?;
        }

        Ok(())
    }
}
