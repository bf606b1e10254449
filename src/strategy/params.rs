//! Strategy Parameters
//!
//! Immutable per-instrument configuration for the z-score engine.
//! Every tuned variant is just a different value of [`StrategyConfig`];
//! see `presets` for the historical tunings.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{BookSide, MidPriceRounding, TopOfBook};

/// Divisor used for rolling standard deviations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StdDevConvention {
    /// Divide by `w` (numpy default)
    #[default]
    Population,
    /// Divide by `w - 1` (python `statistics.stdev`)
    Sample,
}

/// Forced liquidation rule for an open position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopLoss {
    /// Flatten when the mid moves this many price units past the rolling mean
    /// against the position
    Distance(Decimal),
    /// Flatten when `|z|` exceeds this and the deviation is against the position
    ZScore(f64),
}

/// Whether entries must coincide with a volatility spike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpikeGate {
    /// Enter on the z-score alone
    #[default]
    Off,
    /// Enter only during a volatility spike
    Required,
    /// Require a spike unless the entry reverses the current position
    RequiredUnlessReversal,
}

/// Price of an aggressive order: a best price plus a signed offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteAnchor {
    pub reference: BookSide,
    #[serde(default)]
    pub offset: Decimal,
}

impl QuoteAnchor {
    pub const fn at(reference: BookSide) -> Self {
        Self {
            reference,
            offset: Decimal::ZERO,
        }
    }

    pub fn offset_by(mut self, offset: Decimal) -> Self {
        self.offset = offset;
        self
    }

    pub fn price(&self, top: &TopOfBook) -> Decimal {
        top.price(self.reference) + self.offset
    }
}

/// Anchors for every aggressive order the engine can send
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggressiveQuotes {
    pub entry_buy: QuoteAnchor,
    pub entry_sell: QuoteAnchor,
    pub exit_buy: QuoteAnchor,
    pub exit_sell: QuoteAnchor,
    pub stop_buy: QuoteAnchor,
    pub stop_sell: QuoteAnchor,
}

impl Default for AggressiveQuotes {
    /// Entries and stops cross the spread, exits rest on the near side
    fn default() -> Self {
        Self {
            entry_buy: QuoteAnchor::at(BookSide::BestAsk),
            entry_sell: QuoteAnchor::at(BookSide::BestBid),
            exit_buy: QuoteAnchor::at(BookSide::BestBid),
            exit_sell: QuoteAnchor::at(BookSide::BestAsk),
            stop_buy: QuoteAnchor::at(BookSide::BestAsk),
            stop_sell: QuoteAnchor::at(BookSide::BestBid),
        }
    }
}

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StrategyConfig {
    /// Largest absolute position the engine will ever request
    pub max_position: i64,
    /// Observations in the z-score lookback
    #[serde(alias = "lookback")]
    pub z_window: usize,
    /// Observations in the volatility baseline (spike detection)
    pub vol_window: Option<usize>,
    /// `|z|` above which a mean-reversion entry fires
    pub entry_z: f64,
    /// `|z|` below which an open position is reduced
    pub exit_z: f64,
    pub stop_loss: Option<StopLoss>,
    /// Recent std must exceed this multiple of the baseline std to count as a spike
    pub vol_spike_factor: f64,
    pub spike_gate: SpikeGate,
    /// Size floor for entries and exits, and the passive quote size
    pub base_qty: i64,
    /// Passive quote size when it differs from `base_qty`
    pub mm_qty: Option<i64>,
    /// Extra size per unit of `|z|`
    pub scale_qty: f64,
    /// Distance of passive quotes from the skewed mid
    pub mm_spread: Decimal,
    /// Reference-price shift per unit of position
    pub skew_coefficient: Decimal,
    pub mid_price_rounding: MidPriceRounding,
    pub std_dev_convention: StdDevConvention,
    pub quotes: AggressiveQuotes,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            max_position: 60,
            z_window: 50,
            vol_window: None,
            entry_z: 3.0,
            exit_z: 2.0,
            stop_loss: None,
            vol_spike_factor: 1.0,
            spike_gate: SpikeGate::Off,
            base_qty: 7,
            mm_qty: None,
            scale_qty: 2.0,
            mm_spread: dec!(2),
            skew_coefficient: dec!(0.05),
            mid_price_rounding: MidPriceRounding::Exact,
            std_dev_convention: StdDevConvention::Population,
            quotes: AggressiveQuotes::default(),
        }
    }
}

impl StrategyConfig {
    /// Create a new config with a custom z-score lookback
    pub fn with_lookback(mut self, window: usize) -> Self {
        self.z_window = window;
        self
    }

    /// Create a new config with custom entry/exit thresholds
    pub fn with_thresholds(mut self, entry_z: f64, exit_z: f64) -> Self {
        self.entry_z = entry_z;
        self.exit_z = exit_z;
        self
    }

    pub fn with_max_position(mut self, max_position: i64) -> Self {
        self.max_position = max_position;
        self
    }

    pub fn with_sizing(mut self, base_qty: i64, scale_qty: f64) -> Self {
        self.base_qty = base_qty;
        self.scale_qty = scale_qty;
        self
    }

    pub fn with_mm_qty(mut self, mm_qty: i64) -> Self {
        self.mm_qty = Some(mm_qty);
        self
    }

    /// Size of each passive quote
    pub fn passive_qty(&self) -> i64 {
        self.mm_qty.unwrap_or(self.base_qty)
    }

    pub fn with_spread(mut self, mm_spread: Decimal) -> Self {
        self.mm_spread = mm_spread;
        self
    }

    pub fn with_skew(mut self, skew_coefficient: Decimal) -> Self {
        self.skew_coefficient = skew_coefficient;
        self
    }

    pub fn with_stop_loss(mut self, stop_loss: StopLoss) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    /// Enable volatility-spike gating with its baseline window
    pub fn with_spike_gate(mut self, gate: SpikeGate, vol_window: usize, factor: f64) -> Self {
        self.spike_gate = gate;
        self.vol_window = Some(vol_window);
        self.vol_spike_factor = factor;
        self
    }

    pub fn with_rounding(mut self, rounding: MidPriceRounding) -> Self {
        self.mid_price_rounding = rounding;
        self
    }

    pub fn with_std_dev_convention(mut self, convention: StdDevConvention) -> Self {
        self.std_dev_convention = convention;
        self
    }

    pub fn with_quotes(mut self, quotes: AggressiveQuotes) -> Self {
        self.quotes = quotes;
        self
    }

    /// Longest lookback; also the retained length of the price window
    pub fn max_window(&self) -> usize {
        self.z_window.max(self.vol_window.unwrap_or(0))
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_position < 0 {
            return Err(ConfigError::InvalidMaxPosition(self.max_position));
        }
        if self.z_window == 0 {
            return Err(ConfigError::InvalidWindow("z_window"));
        }
        if self.vol_window == Some(0) {
            return Err(ConfigError::InvalidWindow("vol_window"));
        }
        check_threshold("entry_z", self.entry_z)?;
        check_threshold("exit_z", self.exit_z)?;
        check_threshold("vol_spike_factor", self.vol_spike_factor)?;
        match self.stop_loss {
            Some(StopLoss::Distance(distance)) if distance.is_sign_negative() => {
                return Err(ConfigError::InvalidStopLoss(distance.to_string()));
            }
            Some(StopLoss::ZScore(z)) if !z.is_finite() || z < 0.0 => {
                return Err(ConfigError::InvalidStopLoss(z.to_string()));
            }
            _ => {}
        }
        if self.spike_gate != SpikeGate::Off && self.vol_window.is_none() {
            return Err(ConfigError::MissingVolWindow);
        }
        if self.base_qty < 0 {
            return Err(ConfigError::InvalidQuantity(self.base_qty));
        }
        if let Some(mm_qty) = self.mm_qty.filter(|q| *q < 0) {
            return Err(ConfigError::InvalidQuantity(mm_qty));
        }
        if !self.scale_qty.is_finite() || self.scale_qty < 0.0 {
            return Err(ConfigError::InvalidScale(self.scale_qty));
        }
        if self.mm_spread.is_sign_negative() {
            return Err(ConfigError::InvalidSpread(self.mm_spread));
        }
        if self.skew_coefficient.is_sign_negative() {
            return Err(ConfigError::InvalidSkew(self.skew_coefficient));
        }
        Ok(())
    }
}

fn check_threshold(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidThreshold { name, value });
    }
    Ok(())
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid max position: {0} (must be >= 0)")]
    InvalidMaxPosition(i64),
    #[error("Invalid {0}: window length must be >= 1")]
    InvalidWindow(&'static str),
    #[error("Invalid {name}: {value} (must be a finite value >= 0)")]
    InvalidThreshold { name: &'static str, value: f64 },
    #[error("Invalid stop loss: {0} (must be >= 0)")]
    InvalidStopLoss(String),
    #[error("Spike gating requires vol_window to be set")]
    MissingVolWindow,
    #[error("Invalid base quantity: {0} (must be >= 0)")]
    InvalidQuantity(i64),
    #[error("Invalid quantity scale: {0} (must be a finite value >= 0)")]
    InvalidScale(f64),
    #[error("Invalid market making spread: {0} (must be >= 0)")]
    InvalidSpread(Decimal),
    #[error("Invalid skew coefficient: {0} (must be >= 0)")]
    InvalidSkew(Decimal),
    #[error("Invalid fair value: {0} (must be > 0)")]
    InvalidFairValue(Decimal),
}
