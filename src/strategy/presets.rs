//! Tuned Presets
//!
//! Historical per-instrument tunings expressed as plain [`StrategyConfig`]
//! values. Selectable from config files (`kind = "preset"`) and the CLI.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{BookSide, MidPriceRounding};
use crate::strategy::params::{
    AggressiveQuotes, QuoteAnchor, SpikeGate, StdDevConvention, StopLoss, StrategyConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Full-size 50-tick reversion on a floored mid, no exit or stop
    Drowzee,
    /// Slow 50-tick reversion with a fixed-distance stop
    #[value(name = "new_drowzee")]
    NewDrowzee,
    /// Full-size 50-tick reversion on a floored mid with a wide distance stop
    Shinx,
    /// Fast 100-tick reversion, big base size, z stop at 3.5
    Ash,
    /// 100-tick reversion with a wide z stop at 4
    Jolteon,
    /// Long 200-tick z window, spike gated unless reversing
    Luxray,
    /// Short windows, strictly spike gated
    Abra,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Drowzee,
        Preset::NewDrowzee,
        Preset::Shinx,
        Preset::Ash,
        Preset::Jolteon,
        Preset::Luxray,
        Preset::Abra,
    ];

    pub fn config(self) -> StrategyConfig {
        match self {
            Preset::Drowzee => drowzee(),
            Preset::NewDrowzee => new_drowzee(),
            Preset::Shinx => shinx(),
            Preset::Ash => ash(),
            Preset::Jolteon => jolteon(),
            Preset::Luxray => luxray(),
            Preset::Abra => abra(),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Preset::Drowzee => "drowzee",
            Preset::NewDrowzee => "new_drowzee",
            Preset::Shinx => "shinx",
            Preset::Ash => "ash",
            Preset::Jolteon => "jolteon",
            Preset::Luxray => "luxray",
            Preset::Abra => "abra",
        };
        write!(f, "{}", name)
    }
}

fn anchor(reference: BookSide, offset: Decimal) -> QuoteAnchor {
    QuoteAnchor::at(reference).offset_by(offset)
}

/// Entries take the whole remaining room; passive quotes sit one tick out
fn full_size_entries(max_position: i64) -> StrategyConfig {
    StrategyConfig::default()
        .with_max_position(max_position)
        .with_sizing(max_position, 0.0)
        .with_mm_qty(25)
        .with_spread(dec!(1))
        .with_skew(Decimal::ZERO)
        .with_rounding(MidPriceRounding::Floor)
        .with_std_dev_convention(StdDevConvention::Sample)
}

pub fn drowzee() -> StrategyConfig {
    full_size_entries(50)
        .with_lookback(50)
        .with_thresholds(3.75, 0.0)
}

pub fn shinx() -> StrategyConfig {
    full_size_entries(60)
        .with_lookback(50)
        .with_thresholds(2.8, 0.0)
        .with_stop_loss(StopLoss::Distance(dec!(20)))
}

pub fn new_drowzee() -> StrategyConfig {
    StrategyConfig::default()
        .with_max_position(60)
        .with_lookback(50)
        .with_thresholds(3.0, 2.0)
        .with_sizing(7, 2.0)
        .with_spread(dec!(2))
        .with_stop_loss(StopLoss::Distance(dec!(10)))
        .with_std_dev_convention(StdDevConvention::Sample)
}

pub fn ash() -> StrategyConfig {
    StrategyConfig::default()
        .with_max_position(60)
        .with_lookback(100)
        .with_thresholds(1.95, 0.7)
        .with_sizing(39, 5.0)
        .with_spread(dec!(1))
        .with_skew(Decimal::ZERO)
        .with_stop_loss(StopLoss::ZScore(3.5))
        .with_quotes(AggressiveQuotes {
            entry_buy: anchor(BookSide::BestBid, dec!(1)),
            entry_sell: anchor(BookSide::BestAsk, dec!(-3)),
            exit_buy: anchor(BookSide::BestBid, Decimal::ZERO),
            exit_sell: anchor(BookSide::BestAsk, dec!(1)),
            stop_buy: anchor(BookSide::BestAsk, dec!(-1)),
            stop_sell: anchor(BookSide::BestBid, dec!(-1)),
        })
}

pub fn jolteon() -> StrategyConfig {
    StrategyConfig::default()
        .with_max_position(350)
        .with_lookback(100)
        .with_thresholds(2.0, 0.4)
        .with_sizing(9, 5.0)
        .with_spread(dec!(1))
        .with_skew(Decimal::ZERO)
        .with_stop_loss(StopLoss::ZScore(4.0))
        .with_quotes(AggressiveQuotes {
            entry_buy: anchor(BookSide::BestBid, dec!(1)),
            entry_sell: anchor(BookSide::BestAsk, dec!(-1)),
            exit_buy: anchor(BookSide::BestBid, Decimal::ZERO),
            exit_sell: anchor(BookSide::BestAsk, dec!(1)),
            stop_buy: anchor(BookSide::BestAsk, Decimal::ZERO),
            stop_sell: anchor(BookSide::BestBid, Decimal::ZERO),
        })
}

pub fn luxray() -> StrategyConfig {
    StrategyConfig::default()
        .with_max_position(250)
        .with_lookback(200)
        .with_thresholds(1.6, 0.3)
        .with_spike_gate(SpikeGate::RequiredUnlessReversal, 70, 1.25)
        .with_sizing(20, 20.0)
        .with_spread(dec!(2))
        .with_skew(Decimal::ZERO)
        .with_quotes(passive_entry_quotes(dec!(-1)))
}

pub fn abra() -> StrategyConfig {
    StrategyConfig::default()
        .with_max_position(50)
        .with_lookback(30)
        .with_thresholds(1.2, 0.2)
        .with_spike_gate(SpikeGate::Required, 20, 0.1)
        .with_sizing(10, 10.0)
        .with_spread(dec!(2))
        .with_skew(Decimal::ZERO)
        .with_quotes(passive_entry_quotes(Decimal::ZERO))
}

/// Entries join the near side; sells improve the ask slightly
fn passive_entry_quotes(exit_buy_offset: Decimal) -> AggressiveQuotes {
    AggressiveQuotes {
        entry_buy: anchor(BookSide::BestBid, Decimal::ZERO),
        entry_sell: anchor(BookSide::BestAsk, dec!(-1)),
        exit_buy: anchor(BookSide::BestBid, exit_buy_offset),
        exit_sell: anchor(BookSide::BestAsk, Decimal::ZERO),
        ..AggressiveQuotes::default()
    }
}
