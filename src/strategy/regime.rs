//! Regime Classification
//!
//! Picks the trading regime for one tick. Rules are evaluated in strict
//! priority order and the first match wins:
//!
//! 1. `StopLoss` - open position with an adverse move past the stop
//! 2. `Entry` - `|z| > entry_z` with headroom (optionally spike gated)
//! 3. `Exit` - `|z| < exit_z` with an open position
//! 4. `MarketMaking` - everything else

use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;

use crate::domain::Side;
use crate::strategy::params::{SpikeGate, StopLoss, StrategyConfig};
use crate::strategy::statistics::SignalSnapshot;

/// Which stop rule fired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopTrigger {
    Distance,
    ZScore,
}

/// Why the engine fell back to passive quoting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// Not every lookback window is filled yet
    Warmup,
    /// Rolling standard deviation is zero
    NoDispersion,
    /// No stop, entry or exit condition matched
    NoSignal,
    /// An entry or exit matched but sized to zero
    ZeroSize,
}

/// Regime selected for a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "regime", rename_all = "snake_case")]
pub enum Regime {
    StopLoss { trigger: StopTrigger },
    Entry { side: Side },
    Exit,
    MarketMaking { reason: FallbackReason },
}

impl Regime {
    pub fn is_market_making(&self) -> bool {
        matches!(self, Regime::MarketMaking { .. })
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::StopLoss { trigger } => write!(f, "StopLoss({:?})", trigger),
            Regime::Entry { side } => write!(f, "Entry({})", side),
            Regime::Exit => write!(f, "Exit"),
            Regime::MarketMaking { reason } => write!(f, "MarketMaking({:?})", reason),
        }
    }
}

/// Stop rule with prices already in the statistics domain
#[derive(Debug, Clone, Copy, PartialEq)]
enum StopRule {
    Distance(f64),
    ZScore(f64),
}

#[derive(Debug, Clone)]
pub struct RegimeClassifier {
    entry_z: f64,
    exit_z: f64,
    max_position: i64,
    stop: Option<StopRule>,
    spike_gate: SpikeGate,
}

impl RegimeClassifier {
    pub fn new(config: &StrategyConfig) -> Self {
        let stop = config.stop_loss.and_then(|stop| match stop {
            StopLoss::Distance(distance) => distance.to_f64().map(StopRule::Distance),
            StopLoss::ZScore(z) => Some(StopRule::ZScore(z)),
        });
        Self {
            entry_z: config.entry_z,
            exit_z: config.exit_z,
            max_position: config.max_position,
            stop,
            spike_gate: config.spike_gate,
        }
    }

    /// Classify a tick. `signals` is `None` while the window is warming up.
    pub fn classify(&self, signals: Option<&SignalSnapshot>, position: i64) -> Regime {
        let Some(signals) = signals else {
            return Regime::MarketMaking { reason: FallbackReason::Warmup };
        };
        if !signals.has_dispersion() {
            return Regime::MarketMaking { reason: FallbackReason::NoDispersion };
        }
        if let Some(trigger) = self.stop_trigger(signals, position) {
            return Regime::StopLoss { trigger };
        }
        if let Some(side) = self.entry_side(signals, position) {
            return Regime::Entry { side };
        }
        if position != 0 && signals.deviation_magnitude() < self.exit_z {
            return Regime::Exit;
        }
        Regime::MarketMaking { reason: FallbackReason::NoSignal }
    }

    fn stop_trigger(&self, signals: &SignalSnapshot, position: i64) -> Option<StopTrigger> {
        if position == 0 {
            return None;
        }
        let long = position > 0;
        match self.stop? {
            StopRule::Distance(distance) => {
                let hit = if long {
                    signals.mid < signals.mean - distance
                } else {
                    signals.mid > signals.mean + distance
                };
                hit.then_some(StopTrigger::Distance)
            }
            StopRule::ZScore(stop_z) => {
                let adverse = if long {
                    signals.z_score < 0.0
                } else {
                    signals.z_score > 0.0
                };
                (adverse && signals.deviation_magnitude() > stop_z).then_some(StopTrigger::ZScore)
            }
        }
    }

    fn entry_side(&self, signals: &SignalSnapshot, position: i64) -> Option<Side> {
        // price surged: fade it by selling; price dumped: buy
        let side = if signals.is_overbought(self.entry_z) && position > -self.max_position {
            Side::Sell
        } else if signals.is_oversold(self.entry_z) && position < self.max_position {
            Side::Buy
        } else {
            return None;
        };

        let reversal = match side {
            Side::Sell => position > 0,
            Side::Buy => position < 0,
        };
        let allowed = match self.spike_gate {
            SpikeGate::Off => true,
            SpikeGate::Required => signals.volatility_spike,
            SpikeGate::RequiredUnlessReversal => signals.volatility_spike || reversal,
        };
        allowed.then_some(side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(mid: f64, mean: f64, std_dev: f64, spike: bool) -> SignalSnapshot {
        SignalSnapshot {
            mid,
            mean,
            std_dev,
            z_score: (mid - mean) / std_dev,
            volatility_spike: spike,
        }
    }

    fn classifier(config: StrategyConfig) -> RegimeClassifier {
        RegimeClassifier::new(&config)
    }

    #[test]
    fn test_warmup_and_zero_dispersion() {
        let c = classifier(StrategyConfig::default());
        assert_eq!(
            c.classify(None, 0),
            Regime::MarketMaking { reason: FallbackReason::Warmup }
        );

        let flat = SignalSnapshot {
            mid: 100.0,
            mean: 100.0,
            std_dev: 0.0,
            z_score: 0.0,
            volatility_spike: false,
        };
        assert_eq!(
            c.classify(Some(&flat), 10),
            Regime::MarketMaking { reason: FallbackReason::NoDispersion }
        );
    }

    #[test]
    fn test_entry_direction() {
        let c = classifier(StrategyConfig::default().with_thresholds(2.0, 0.5));
        let surge = snapshot(106.0, 100.0, 2.0, false);
        let dump = snapshot(94.0, 100.0, 2.0, false);

        assert_eq!(c.classify(Some(&surge), 0), Regime::Entry { side: Side::Sell });
        assert_eq!(c.classify(Some(&dump), 0), Regime::Entry { side: Side::Buy });
    }

    #[test]
    fn test_entry_requires_headroom() {
        let c = classifier(StrategyConfig::default().with_thresholds(2.0, 0.5).with_max_position(20));
        let dump = snapshot(94.0, 100.0, 2.0, false);

        assert_eq!(c.classify(Some(&dump), 19), Regime::Entry { side: Side::Buy });
        assert_eq!(
            c.classify(Some(&dump), 20),
            Regime::MarketMaking { reason: FallbackReason::NoSignal }
        );

        let surge = snapshot(106.0, 100.0, 2.0, false);
        assert_eq!(
            c.classify(Some(&surge), -20),
            Regime::MarketMaking { reason: FallbackReason::NoSignal }
        );
    }

    #[test]
    fn test_exit_only_with_open_position() {
        let c = classifier(StrategyConfig::default().with_thresholds(2.0, 0.5));
        let calm = snapshot(100.5, 100.0, 2.0, false);

        assert_eq!(c.classify(Some(&calm), 12), Regime::Exit);
        assert_eq!(c.classify(Some(&calm), -3), Regime::Exit);
        assert_eq!(
            c.classify(Some(&calm), 0),
            Regime::MarketMaking { reason: FallbackReason::NoSignal }
        );
    }

    #[test]
    fn test_between_thresholds_falls_back() {
        let c = classifier(StrategyConfig::default().with_thresholds(2.0, 0.5));
        let drift = snapshot(102.0, 100.0, 2.0, false);
        assert_eq!(
            c.classify(Some(&drift), 5),
            Regime::MarketMaking { reason: FallbackReason::NoSignal }
        );
    }

    #[test]
    fn test_distance_stop_only_against_position() {
        let c = classifier(
            StrategyConfig::default()
                .with_thresholds(3.0, 2.0)
                .with_stop_loss(StopLoss::Distance(dec!(10))),
        );
        let crash = snapshot(85.0, 100.0, 4.0, false);

        assert_eq!(
            c.classify(Some(&crash), 20),
            Regime::StopLoss { trigger: StopTrigger::Distance }
        );
        // a short profits from the same move, so it is an entry signal instead
        assert_eq!(c.classify(Some(&crash), -20), Regime::Entry { side: Side::Buy });
        // nothing to stop when flat
        assert_eq!(c.classify(Some(&crash), 0), Regime::Entry { side: Side::Buy });
    }

    #[test]
    fn test_z_stop_takes_priority_over_entry() {
        let c = classifier(
            StrategyConfig::default()
                .with_thresholds(2.0, 0.7)
                .with_stop_loss(StopLoss::ZScore(3.5)),
        );
        let surge = snapshot(108.0, 100.0, 2.0, false);

        assert_eq!(
            c.classify(Some(&surge), -15),
            Regime::StopLoss { trigger: StopTrigger::ZScore }
        );
        assert_eq!(c.classify(Some(&surge), 15), Regime::Entry { side: Side::Sell });

        // adverse but inside the stop threshold
        let mild = snapshot(106.0, 100.0, 2.0, false);
        assert_eq!(c.classify(Some(&mild), -15), Regime::Entry { side: Side::Sell });
    }

    #[test]
    fn test_spike_gate_required() {
        let c = classifier(
            StrategyConfig::default()
                .with_thresholds(2.0, 0.5)
                .with_spike_gate(SpikeGate::Required, 20, 1.25),
        );
        let quiet = snapshot(106.0, 100.0, 2.0, false);
        let spiking = snapshot(106.0, 100.0, 2.0, true);

        assert_eq!(
            c.classify(Some(&quiet), 10),
            Regime::MarketMaking { reason: FallbackReason::NoSignal }
        );
        assert_eq!(c.classify(Some(&spiking), 10), Regime::Entry { side: Side::Sell });
    }

    #[test]
    fn test_spike_gate_relaxed_for_reversal() {
        let c = classifier(
            StrategyConfig::default()
                .with_thresholds(2.0, 0.5)
                .with_spike_gate(SpikeGate::RequiredUnlessReversal, 20, 1.25),
        );
        let quiet_surge = snapshot(106.0, 100.0, 2.0, false);

        // long book, sell signal: reversal goes through without a spike
        assert_eq!(c.classify(Some(&quiet_surge), 10), Regime::Entry { side: Side::Sell });
        // flat or already short: still needs a spike
        assert!(c.classify(Some(&quiet_surge), 0).is_market_making());
        assert!(c.classify(Some(&quiet_surge), -10).is_market_making());
    }
}
