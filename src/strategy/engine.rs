//! Strategy Engine
//!
//! Per-instrument composition of the window, statistics, classifier, sizer
//! and quote builder. One `evaluate` call per tick:
//!
//! 1. No two-sided book -> no orders
//! 2. Append the mid price to the window
//! 3. Compute signals once every lookback is filled
//! 4. Classify, size and quote

use rust_decimal::prelude::ToPrimitive;

use crate::domain::{Order, OrderBookSnapshot, Side, TopOfBook};
use crate::ports::QuotingStrategy;
use crate::strategy::params::{ConfigError, StrategyConfig};
use crate::strategy::quotes::{Intent, QuoteBuilder};
use crate::strategy::regime::{FallbackReason, Regime, RegimeClassifier};
use crate::strategy::sizer::OrderSizer;
use crate::strategy::statistics::{SignalSnapshot, StatisticsEngine};
use crate::strategy::window::PriceWindow;

/// Outcome of one evaluation, with the decision trail
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub orders: Vec<Order>,
    /// `None` when the book was not two-sided and the tick was skipped
    pub regime: Option<Regime>,
    /// `None` during warm-up or when the tick was skipped
    pub signals: Option<SignalSnapshot>,
}

impl Evaluation {
    fn skipped() -> Self {
        Self {
            orders: Vec::new(),
            regime: None,
            signals: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StrategyEngine {
    instrument: String,
    config: StrategyConfig,
    window: PriceWindow,
    stats: StatisticsEngine,
    classifier: RegimeClassifier,
    sizer: OrderSizer,
    quotes: QuoteBuilder,
}

impl StrategyEngine {
    /// Build an engine, rejecting invalid configuration up front
    pub fn new(instrument: impl Into<String>, config: StrategyConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let instrument = instrument.into();
        Ok(Self {
            window: PriceWindow::new(config.max_window()),
            stats: StatisticsEngine::new(config.std_dev_convention),
            classifier: RegimeClassifier::new(&config),
            sizer: OrderSizer::new(config.base_qty, config.scale_qty),
            quotes: QuoteBuilder::new(instrument.clone(), &config),
            instrument,
            config,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    pub fn window(&self) -> &PriceWindow {
        &self.window
    }

    /// Orders for this tick
    pub fn evaluate(&mut self, book: &OrderBookSnapshot, position: i64) -> Vec<Order> {
        self.evaluate_detailed(book, position).orders
    }

    /// Orders for this tick plus the regime and signals behind them
    pub fn evaluate_detailed(&mut self, book: &OrderBookSnapshot, position: i64) -> Evaluation {
        let Some(top) = book.top_of_book(self.config.mid_price_rounding) else {
            tracing::debug!("{}: book not two-sided, skipping tick", self.instrument);
            return Evaluation::skipped();
        };
        let Some(mid) = top.mid.to_f64() else {
            tracing::warn!("{}: mid price {} not representable, skipping tick", self.instrument, top.mid);
            return Evaluation::skipped();
        };

        self.window.append(mid);

        let signals = self.stats.signals(&self.window, &self.config);
        let regime = self.classifier.classify(signals.as_ref(), position);
        let z_score = signals.map(|s| s.z_score).unwrap_or(0.0);

        let (regime, orders) = match self.render(regime, &top, position, z_score) {
            Some(orders) => (regime, orders),
            None => {
                let fallback = Regime::MarketMaking { reason: FallbackReason::ZeroSize };
                (fallback, self.quotes.passive(&top, position))
            }
        };

        match regime {
            Regime::StopLoss { .. } | Regime::Entry { .. } => tracing::info!(
                "{}: {} | mid {} | z {:.2} | position {} | orders {:?}",
                self.instrument, regime, top.mid, z_score, position, orders
            ),
            _ => tracing::debug!(
                "{}: {} | mid {} | spread {} | z {:.2} | position {}",
                self.instrument, regime, top.mid, top.spread(), z_score, position
            ),
        }

        Evaluation {
            orders,
            regime: Some(regime),
            signals,
        }
    }

    /// Orders for `regime`, or `None` when an entry/exit sizes to zero
    fn render(&self, regime: Regime, top: &TopOfBook, position: i64, z_score: f64) -> Option<Vec<Order>> {
        match regime {
            Regime::StopLoss { .. } => {
                let side = if position > 0 { Side::Sell } else { Side::Buy };
                let size = OrderSizer::exit_capacity(position);
                let order = self.quotes.aggressive(top, Intent::StopLoss, side, size);
                Some(vec![order])
            }
            Regime::Entry { side } => {
                let capacity = OrderSizer::entry_capacity(side, position, self.config.max_position);
                let size = self.sizer.size(z_score, capacity);
                (size > 0).then(|| vec![self.quotes.aggressive(top, Intent::Entry, side, size)])
            }
            Regime::Exit => {
                let side = if position > 0 { Side::Sell } else { Side::Buy };
                let size = self.sizer.size(z_score, OrderSizer::exit_capacity(position));
                (size > 0).then(|| vec![self.quotes.aggressive(top, Intent::Exit, side, size)])
            }
            Regime::MarketMaking { .. } => Some(self.quotes.passive(top, position)),
        }
    }
}

impl QuotingStrategy for StrategyEngine {
    fn evaluate(&mut self, book: &OrderBookSnapshot, position: i64) -> Vec<Order> {
        StrategyEngine::evaluate(self, book, position)
    }

    fn position_limit(&self) -> i64 {
        self.config.max_position
    }

    fn name(&self) -> &'static str {
        "zscore"
    }
}
