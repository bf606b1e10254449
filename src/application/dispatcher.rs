//! Tick Dispatcher
//!
//! Owns one strategy per instrument and routes each tick's books and
//! positions to them. Every strategy is held exclusively, so a `&mut`
//! borrow is all the synchronization an evaluation needs.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{MarketTick, Order};
use crate::ports::QuotingStrategy;
use crate::strategy::ConfigError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("Instrument already registered: {0}")]
    DuplicateInstrument(String),
    #[error("Failed to build strategy for {instrument}: {source}")]
    InvalidStrategy {
        instrument: String,
        #[source]
        source: ConfigError,
    },
}

/// Orders produced for one tick
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickOrders {
    pub tick: u64,
    /// Only instruments that produced orders appear here
    pub orders: BTreeMap<String, Vec<Order>>,
    /// Set only when exactly one instrument is registered
    pub position_limit: Option<i64>,
}

impl TickOrders {
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.orders.values().map(Vec::len).sum()
    }
}

#[derive(Default)]
pub struct Dispatcher {
    strategies: BTreeMap<String, Box<dyn QuotingStrategy>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one strategy per `[instruments.<NAME>]` table
    pub fn from_config(config: &Config) -> Result<Self, DispatchError> {
        let mut dispatcher = Self::new();
        for (instrument, instrument_config) in &config.instruments {
            let strategy = instrument_config.build(instrument).map_err(|source| {
                DispatchError::InvalidStrategy {
                    instrument: instrument.clone(),
                    source,
                }
            })?;
            dispatcher.register(instrument.clone(), strategy)?;
        }
        info!(
            "Dispatcher ready with {} instrument(s)",
            dispatcher.strategies.len()
        );
        Ok(dispatcher)
    }

    pub fn register(
        &mut self,
        instrument: impl Into<String>,
        strategy: Box<dyn QuotingStrategy>,
    ) -> Result<(), DispatchError> {
        let instrument = instrument.into();
        if self.strategies.contains_key(&instrument) {
            return Err(DispatchError::DuplicateInstrument(instrument));
        }
        debug!("Registered {} strategy for {}", strategy.name(), instrument);
        self.strategies.insert(instrument, strategy);
        Ok(())
    }

    pub fn instruments(&self) -> impl Iterator<Item = &str> + '_ {
        self.strategies.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// The single engine's `max_position`; `None` unless exactly one is registered
    pub fn position_limit(&self) -> Option<i64> {
        if self.strategies.len() != 1 {
            return None;
        }
        self.strategies.values().next().map(|s| s.position_limit())
    }

    /// Evaluate every instrument with a book in `tick`, one after another
    pub fn on_tick(&mut self, tick: &MarketTick) -> TickOrders {
        self.warn_unknown(tick);
        let mut orders = BTreeMap::new();
        for (instrument, strategy) in self.strategies.iter_mut() {
            let Some(book) = tick.books.get(instrument) else {
                continue;
            };
            let emitted = strategy.evaluate(book, tick.position(instrument));
            if !emitted.is_empty() {
                orders.insert(instrument.clone(), emitted);
            }
        }
        self.finish(tick, orders)
    }

    /// Same as [`Dispatcher::on_tick`] but evaluates instruments on scoped threads
    pub fn on_tick_parallel(&mut self, tick: &MarketTick) -> TickOrders {
        self.warn_unknown(tick);
        let orders = std::thread::scope(|scope| {
            let handles: Vec<_> = self
                .strategies
                .iter_mut()
                .filter_map(|(instrument, strategy)| {
                    let book = tick.books.get(instrument)?;
                    let position = tick.position(instrument);
                    Some(scope.spawn(move || (instrument.clone(), strategy.evaluate(book, position))))
                })
                .collect();

            let mut orders = BTreeMap::new();
            for handle in handles {
                match handle.join() {
                    Ok((instrument, emitted)) => {
                        if !emitted.is_empty() {
                            orders.insert(instrument, emitted);
                        }
                    }
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            orders
        });
        self.finish(tick, orders)
    }

    fn finish(&self, tick: &MarketTick, orders: BTreeMap<String, Vec<Order>>) -> TickOrders {
        let result = TickOrders {
            tick: tick.tick,
            orders,
            position_limit: self.position_limit(),
        };
        debug!(
            "Tick {}: {} order(s) across {} instrument(s)",
            result.tick,
            result.order_count(),
            result.orders.len()
        );
        result
    }

    fn warn_unknown(&self, tick: &MarketTick) {
        for instrument in tick.books.keys() {
            if !self.strategies.contains_key(instrument) {
                warn!("Tick {}: no strategy for {}, skipping", tick.tick, instrument);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::domain::OrderBookSnapshot;
    use crate::ports::MockQuotingStrategy;
    use mockall::predicate::eq;
    use rust_decimal_macros::dec;

    fn book() -> OrderBookSnapshot {
        OrderBookSnapshot::new()
            .with_bid(dec!(99), 10)
            .with_ask(dec!(101), 10)
    }

    fn mock_quoting(instrument: &'static str, position: i64, limit: i64) -> MockQuotingStrategy {
        let mut mock = MockQuotingStrategy::new();
        mock.expect_evaluate()
            .withf(move |_, pos| *pos == position)
            .returning(move |_, _| vec![Order::new(instrument, dec!(100), 1)]);
        mock.expect_position_limit().return_const(limit);
        mock.expect_name().return_const("mock");
        mock
    }

    #[test]
    fn test_routes_books_and_positions() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register("A", Box::new(mock_quoting("A", 5, 20)))
            .unwrap();
        dispatcher
            .register("B", Box::new(mock_quoting("B", 0, 30)))
            .unwrap();

        let tick = MarketTick::new(1)
            .with_book("A", book())
            .with_book("B", book())
            .with_position("A", 5);
        let result = dispatcher.on_tick(&tick);

        assert_eq!(result.tick, 1);
        assert_eq!(result.orders.len(), 2);
        assert_eq!(result.orders["A"][0].instrument, "A");
        assert_eq!(result.position_limit, None);
    }

    #[test]
    fn test_instrument_without_book_not_evaluated() {
        let mut idle = MockQuotingStrategy::new();
        idle.expect_evaluate().never();
        idle.expect_position_limit().return_const(10i64);
        idle.expect_name().return_const("mock");

        let mut dispatcher = Dispatcher::new();
        dispatcher.register("IDLE", Box::new(idle)).unwrap();

        let result = dispatcher.on_tick(&MarketTick::new(3));
        assert!(result.is_empty());
        assert_eq!(result.position_limit, Some(10));
    }

    #[test]
    fn test_unknown_instrument_skipped() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register("A", Box::new(mock_quoting("A", 0, 20)))
            .unwrap();

        let tick = MarketTick::new(1)
            .with_book("A", book())
            .with_book("GHOST", book());
        let result = dispatcher.on_tick(&tick);

        assert_eq!(result.orders.keys().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_empty_output_omitted() {
        let mut quiet = MockQuotingStrategy::new();
        quiet
            .expect_evaluate()
            .with(eq(book()), eq(0))
            .times(1)
            .returning(|_, _| Vec::new());
        quiet.expect_position_limit().return_const(10i64);
        quiet.expect_name().return_const("mock");

        let mut dispatcher = Dispatcher::new();
        dispatcher.register("Q", Box::new(quiet)).unwrap();

        let result = dispatcher.on_tick(&MarketTick::new(1).with_book("Q", book()));
        assert!(result.is_empty());
        assert_eq!(result.order_count(), 0);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .register("A", Box::new(mock_quoting("A", 0, 20)))
            .unwrap();
        let result = dispatcher.register("A", Box::new(mock_quoting("A", 0, 20)));
        assert!(matches!(result, Err(DispatchError::DuplicateInstrument(name)) if name == "A"));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let config = parse_config(
            r#"
[instruments.PRODUCT]
kind = "zscore"
lookback = 5

[instruments.PEARLS]
kind = "fixed_fair_value"
fair_value = 100
max_position = 20
"#,
        )
        .unwrap();
        let mut sequential = Dispatcher::from_config(&config).unwrap();
        let mut parallel = Dispatcher::from_config(&config).unwrap();

        for (i, mid) in [100, 101, 99, 100, 102, 98, 120].into_iter().enumerate() {
            let bid = rust_decimal::Decimal::from(mid - 1);
            let ask = rust_decimal::Decimal::from(mid + 1);
            let book = OrderBookSnapshot::new().with_bid(bid, 5).with_ask(ask, 5);
            let tick = MarketTick::new(i as u64)
                .with_book("PRODUCT", book.clone())
                .with_book("PEARLS", book);
            assert_eq!(sequential.on_tick(&tick), parallel.on_tick_parallel(&tick));
        }
    }

    #[test]
    fn test_from_config_position_limit() {
        let config = parse_config(
            r#"
[instruments.PRODUCT]
kind = "zscore"
max_position = 45
"#,
        )
        .unwrap();
        let dispatcher = Dispatcher::from_config(&config).unwrap();
        assert_eq!(dispatcher.instruments().collect::<Vec<_>>(), vec!["PRODUCT"]);
        assert_eq!(dispatcher.position_limit(), Some(45));
    }
}
