//! Fixed Fair-Value Quoting
//!
//! For instruments pinned to a known value: always quote `fair ± edge`,
//! ignoring the book except to require that it is not entirely empty.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderBookSnapshot};
use crate::ports::QuotingStrategy;
use crate::strategy::params::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixedFairValueConfig {
    pub fair_value: Decimal,
    #[serde(default = "default_edge")]
    pub edge: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub max_position: i64,
}

fn default_edge() -> Decimal {
    dec!(2)
}

fn default_quantity() -> i64 {
    10
}

impl FixedFairValueConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fair_value <= Decimal::ZERO {
            return Err(ConfigError::InvalidFairValue(self.fair_value));
        }
        if self.edge.is_sign_negative() {
            return Err(ConfigError::InvalidSpread(self.edge));
        }
        if self.quantity < 0 {
            return Err(ConfigError::InvalidQuantity(self.quantity));
        }
        if self.max_position < 0 {
            return Err(ConfigError::InvalidMaxPosition(self.max_position));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FixedFairValueStrategy {
    instrument: String,
    config: FixedFairValueConfig,
}

impl FixedFairValueStrategy {
    pub fn new(instrument: impl Into<String>, config: FixedFairValueConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            instrument: instrument.into(),
            config,
        })
    }
}

impl QuotingStrategy for FixedFairValueStrategy {
    fn evaluate(&mut self, book: &OrderBookSnapshot, position: i64) -> Vec<Order> {
        if book.is_empty() {
            return Vec::new();
        }
        let cfg = &self.config;
        let bid_size = cfg.quantity.min(cfg.max_position.saturating_sub(position)).max(0);
        let ask_size = cfg.quantity.min(cfg.max_position.saturating_add(position)).max(0);

        let mut orders = Vec::with_capacity(2);
        if ask_size > 0 {
            orders.push(Order::new(&self.instrument, cfg.fair_value + cfg.edge, -ask_size));
        }
        if bid_size > 0 {
            orders.push(Order::new(&self.instrument, cfg.fair_value - cfg.edge, bid_size));
        }
        orders
    }

    fn position_limit(&self) -> i64 {
        self.config.max_position
    }

    fn name(&self) -> &'static str {
        "fixed_fair_value"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> FixedFairValueStrategy {
        FixedFairValueStrategy::new(
            "PRODUCT",
            FixedFairValueConfig {
                fair_value: dec!(4300),
                edge: dec!(2),
                quantity: 10,
                max_position: 250,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_quotes_around_fair_value() {
        let book = OrderBookSnapshot::new().with_bid(dec!(4295), 3);
        let orders = strategy().evaluate(&book, 0);
        assert_eq!(
            orders,
            vec![
                Order::new("PRODUCT", dec!(4302), -10),
                Order::new("PRODUCT", dec!(4298), 10),
            ]
        );
    }

    #[test]
    fn test_empty_book_quotes_nothing() {
        assert!(strategy().evaluate(&OrderBookSnapshot::new(), 0).is_empty());
    }

    #[test]
    fn test_respects_position_limit() {
        let book = OrderBookSnapshot::new().with_ask(dec!(4305), 3);
        let mut strategy = strategy();

        let near_long_limit = strategy.evaluate(&book, 246);
        assert_eq!(near_long_limit[1].quantity, 4);

        let at_short_limit = strategy.evaluate(&book, -250);
        assert_eq!(at_short_limit.len(), 1);
        assert!(at_short_limit[0].is_buy());
        assert_eq!(strategy.position_limit(), 250);
    }

    #[test]
    fn test_extreme_positions_quote_one_side() {
        let book = OrderBookSnapshot::new().with_bid(dec!(4295), 3);
        let mut strategy = strategy();

        assert_eq!(
            strategy.evaluate(&book, i64::MIN),
            vec![Order::new("PRODUCT", dec!(4298), 10)]
        );
        assert_eq!(
            strategy.evaluate(&book, i64::MAX),
            vec![Order::new("PRODUCT", dec!(4302), -10)]
        );
    }

    #[test]
    fn test_rejects_non_positive_fair_value() {
        let result = FixedFairValueStrategy::new(
            "PRODUCT",
            FixedFairValueConfig {
                fair_value: Decimal::ZERO,
                edge: dec!(2),
                quantity: 10,
                max_position: 250,
            },
        );
        assert!(matches!(result, Err(ConfigError::InvalidFairValue(_))));
    }
}
