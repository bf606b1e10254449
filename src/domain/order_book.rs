//! Order Book Snapshot
//!
//! One instrument's resting liquidity at one tick: bid price -> quantity and
//! ask price -> quantity. Either side (or both) may be empty.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the mid price is derived from the best bid and best ask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidPriceRounding {
    /// `(best_bid + best_ask) / 2`, keeping the half tick
    #[default]
    Exact,
    /// `floor((best_bid + best_ask) / 2)`
    Floor,
}

/// Which side of the book a price is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSide {
    BestBid,
    BestAsk,
}

/// Best prices of a two-sided book plus the derived mid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopOfBook {
    pub best_bid: Decimal,
    pub best_ask: Decimal,
    pub mid: Decimal,
}

impl TopOfBook {
    /// Price on the requested side
    pub fn price(&self, side: BookSide) -> Decimal {
        match side {
            BookSide::BestBid => self.best_bid,
            BookSide::BestAsk => self.best_ask,
        }
    }

    pub fn spread(&self) -> Decimal {
        self.best_ask - self.best_bid
    }
}

/// Bid and ask price levels for one instrument at one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    #[serde(default)]
    pub bids: BTreeMap<Decimal, u64>,
    #[serde(default)]
    pub asks: BTreeMap<Decimal, u64>,
}

impl OrderBookSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from `(price, quantity)` levels
    pub fn from_levels(bids: &[(Decimal, u64)], asks: &[(Decimal, u64)]) -> Self {
        Self {
            bids: bids.iter().copied().collect(),
            asks: asks.iter().copied().collect(),
        }
    }

    /// Add (or replace) a bid level
    pub fn with_bid(mut self, price: Decimal, quantity: u64) -> Self {
        self.bids.insert(price, quantity);
        self
    }

    /// Add (or replace) an ask level
    pub fn with_ask(mut self, price: Decimal, quantity: u64) -> Self {
        self.asks.insert(price, quantity);
        self
    }

    /// Highest bid price
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.keys().next_back().copied()
    }

    /// Lowest ask price
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.keys().next().copied()
    }

    /// True when neither side has any level
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Best prices and mid, or `None` unless both sides are present
    pub fn top_of_book(&self, rounding: MidPriceRounding) -> Option<TopOfBook> {
        let best_bid = self.best_bid()?;
        let best_ask = self.best_ask()?;
        let half = (best_bid + best_ask) / Decimal::TWO;
        let mid = match rounding {
            MidPriceRounding::Exact => half,
            MidPriceRounding::Floor => half.floor(),
        };
        Some(TopOfBook { best_bid, best_ask, mid })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_best_prices() {
        let book = OrderBookSnapshot::new()
            .with_bid(dec!(98), 5)
            .with_bid(dec!(99), 3)
            .with_ask(dec!(102), 4)
            .with_ask(dec!(101), 1);

        assert_eq!(book.best_bid(), Some(dec!(99)));
        assert_eq!(book.best_ask(), Some(dec!(101)));
        assert!(book.top_of_book(MidPriceRounding::Exact).is_some());
    }

    #[test]
    fn test_mid_price_rounding() {
        let book = OrderBookSnapshot::from_levels(&[(dec!(100), 1)], &[(dec!(103), 1)]);

        let exact = book.top_of_book(MidPriceRounding::Exact).unwrap();
        assert_eq!(exact.mid, dec!(101.5));
        assert_eq!(exact.spread(), dec!(3));

        let floored = book.top_of_book(MidPriceRounding::Floor).unwrap();
        assert_eq!(floored.mid, dec!(101));
    }

    #[test]
    fn test_one_sided_book_has_no_top() {
        let bids_only = OrderBookSnapshot::new().with_bid(dec!(99), 10);
        assert!(!bids_only.is_empty());
        assert!(bids_only.top_of_book(MidPriceRounding::Exact).is_none());

        let asks_only = OrderBookSnapshot::new().with_ask(dec!(101), 10);
        assert!(asks_only.top_of_book(MidPriceRounding::Exact).is_none());

        assert!(OrderBookSnapshot::new().is_empty());
    }

    #[test]
    fn test_top_of_book_side_lookup() {
        let top = OrderBookSnapshot::from_levels(&[(dec!(99), 1)], &[(dec!(101), 1)])
            .top_of_book(MidPriceRounding::Exact)
            .unwrap();
        assert_eq!(top.price(BookSide::BestBid), dec!(99));
        assert_eq!(top.price(BookSide::BestAsk), dec!(101));
    }

    #[test]
    fn test_deserialize_from_json() {
        let json = r#"{"bids": {"99": 4, "98.5": 2}, "asks": {"101": 3}}"#;
        let book: OrderBookSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(book.best_bid(), Some(dec!(99)));
        assert_eq!(book.best_ask(), Some(dec!(101)));
        assert_eq!(book.bids.get(&dec!(98.5)), Some(&2));
    }
}
