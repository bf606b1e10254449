use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::order_book::OrderBookSnapshot;

/// Everything the engine sees at one tick: a book per instrument and the
/// externally owned signed positions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketTick {
    /// Tick sequence number from the feeding harness
    #[serde(default)]
    pub tick: u64,
    #[serde(default)]
    pub books: BTreeMap<String, OrderBookSnapshot>,
    #[serde(default)]
    pub positions: BTreeMap<String, i64>,
}

impl MarketTick {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Default::default()
        }
    }

    pub fn with_book(mut self, instrument: impl Into<String>, book: OrderBookSnapshot) -> Self {
        self.books.insert(instrument.into(), book);
        self
    }

    pub fn with_position(mut self, instrument: impl Into<String>, position: i64) -> Self {
        self.positions.insert(instrument.into(), position);
        self
    }

    /// Signed position for `instrument`; flat when the harness reports none
    pub fn position(&self, instrument: &str) -> i64 {
        self.positions.get(instrument).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_position_is_flat() {
        let tick = MarketTick::new(3).with_position("PRODUCT", -12);
        assert_eq!(tick.position("PRODUCT"), -12);
        assert_eq!(tick.position("OTHER"), 0);
    }

    #[test]
    fn test_deserialize_json_line() {
        let line = r#"{"tick": 7, "books": {"PRODUCT": {"bids": {"99": 5}, "asks": {"101": 5}}}, "positions": {"PRODUCT": 4}}"#;
        let tick: MarketTick = serde_json::from_str(line).unwrap();
        assert_eq!(tick.tick, 7);
        assert_eq!(tick.position("PRODUCT"), 4);
        assert_eq!(tick.books["PRODUCT"].best_bid(), Some(dec!(99)));
    }
}
