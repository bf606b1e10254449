use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an order or signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// `+1` for buys, `-1` for sells
    pub fn sign(self) -> i64 {
        match self {
            Side::Buy => 1,
            Side::Sell => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit order request. Positive quantity buys, negative quantity sells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub instrument: String,
    pub price: Decimal,
    pub quantity: i64,
}

impl Order {
    pub fn new(instrument: impl Into<String>, price: Decimal, quantity: i64) -> Self {
        Self {
            instrument: instrument.into(),
            price,
            quantity,
        }
    }

    /// Order on `side` for an unsigned size
    pub fn on_side(instrument: impl Into<String>, side: Side, price: Decimal, size: i64) -> Self {
        Self::new(instrument, price, side.sign() * size.saturating_abs())
    }

    pub fn side(&self) -> Side {
        if self.quantity >= 0 {
            Side::Buy
        } else {
            Side::Sell
        }
    }

    pub fn size(&self) -> i64 {
        self.quantity.saturating_abs()
    }

    pub fn is_buy(&self) -> bool {
        self.quantity > 0
    }

    pub fn is_sell(&self) -> bool {
        self.quantity < 0
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} @ {}", self.side(), self.size(), self.instrument, self.price)
    }
}
