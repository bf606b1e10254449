//! Quote Construction
//!
//! Renders a regime into priced orders:
//! - passive two-sided quotes around an inventory-skewed mid
//! - aggressive single orders anchored at the best bid or ask

use rust_decimal::Decimal;

use crate::domain::{Order, Side, TopOfBook};
use crate::strategy::params::{AggressiveQuotes, QuoteAnchor, StrategyConfig};

/// What an aggressive order is for; selects its price anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Entry,
    Exit,
    StopLoss,
}

#[derive(Debug, Clone)]
pub struct QuoteBuilder {
    instrument: String,
    mm_spread: Decimal,
    skew_coefficient: Decimal,
    quote_qty: i64,
    max_position: i64,
    anchors: AggressiveQuotes,
}

impl QuoteBuilder {
    pub fn new(instrument: impl Into<String>, config: &StrategyConfig) -> Self {
        Self {
            instrument: instrument.into(),
            mm_spread: config.mm_spread,
            skew_coefficient: config.skew_coefficient,
            quote_qty: config.passive_qty(),
            max_position: config.max_position,
            anchors: config.quotes,
        }
    }

    /// Reference price for passive quotes: mid shifted by the inventory skew
    pub fn skewed_mid(&self, mid: Decimal, position: i64) -> Decimal {
        mid + self.skew_coefficient * Decimal::from(position)
    }

    /// Two-sided quote at `skewed_mid ± mm_spread`. A side with no remaining
    /// capacity is left out.
    pub fn passive(&self, top: &TopOfBook, position: i64) -> Vec<Order> {
        let reference = self.skewed_mid(top.mid, position);
        let bid_size = self.quote_qty.min(self.max_position.saturating_sub(position)).max(0);
        let ask_size = self.quote_qty.min(self.max_position.saturating_add(position)).max(0);

        let mut orders = Vec::with_capacity(2);
        if bid_size > 0 {
            orders.push(Order::new(&self.instrument, reference - self.mm_spread, bid_size));
        }
        if ask_size > 0 {
            orders.push(Order::new(&self.instrument, reference + self.mm_spread, -ask_size));
        }
        orders
    }

    /// Single order on `side` for `size`, priced at the anchor for `intent`
    pub fn aggressive(&self, top: &TopOfBook, intent: Intent, side: Side, size: i64) -> Order {
        let anchor = self.anchor(intent, side);
        Order::on_side(&self.instrument, side, anchor.price(top), size)
    }

    fn anchor(&self, intent: Intent, side: Side) -> &QuoteAnchor {
        match (intent, side) {
            (Intent::Entry, Side::Buy) => &self.anchors.entry_buy,
            (Intent::Entry, Side::Sell) => &self.anchors.entry_sell,
            (Intent::Exit, Side::Buy) => &self.anchors.exit_buy,
            (Intent::Exit, Side::Sell) => &self.anchors.exit_sell,
            (Intent::StopLoss, Side::Buy) => &self.anchors.stop_buy,
            (Intent::StopLoss, Side::Sell) => &self.anchors.stop_sell,
        }
    }
}
