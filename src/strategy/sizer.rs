//! Order Sizing
//!
//! size = min(floor(base_qty + scale_qty * |z|), remaining_capacity)

use crate::domain::Side;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSizer {
    base_qty: i64,
    scale_qty: f64,
}

impl OrderSizer {
    pub fn new(base_qty: i64, scale_qty: f64) -> Self {
        Self { base_qty, scale_qty }
    }

    /// Signal-scaled size clipped to `[0, capacity]`
    pub fn size(&self, z_score: f64, capacity: i64) -> i64 {
        if capacity <= 0 {
            return 0;
        }
        let raw = self.base_qty as f64 + self.scale_qty * z_score.abs();
        if !raw.is_finite() {
            return capacity;
        }
        // float-to-int casts saturate
        (raw.floor() as i64).clamp(0, capacity)
    }

    /// Room left to trade toward `side` before hitting `±max_position`
    pub fn entry_capacity(side: Side, position: i64, max_position: i64) -> i64 {
        let room = match side {
            Side::Buy => max_position.saturating_sub(position),
            Side::Sell => max_position.saturating_add(position),
        };
        room.max(0)
    }

    /// An exit can at most flatten the position
    pub fn exit_capacity(position: i64) -> i64 {
        position.saturating_abs()
    }
}
