//! Price Window
//!
//! Bounded, append-only series of mid prices owned by one engine. The
//! capacity is the longest configured lookback so a single buffer serves
//! every rolling statistic.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct PriceWindow {
    prices: VecDeque<f64>,
    capacity: usize,
    /// Total observations ever appended, including truncated ones
    observations: u64,
}

impl PriceWindow {
    /// Create an empty window keeping at most `capacity` observations
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            prices: VecDeque::with_capacity(capacity + 1),
            capacity,
            observations: 0,
        }
    }

    /// Push one observation, dropping the oldest beyond capacity
    pub fn append(&mut self, mid_price: f64) {
        self.prices.push_back(mid_price);
        self.observations += 1;
        while self.prices.len() > self.capacity {
            self.prices.pop_front();
        }
    }

    /// At least `w` observations are retained
    pub fn ready(&self, w: usize) -> bool {
        self.prices.len() >= w
    }

    /// The last `w` observations, oldest first (fewer if not enough retained)
    pub fn recent(&self, w: usize) -> impl Iterator<Item = &f64> + Clone + '_ {
        self.prices.iter().skip(self.prices.len().saturating_sub(w))
    }

    pub fn latest(&self) -> Option<f64> {
        self.prices.back().copied()
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    /// Retained prices, oldest first
    pub fn prices(&self) -> impl Iterator<Item = &f64> + '_ {
        self.prices.iter()
    }
}
