//! Ports Layer - Trait definitions at the strategy seam
//!
//! The dispatcher only knows strategies through [`QuotingStrategy`], so the
//! z-score engine and the fixed fair-value quoter are interchangeable.

pub mod strategy;

pub use strategy::QuotingStrategy;

#[cfg(test)]
pub use strategy::MockQuotingStrategy;
