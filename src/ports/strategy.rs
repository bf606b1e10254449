use crate::domain::{Order, OrderBookSnapshot};

/// A per-instrument strategy driven once per tick.
///
/// Implementations own their state; the dispatcher holds each one
/// exclusively, so at most one evaluation runs against it at a time.
#[cfg_attr(test, mockall::automock)]
pub trait QuotingStrategy: Send {
    /// Orders for this tick given the book and the current signed position.
    /// An empty list means "do nothing".
    fn evaluate(&mut self, book: &OrderBookSnapshot, position: i64) -> Vec<Order>;

    /// Largest absolute position the strategy will ever request
    fn position_limit(&self) -> i64;

    /// Short label for logs
    fn name(&self) -> &'static str;
}
