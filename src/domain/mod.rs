//! Domain Layer - Market data and order types
//!
//! Pure value types with no knowledge of strategies or configuration:
//! - `order_book`: per-instrument bid/ask snapshot and top of book
//! - `order`: signed limit order requests
//! - `tick`: one tick's books and positions across instruments

pub mod order;
pub mod order_book;
pub mod tick;

pub use order::{Order, Side};
pub use order_book::{BookSide, MidPriceRounding, OrderBookSnapshot, TopOfBook};
pub use tick::MarketTick;
