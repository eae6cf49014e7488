//! Shared data types for the real-time equities feed.
//!
//! - [`enums`] — [`Provider`](enums::Provider) and [`SubProvider`](enums::SubProvider).
//! - [`record`] — [`Trade`](record::Trade), [`Quote`](record::Quote), [`Channel`](record::Channel).

pub mod enums;
pub mod record;

pub use enums::{Provider, SubProvider};
pub use record::{Channel, Quote, QuoteKind, Record, SubscriptionEntry, Trade};
