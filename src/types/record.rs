//! Trade/quote records and the channel/subscription types that gate them.

use serde::{Deserialize, Serialize};

use crate::constants::{LOBBY_CHANNEL, MAX_CHANNEL_LEN};
use crate::types::enums::SubProvider;

/// A symbol name (1–20 ASCII characters) or the reserved value `$lobby`
/// meaning "all symbols" (requires entitlement).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Channel(String);

/// An error constructing a [`Channel`] from a raw string.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChannelError {
    /// The channel string was empty.
    #[error("channel must not be empty")]
    Empty,
    /// The channel string exceeded the legacy 20-character limit.
    #[error("channel {0:?} exceeds {MAX_CHANNEL_LEN} characters")]
    TooLong(String),
}

impl Channel {
    /// The reserved firehose channel, `$lobby`.
    pub fn lobby() -> Self {
        Self(LOBBY_CHANNEL.to_owned())
    }

    /// Construct a channel from a raw symbol string, validating length.
    /// `$lobby` is exempt from the length check (it's shorter than the
    /// limit anyway, but this keeps the check symbol-focused).
    pub fn new(raw: impl Into<String>) -> Result<Self, ChannelError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ChannelError::Empty);
        }
        if raw != LOBBY_CHANNEL && raw.len() > MAX_CHANNEL_LEN {
            return Err(ChannelError::TooLong(raw));
        }
        Ok(Self(raw))
    }

    /// Whether this channel is the firehose.
    pub fn is_lobby(&self) -> bool {
        self.0 == LOBBY_CHANNEL
    }

    /// The raw channel string as sent in logs and registry keys.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `(channel, tradesOnly)` as stored in the subscription registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionEntry {
    /// The subscribed channel.
    pub channel: Channel,
    /// Whether the server should omit bid/ask updates for this channel.
    pub trades_only: bool,
}

/// Kind of quote: best bid or best ask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuoteKind {
    Ask,
    Bid,
}

impl std::fmt::Display for QuoteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ask => f.write_str("Ask"),
            Self::Bid => f.write_str("Bid"),
        }
    }
}

/// A single executed trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub symbol: String,
    /// Rounded to 4 fractional digits; negative wire values clamp to 0.
    pub price: f64,
    pub size: u32,
    /// Nanoseconds since the Unix epoch.
    pub timestamp: u64,
    pub total_volume: u32,
    pub sub_provider: SubProvider,
    /// A single UTF-16BE code unit identifying the market center.
    pub market_center: String,
    pub condition: String,
}

/// A bid or ask quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub kind: QuoteKind,
    pub symbol: String,
    pub price: f64,
    pub size: u32,
    pub timestamp: u64,
    pub sub_provider: SubProvider,
    pub market_center: String,
    pub condition: String,
}

/// Either a [`Trade`] or a [`Quote`] — the unit the frame codec dispatches
/// per sub-message, before the session controller routes it to the
/// matching user callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Trade(Trade),
    Quote(Quote),
}

impl Record {
    /// The symbol this record concerns, used by replay's `matches()` gate.
    pub fn symbol(&self) -> &str {
        match self {
            Self::Trade(t) => &t.symbol,
            Self::Quote(q) => &q.symbol,
        }
    }

    /// Whether this record is a quote (used by trades-only filtering).
    pub fn is_quote(&self) -> bool {
        matches!(self, Self::Quote(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lobby_channel_is_exempt_from_length_check() {
        assert!(Channel::lobby().is_lobby());
    }

    #[test]
    fn rejects_empty_channel() {
        assert_eq!(Channel::new("").unwrap_err(), ChannelError::Empty);
    }

    #[test]
    fn rejects_overlong_channel() {
        let long = "A".repeat(21);
        assert!(matches!(Channel::new(long), Err(ChannelError::TooLong(_))));
    }

    #[test]
    fn accepts_normal_symbol() {
        let c = Channel::new("AAPL").unwrap();
        assert_eq!(c.as_str(), "AAPL");
        assert!(!c.is_lobby());
    }
}
