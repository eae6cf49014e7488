//! Constants for the real-time equities feed.
//!
//! Contains per-provider base URLs, the WebSocket URL template, the
//! backoff schedule, and the handful of wire-protocol literals (firehose
//! token, control-frame opcodes) that more than one module needs.

/// SDK identity sent as the `Client-Information` header on every auth and
/// WebSocket-handshake request.
pub const SDK_ID: &str = concat!("intrinio-realtime-rs/", env!("CARGO_PKG_VERSION"));

/// Header value requesting the IEEE-754 float price wire format (v2). This
/// crate only ever speaks v2 — see spec Design Notes on the legacy v1
/// fixed-point format.
pub const EQUITIES_FORMAT_HEADER_VALUE: &str = "v2";

// ---------------------------------------------------------------------------
// Auth URLs (one per provider)
// ---------------------------------------------------------------------------

/// Auth endpoint for the realtime (IEX/MEMX) feed.
pub const AUTH_URL_REALTIME: &str = "https://realtime-mx.intrinio.com/auth";

/// Auth endpoint for the delayed SIP composite feed.
pub const AUTH_URL_DELAYED_SIP: &str = "https://realtime-delayed-sip.intrinio.com/auth";

/// Auth endpoint for the NASDAQ Basic feed.
pub const AUTH_URL_NASDAQ_BASIC: &str = "https://realtime-nasdaq-basic.intrinio.com/auth";

/// Auth endpoint for the CBOE One feed.
pub const AUTH_URL_CBOE_ONE: &str = "https://realtime-cboe-one.intrinio.com/auth";

// ---------------------------------------------------------------------------
// Replay (HTTP) endpoints
// ---------------------------------------------------------------------------

/// Base URL for the replay tick-file lookup API.
pub const REPLAY_API_BASE_URL: &str = "https://api-v2.intrinio.com";

// ---------------------------------------------------------------------------
// Wire-protocol literals
// ---------------------------------------------------------------------------

/// The reserved channel name meaning "all symbols" (firehose).
pub const LOBBY_CHANNEL: &str = "$lobby";

/// The wire token sent in control frames in place of [`LOBBY_CHANNEL`].
pub const FIREHOSE_WIRE_TOKEN: &str = "$FIREHOSE";

/// Maximum channel length retained from the legacy v1 protocol. Spec marks
/// this advisory only; enforced defensively, not because the v2 server is
/// known to reject longer channels.
pub const MAX_CHANNEL_LEN: usize = 20;

/// Client → server join opcode (`'J'`).
pub const OPCODE_JOIN: u8 = 0x4A;

/// Client → server leave opcode (`'L'`).
pub const OPCODE_LEAVE: u8 = 0x4C;

// ---------------------------------------------------------------------------
// Session lifecycle constants
// ---------------------------------------------------------------------------

/// Re-acquire a token if this long has elapsed since the last successful
/// connection at the time of a reconnect.
pub const TOKEN_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// Interval for the application-level empty-binary-frame heartbeat.
pub const HEARTBEAT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(20);

/// The backoff schedule used by [`crate::backoff::Backoff`], saturating at
/// the last entry.
pub const BACKOFF_SCHEDULE: &[std::time::Duration] = &[
    std::time::Duration::from_secs(10),
    std::time::Duration::from_secs(30),
    std::time::Duration::from_secs(60),
    std::time::Duration::from_secs(5 * 60),
    std::time::Duration::from_secs(10 * 60),
];

/// WebSocket close code reserved for user-initiated termination.
pub const CLOSE_CODE_NORMAL: u16 = 1000;
