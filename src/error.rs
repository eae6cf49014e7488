//! Error types for the `intrinio-realtime-rs` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, Error>`.
//!
//! [`Error`] covers:
//! - **Config errors** — invalid construction-time arguments
//! - **Auth failures** — a hard 401 from the token endpoint
//! - **HTTP transport errors** — network, TLS, timeout failures
//! - **WebSocket errors** — connection and protocol errors
//! - **Decode errors** — malformed binary frames
//! - **JSON errors** — replay manifest deserialization failures

/// All possible errors produced by the `intrinio-realtime-rs` client.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The caller provided invalid construction-time configuration (missing
    /// access key, `Provider::Manual` without an IP address, etc.).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The auth endpoint returned `401 Unauthorized`. Treated as fatal —
    /// the access key itself is rejected, not a transient condition.
    #[error("authentication rejected: {0}")]
    AuthFailed(String),

    /// A network or transport-level error, surfaced from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server returned an unexpected (non-401) HTTP status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A WebSocket-level error (handshake failure, protocol violation).
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A malformed binary frame: length mismatch, short buffer, or a read
    /// whose range exceeded the buffer. Never surfaced to user callbacks —
    /// the offending sub-message is logged and skipped.
    #[error("decode error: {0}")]
    Decode(String),

    /// Failed to deserialize a JSON response body (replay file manifest).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error building or parsing a URL.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// An I/O error reading or writing a tick file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
