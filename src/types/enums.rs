//! Provider and sub-provider enums.

use serde::{Deserialize, Serialize};

use crate::constants::{AUTH_URL_CBOE_ONE, AUTH_URL_DELAYED_SIP, AUTH_URL_NASDAQ_BASIC, AUTH_URL_REALTIME};

/// Selects the auth URL, WebSocket URL, and (historically) message shape.
///
/// `Manual` substitutes a caller-supplied host and uses unencrypted
/// HTTP/WS — an escape hatch for pointing at a sandbox or local test host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Realtime (IEX/MEMX) feed. Default.
    Realtime,
    /// Delayed SIP composite feed.
    DelayedSip,
    /// NASDAQ Basic feed.
    NasdaqBasic,
    /// CBOE One feed.
    CboeOne,
    /// A manually specified host, reached over plaintext HTTP/WS.
    Manual {
        /// Host (and optional port) to connect to, e.g. `"localhost:8080"`.
        host: String,
    },
}

impl Default for Provider {
    fn default() -> Self {
        Self::Realtime
    }
}

impl Provider {
    /// The HTTPS (or, for `Manual`, HTTP) URL used to acquire a session token.
    pub fn auth_url(&self) -> String {
        match self {
            Self::Realtime => AUTH_URL_REALTIME.to_owned(),
            Self::DelayedSip => AUTH_URL_DELAYED_SIP.to_owned(),
            Self::NasdaqBasic => AUTH_URL_NASDAQ_BASIC.to_owned(),
            Self::CboeOne => AUTH_URL_CBOE_ONE.to_owned(),
            Self::Manual { host } => format!("http://{host}/auth"),
        }
    }

    /// The WebSocket scheme + host used to build the session URL
    /// (`wss://...` for every provider except `Manual`, which is plaintext).
    pub fn ws_host(&self) -> (&'static str, String) {
        match self {
            Self::Manual { host } => ("ws", host.clone()),
            other => ("wss", other.wss_host_name().to_owned()),
        }
    }

    fn wss_host_name(&self) -> &'static str {
        match self {
            Self::Realtime => "realtime-mx.intrinio.com",
            Self::DelayedSip => "realtime-delayed-sip.intrinio.com",
            Self::NasdaqBasic => "realtime-nasdaq-basic.intrinio.com",
            Self::CboeOne => "realtime-cboe-one.intrinio.com",
            Self::Manual { .. } => unreachable!("ws_host handles Manual directly"),
        }
    }
}

// ---------------------------------------------------------------------------
// SubProvider
// ---------------------------------------------------------------------------

/// The origin within a grouped provider, carried per message. Unknown wire
/// values map to [`SubProvider::None`] rather than erroring — the decode
/// path must never fail on an unrecognized sub-provider byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubProvider {
    None,
    CtaA,
    CtaB,
    Utp,
    Otc,
    NasdaqBasic,
    Iex,
    CboeOne,
}

impl SubProvider {
    /// Map a wire byte to a [`SubProvider`], defaulting unknown values to
    /// [`SubProvider::None`].
    pub fn from_byte(b: u8) -> Self {
        match b {
            1 => Self::CtaA,
            2 => Self::CtaB,
            3 => Self::Utp,
            4 => Self::Otc,
            5 => Self::NasdaqBasic,
            6 => Self::Iex,
            7 => Self::CboeOne,
            _ => Self::None,
        }
    }
}
