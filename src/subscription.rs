//! The subscription registry: the single source of truth for desired
//! channels, reconciled against the server on every (re)connect.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::types::record::{Channel, ChannelError, SubscriptionEntry};

/// Tracks the desired set of channels and their per-channel trades-only
/// flag. `add`/`remove` are idempotent; `snapshot` enumerates in insertion
/// order for deterministic reconnect replay.
#[derive(Debug, Default)]
pub struct Registry {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    order: Vec<Channel>,
    trades_only: HashMap<Channel, bool>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a channel. Idempotent — the *first* call's `trades_only` flag
    /// wins; later calls for the same channel are no-ops on that flag.
    /// Logs a warning if added after `$lobby` is already present (the
    /// firehose subsumes everything else; spec chooses to warn, not prune).
    pub fn add(&self, raw: &str, trades_only: bool) -> Result<(), ChannelError> {
        let channel = Channel::new(raw)?;
        let mut inner = self.inner.lock().unwrap();

        if inner.trades_only.contains_key(&channel) {
            return Ok(());
        }

        if !channel.is_lobby() && inner.order.iter().any(Channel::is_lobby) {
            tracing::warn!(channel = %channel, "joining channel while $lobby is present is redundant");
        }

        inner.order.push(channel.clone());
        inner.trades_only.insert(channel, trades_only);
        Ok(())
    }

    /// Remove a channel. Idempotent.
    pub fn remove(&self, raw: &str) {
        let Ok(channel) = Channel::new(raw) else {
            return;
        };
        let mut inner = self.inner.lock().unwrap();
        inner.trades_only.remove(&channel);
        inner.order.retain(|c| c != &channel);
    }

    /// Remove every channel.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.order.clear();
        inner.trades_only.clear();
    }

    /// A stable enumeration (insertion order) for replaying on reconnect.
    pub fn snapshot(&self) -> Vec<SubscriptionEntry> {
        let inner = self.inner.lock().unwrap();
        inner
            .order
            .iter()
            .map(|channel| SubscriptionEntry {
                channel: channel.clone(),
                trades_only: inner.trades_only[channel],
            })
            .collect()
    }

    /// True if the registry contains `$lobby` or the exact symbol. Used
    /// only by replay mode to gate callbacks — live mode delegates
    /// filtering to the server.
    pub fn matches(&self, symbol: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.order.iter().any(|c| c.is_lobby() || c.as_str() == symbol)
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().order.is_empty()
    }
}
