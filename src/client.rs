//! The public entry point: constructs and starts a session (live or replay)
//! and exposes `join`/`leave`/`stop`/`total_msg_count`.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::auth::AuthClient;
use crate::error::Result;
use crate::replay;
use crate::session::config::Config;
use crate::session::controller::{Controller, QuoteCallback, State, TradeCallback};
use crate::subscription::Registry;
use crate::types::record::{Quote, Trade};

enum Inner {
    Live {
        controller: Arc<Controller>,
        _handle: JoinHandle<()>,
    },
    Replay {
        registry: Arc<Registry>,
        trades_only: bool,
        handle: JoinHandle<Result<()>>,
    },
}

/// A running session: either a self-healing live WebSocket connection or a
/// one-shot replay of a prior trading day, depending on whether `config`
/// carries a [`crate::replay::ReplayConfig`].
pub struct Client {
    inner: Inner,
}

impl Client {
    /// Construct and start a session. `on_trade` is required; an absent
    /// `on_quote` forces the effective trades-only flag to `true` regardless
    /// of `config`. Must be called from within a Tokio runtime — the session
    /// is driven by a spawned background task.
    pub fn new<F, G>(
        access_key: impl Into<String>,
        on_trade: F,
        on_quote: Option<G>,
        config: Config,
    ) -> Result<Self>
    where
        F: Fn(Trade) + Send + Sync + 'static,
        G: Fn(Quote) + Send + Sync + 'static,
    {
        config.validate()?;
        let access_key = access_key.into();
        let on_trade: TradeCallback = Arc::new(on_trade);
        let on_quote: Option<QuoteCallback> = on_quote.map(|f| Arc::new(f) as QuoteCallback);
        let trades_only = config.trades_only || on_quote.is_none();

        if let Some(replay_config) = config.replay.clone() {
            let registry = Arc::new(Registry::new());
            let handle = tokio::spawn(replay::replay(
                access_key,
                replay_config,
                registry.clone(),
                trades_only,
                on_trade,
                on_quote,
            ));
            return Ok(Self { inner: Inner::Replay { registry, trades_only, handle } });
        }

        let registry = Arc::new(Registry::new());
        let auth = AuthClient::new(config.provider.clone(), access_key, config.is_public_key, config.delayed)?;
        let handle_shutdown_signal = config.handle_shutdown_signal && !config.is_public_key;
        let controller = Controller::new(config, registry, auth, on_trade, on_quote);

        if handle_shutdown_signal {
            let for_signal = controller.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("received shutdown signal, stopping session");
                    for_signal.stop().await;
                }
            });
        }

        let handle = tokio::spawn(controller.clone().run());
        Ok(Self { inner: Inner::Live { controller, _handle: handle } })
    }

    /// Current lifecycle state. Replay sessions report [`State::Ready`]
    /// immediately (there is no connection to wait on) and [`State::Stopped`]
    /// once the merge is exhausted — but this crate does not track replay
    /// completion as observable state, so replay sessions always read
    /// [`State::Ready`] until the process awaiting them returns.
    pub fn state(&self) -> State {
        match &self.inner {
            Inner::Live { controller, .. } => controller.state(),
            Inner::Replay { .. } => State::Ready,
        }
    }

    /// Register interest in one or more symbols (or `"$lobby"` for the
    /// firehose). Waits for the session to be ready in live mode; takes
    /// effect immediately in replay mode.
    pub async fn join<I, S>(&self, symbols: I, trades_only: Option<bool>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &self.inner {
            Inner::Live { controller, .. } => controller.join(symbols, trades_only).await,
            Inner::Replay { registry, trades_only: default_trades_only, .. } => {
                let effective = trades_only.unwrap_or(false) || *default_trades_only;
                for symbol in symbols {
                    registry
                        .add(symbol.as_ref(), effective)
                        .map_err(|e| crate::error::Error::Config(e.to_string()))?;
                }
                Ok(())
            }
        }
    }

    /// Withdraw interest in the given symbols, or every registered symbol
    /// if `symbols` is `None`.
    pub async fn leave<I, S>(&self, symbols: Option<I>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match &self.inner {
            Inner::Live { controller, .. } => controller.leave(symbols).await,
            Inner::Replay { registry, .. } => {
                match symbols {
                    Some(list) => {
                        for symbol in list {
                            registry.remove(symbol.as_ref());
                        }
                    }
                    None => registry.clear(),
                }
                Ok(())
            }
        }
    }

    /// Leave every channel, close with code 1000, and stop reconnecting.
    /// A no-op for replay sessions, which terminate on their own once the
    /// merge is exhausted. Must be called at most once for a live session.
    pub async fn stop(&self) {
        if let Inner::Live { controller, .. } = &self.inner {
            controller.stop().await;
        }
    }

    /// Count of inbound WebSocket messages (frames, not sub-messages)
    /// received so far. Always `0` for replay sessions, which have no
    /// WebSocket.
    pub fn total_msg_count(&self) -> u64 {
        match &self.inner {
            Inner::Live { controller, .. } => controller.total_msg_count(),
            Inner::Replay { .. } => 0,
        }
    }

    /// Blocks until a replay session finishes merging and dispatching its
    /// tick files. A live session never completes on its own, so this waits
    /// forever for one — callers driving a live session should `stop()` it
    /// from elsewhere (e.g. a signal handler) rather than awaiting this.
    pub async fn wait(self) -> Result<()> {
        match self.inner {
            Inner::Live { _handle, .. } => {
                let _ = _handle.await;
                Ok(())
            }
            Inner::Replay { handle, .. } => handle.await.map_err(|e| crate::error::Error::Decode(e.to_string()))?,
        }
    }
}
