//! The session controller: owns the WebSocket connection, drives the
//! `Authenticating -> Connecting -> Ready <-> Reconnecting -> Stopped` state
//! machine, and serializes outbound control frames through a single writer.
//! The writer handle is replaced on every successful (re)connect and read
//! through a mutex so `join`/`leave`/`stop` can send concurrently with the
//! receive loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio_tungstenite::tungstenite::protocol::{frame::coding::CloseCode, CloseFrame};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::auth::AuthClient;
use crate::backoff::{Backoff, Outcome};
use crate::codec::frame::{encode_join, encode_leave, parse_frame};
use crate::constants::{CLOSE_CODE_NORMAL, EQUITIES_FORMAT_HEADER_VALUE, HEARTBEAT_INTERVAL, SDK_ID, TOKEN_MAX_AGE};
use crate::error::{Error, Result};
use crate::session::config::Config;
use crate::subscription::Registry;
use crate::types::record::Record;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type Writer = SplitSink<WsStream, Message>;
type Reader = SplitStream<WsStream>;

/// Observable lifecycle state of a [`Controller`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Init,
    Authenticating,
    Connecting,
    Ready,
    Reconnecting,
    Stopped,
}

/// Callback invoked once per decoded trade.
pub type TradeCallback = Arc<dyn Fn(crate::types::record::Trade) + Send + Sync>;
/// Callback invoked once per decoded quote. Absent implies trades-only.
pub type QuoteCallback = Arc<dyn Fn(crate::types::record::Quote) + Send + Sync>;

/// Drives one logical session: authentication, connection, reconnection,
/// and outbound control-frame delivery. Constructed by [`crate::Client`],
/// which owns the [`tokio::task::JoinHandle`] for [`Controller::run`].
pub struct Controller {
    config: Config,
    registry: Arc<Registry>,
    auth: AuthClient,
    state_tx: watch::Sender<State>,
    state_rx: watch::Receiver<State>,
    writer: Mutex<Option<Writer>>,
    msg_count: AtomicU64,
    cancel_tx: watch::Sender<bool>,
    cancel_rx: watch::Receiver<bool>,
    on_trade: TradeCallback,
    on_quote: Option<QuoteCallback>,
}

impl Controller {
    pub(crate) fn new(
        config: Config,
        registry: Arc<Registry>,
        auth: AuthClient,
        on_trade: TradeCallback,
        on_quote: Option<QuoteCallback>,
    ) -> Arc<Self> {
        let (state_tx, state_rx) = watch::channel(State::Init);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        Arc::new(Self {
            config,
            registry,
            auth,
            state_tx,
            state_rx,
            writer: Mutex::new(None),
            msg_count: AtomicU64::new(0),
            cancel_tx,
            cancel_rx,
            on_trade,
            on_quote,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        *self.state_rx.borrow()
    }

    /// Total number of binary WebSocket messages received this session
    /// (one message may bundle several trade/quote records).
    pub fn total_msg_count(&self) -> u64 {
        self.msg_count.load(Ordering::Relaxed)
    }

    /// Wait until the controller reaches [`State::Ready`] (or gives up
    /// because it reached [`State::Stopped`] first).
    pub async fn wait_ready(&self) {
        let mut rx = self.state_rx.clone();
        loop {
            let state = *rx.borrow();
            if state == State::Ready || state == State::Stopped {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    /// Register interest in `symbols`, waiting for [`State::Ready`] first.
    /// The effective trades-only flag is the per-call flag OR'd with the
    /// client-wide default; first registration for a channel wins (see
    /// [`Registry::add`]).
    pub async fn join<I, S>(&self, symbols: I, trades_only: Option<bool>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.wait_ready().await;
        let effective = trades_only.unwrap_or(false) || self.config.trades_only;
        for symbol in symbols {
            let symbol = symbol.as_ref();
            self.registry
                .add(symbol, effective)
                .map_err(|e| Error::Config(e.to_string()))?;
            let frame = encode_join(symbol, effective);
            self.send_raw(Message::Binary(frame.into())).await?;
        }
        Ok(())
    }

    /// Withdraw interest in `symbols`, or every registered channel if
    /// `symbols` is `None`.
    pub async fn leave<I, S>(&self, symbols: Option<I>) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let channels: Vec<String> = match symbols {
            Some(list) => list.into_iter().map(|s| s.as_ref().to_owned()).collect(),
            None => self
                .registry
                .snapshot()
                .into_iter()
                .map(|e| e.channel.as_str().to_owned())
                .collect(),
        };

        for channel in channels {
            self.registry.remove(&channel);
            let frame = encode_leave(&channel);
            self.send_raw(Message::Binary(frame.into())).await?;
        }
        Ok(())
    }

    /// Leave every channel, flush, close with code 1000, and stop
    /// reconnecting. Idempotent — a second call is a no-op once the state
    /// has reached [`State::Stopped`].
    pub async fn stop(&self) {
        if self.state() == State::Stopped {
            return;
        }

        for entry in self.registry.snapshot() {
            let frame = encode_leave(entry.channel.as_str());
            if let Err(e) = self.send_raw(Message::Binary(frame.into())).await {
                tracing::warn!(error = %e, channel = %entry.channel, "failed to send leave frame during stop");
            }
        }

        // `send_raw` awaits the sink's own flush, so by the time every leave
        // frame above has been sent there is nothing left queued on our
        // side to drain; any remaining buffering is the OS socket's.
        let _ = self.send_close(CLOSE_CODE_NORMAL).await;
        self.cancel_tx.send(true).ok();
        self.state_tx.send(State::Stopped).ok();
    }

    /// Drive the session: authenticate, connect, replay subscriptions,
    /// receive until the connection drops, and reconnect through
    /// [`Backoff`] until `stop()` is called or the socket closes with code
    /// 1000. Runs until termination; spawned once by [`crate::Client::new`].
    pub async fn run(self: Arc<Self>) {
        let mut token: Option<String> = None;
        let mut last_ready_at: Option<Instant> = None;

        loop {
            if self.is_cancelled() {
                break;
            }

            let need_auth = token.is_none()
                || last_ready_at.is_none_or(|t| t.elapsed() >= TOKEN_MAX_AGE);

            if need_auth {
                self.state_tx.send(State::Authenticating).ok();
                let mut backoff = Backoff::new(self.cancel_rx.clone());
                let (outcome, acquired) = backoff.run(|| self.auth.acquire_token()).await;
                match outcome {
                    Outcome::Cancelled => break,
                    Outcome::Succeeded => token = acquired,
                }
            }

            let Some(tok) = token.as_deref() else { break };

            self.state_tx.send(State::Connecting).ok();
            let mut backoff = Backoff::new(self.cancel_rx.clone());
            let (outcome, conn) = backoff.run(|| self.connect(tok)).await;
            let (writer, reader) = match outcome {
                Outcome::Cancelled => break,
                Outcome::Succeeded => conn.expect("Succeeded outcome carries a value"),
            };

            *self.writer.lock().await = Some(writer);
            self.replay_subscriptions().await;
            last_ready_at = Some(Instant::now());
            self.state_tx.send(State::Ready).ok();
            tracing::info!("session ready");

            let close_code = self.receive_loop(reader).await;
            *self.writer.lock().await = None;

            if self.is_cancelled() {
                break;
            }
            if close_code == Some(CLOSE_CODE_NORMAL) {
                break;
            }

            tracing::warn!(?close_code, "connection lost, reconnecting");
            self.state_tx.send(State::Reconnecting).ok();
        }

        self.state_tx.send(State::Stopped).ok();
    }

    fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    async fn connect(&self, token: &str) -> Result<(Writer, Reader)> {
        let (scheme, host) = self.config.provider.ws_host();
        let url = format!(
            "{scheme}://{host}/socket/websocket?vsn=1.0.0&token={token}&Client-Information={SDK_ID}&UseNewEquitiesFormat={EQUITIES_FORMAT_HEADER_VALUE}"
        );
        let (ws, _resp) = connect_async(&url).await?;
        let (writer, reader) = ws.split();
        Ok((writer, reader))
    }

    async fn replay_subscriptions(&self) {
        for entry in self.registry.snapshot() {
            let frame = encode_join(entry.channel.as_str(), entry.trades_only);
            if let Err(e) = self.send_raw(Message::Binary(frame.into())).await {
                tracing::warn!(error = %e, channel = %entry.channel, "failed to replay subscription");
            }
        }
    }

    async fn receive_loop(&self, mut reader: Reader) -> Option<u16> {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if self.send_raw(Message::Binary(Vec::new().into())).await.is_err() {
                        return None;
                    }
                }
                msg = reader.next() => {
                    match msg {
                        Some(Ok(Message::Binary(data))) => {
                            self.msg_count.fetch_add(1, Ordering::Relaxed);
                            match parse_frame(&data) {
                                Ok(records) => self.dispatch(records),
                                Err(e) => tracing::warn!(error = %e, "dropping malformed frame"),
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            return Some(frame.map(|f| u16::from(f.code)).unwrap_or(1006));
                        }
                        Some(Ok(_)) => continue,
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "websocket read error");
                            return None;
                        }
                        None => return None,
                    }
                }
            }
        }
    }

    fn dispatch(&self, records: Vec<Record>) {
        for record in records {
            match record {
                Record::Trade(t) => (self.on_trade)(t),
                Record::Quote(q) => match &self.on_quote {
                    Some(cb) => cb(q),
                    None => tracing::debug!(symbol = %q.symbol, "dropping quote: no on_quote callback registered"),
                },
            }
        }
    }

    async fn send_raw(&self, msg: Message) -> Result<()> {
        let mut guard = self.writer.lock().await;
        match guard.as_mut() {
            Some(writer) => writer.send(msg).await.map_err(Error::WebSocket),
            None => Err(Error::Decode("no active connection to send on".into())),
        }
    }

    async fn send_close(&self, code: u16) -> Result<()> {
        let mut guard = self.writer.lock().await;
        if let Some(mut writer) = guard.take() {
            let frame = CloseFrame { code: CloseCode::from(code), reason: "".into() };
            writer.send(Message::Close(Some(frame))).await.map_err(Error::WebSocket)?;
        }
        Ok(())
    }
}
