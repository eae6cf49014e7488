//! Replay mode: reconstruct a single trading day by downloading per-
//! subsource tick files and merging them into one time-ordered stream,
//! optionally paced to wall-clock, through the same dispatch contract as
//! live sessions.

pub mod download;
pub mod merge;
pub mod tickfile;

pub use download::{Downloader, Subsource};
pub use merge::MergeEngine;
pub use tickfile::{Tick, TickFileReader};

use std::path::PathBuf;
use std::sync::Arc;

use tokio::time::Instant;

use crate::codec::frame::parse_frame;
use crate::error::Result;
use crate::session::controller::{QuoteCallback, TradeCallback};
use crate::subscription::Registry;
use crate::types::record::Record;

/// Configuration for [`replay`].
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    pub(crate) date: chrono::NaiveDate,
    pub(crate) as_if_live: bool,
    pub(crate) delete_file_when_done: bool,
    pub(crate) subsources: Vec<Subsource>,
    pub(crate) dest_dir: PathBuf,
}

impl ReplayConfig {
    /// Start building a config for `date`. Defaults to the `IEX` subsource,
    /// no pacing, files kept on disk after the run, and a shared temp dir.
    pub fn builder(date: chrono::NaiveDate) -> ReplayConfigBuilder {
        ReplayConfigBuilder {
            config: ReplayConfig {
                date,
                as_if_live: false,
                delete_file_when_done: false,
                subsources: vec![Subsource::Iex],
                dest_dir: std::env::temp_dir().join("intrinio-replay"),
            },
        }
    }
}

/// Builder for [`ReplayConfig`].
#[derive(Debug, Clone)]
pub struct ReplayConfigBuilder {
    config: ReplayConfig,
}

impl ReplayConfigBuilder {
    /// Pace output to wall-clock, reproducing original inter-arrival gaps.
    pub fn as_if_live(mut self, enable: bool) -> Self {
        self.config.as_if_live = enable;
        self
    }

    /// Unlink each downloaded tick file once the merge completes.
    pub fn delete_file_when_done(mut self, enable: bool) -> Self {
        self.config.delete_file_when_done = enable;
        self
    }

    /// Which per-subsource tick files to download and merge. Defaults to
    /// `[Subsource::Iex]`; see `DESIGN.md` for why this is an explicit
    /// setting rather than a single implicit provider.
    pub fn subsources(mut self, subsources: Vec<Subsource>) -> Self {
        self.config.subsources = subsources;
        self
    }

    /// Directory downloaded tick files are written to.
    pub fn dest_dir(mut self, dest_dir: impl Into<PathBuf>) -> Self {
        self.config.dest_dir = dest_dir.into();
        self
    }

    pub fn build(self) -> ReplayConfig {
        self.config
    }
}

/// Drives a primed [`MergeEngine`] to completion, optionally pacing output
/// to wall-clock, filtering by the shared subscription registry and the
/// trades-only flag, and dispatching to the same callback types the live
/// session controller uses.
pub struct Player {
    merge: MergeEngine,
    registry: Arc<Registry>,
    as_if_live: bool,
    trades_only: bool,
    on_trade: TradeCallback,
    on_quote: Option<QuoteCallback>,
}

impl Player {
    pub fn new(
        merge: MergeEngine,
        registry: Arc<Registry>,
        as_if_live: bool,
        trades_only: bool,
        on_trade: TradeCallback,
        on_quote: Option<QuoteCallback>,
    ) -> Self {
        Self { merge, registry, as_if_live, trades_only, on_trade, on_quote }
    }

    /// Run until every tick file is exhausted.
    pub async fn run(mut self) -> Result<()> {
        let mut origin: Option<(u64, Instant)> = None;

        while let Some(tick) = self.merge.next().await? {
            if self.as_if_live {
                origin = Some(self.pace(&tick, origin).await);
            }
            self.dispatch(&tick.payload)?;
        }
        Ok(())
    }

    async fn pace(&self, tick: &Tick, origin: Option<(u64, Instant)>) -> (u64, Instant) {
        match origin {
            None => (tick.receive_time, Instant::now()),
            Some((first_ts, first_instant)) => {
                let elapsed = tick.receive_time.saturating_sub(first_ts);
                let target = first_instant + std::time::Duration::from_nanos(elapsed);
                tokio::time::sleep_until(target).await;
                (first_ts, first_instant)
            }
        }
    }

    fn dispatch(&self, payload: &[u8]) -> Result<()> {
        for record in parse_frame(payload)? {
            if !self.registry.matches(record.symbol()) {
                continue;
            }
            match record {
                Record::Trade(t) => (self.on_trade)(t),
                Record::Quote(q) => {
                    if self.trades_only {
                        continue;
                    }
                    if let Some(cb) = &self.on_quote {
                        cb(q);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Download every configured subsource for `config.date`, merge them, and
/// run the player to completion. One-shot: returns once the day's data is
/// exhausted.
pub async fn replay(
    access_key: impl Into<String>,
    config: ReplayConfig,
    registry: Arc<Registry>,
    trades_only: bool,
    on_trade: TradeCallback,
    on_quote: Option<QuoteCallback>,
) -> Result<()> {
    tokio::fs::create_dir_all(&config.dest_dir).await?;

    let downloader = Downloader::new(access_key)?;
    let mut paths = Vec::with_capacity(config.subsources.len());
    for subsource in &config.subsources {
        let path = downloader.download(*subsource, config.date, &config.dest_dir).await?;
        paths.push(path);
    }

    let merge = MergeEngine::new(paths, config.delete_file_when_done).await?;
    let player = Player::new(merge, registry, config.as_if_live, trades_only, on_trade, on_quote);
    player.run().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;

    fn trade_tick(symbol: &str, receive_time: u64) -> Tick {
        let sym = symbol.as_bytes();
        let msg_len = 3 + sym.len() + 1 + 2 + 4 + 4 + 8 + 4 + 1;
        let mut payload = vec![1u8]; // N = 1
        payload.push(0); // msgType = Trade
        payload.push(msg_len as u8);
        payload.push(sym.len() as u8);
        payload.extend_from_slice(sym);
        payload.push(6); // subProvider = IEX
        payload.extend_from_slice(&0u16.to_be_bytes());
        payload.extend_from_slice(&(1.0f32).to_le_bytes());
        payload.extend_from_slice(&1u32.to_le_bytes());
        payload.extend_from_slice(&0u64.to_le_bytes());
        payload.extend_from_slice(&0u32.to_le_bytes());
        payload.push(0);
        Tick { receive_time, payload }
    }

    #[tokio::test]
    async fn dispatch_filters_by_registry_and_trades_only() {
        let registry = Arc::new(Registry::new());
        registry.add("AAPL", false).unwrap();

        let seen = Arc::new(StdMutex::new(Vec::new()));
        let seen2 = seen.clone();
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = count.clone();

        let merge = MergeEngine::new(vec![], false).await.unwrap();
        let player = Player::new(
            merge,
            registry,
            false,
            false,
            Arc::new(move |t: crate::types::record::Trade| {
                seen2.lock().unwrap().push(t.symbol);
                count2.fetch_add(1, Ordering::SeqCst);
            }),
            None,
        );

        player.dispatch(&trade_tick("AAPL", 1).payload).unwrap();
        player.dispatch(&trade_tick("MSFT", 2).payload).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["AAPL".to_string()]);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn as_if_live_paces_between_ticks_by_the_original_gap() {
        let registry = Arc::new(Registry::new());
        registry.add("$lobby", false).unwrap();
        let stamps = Arc::new(StdMutex::new(Vec::new()));
        let stamps2 = stamps.clone();

        let merge = MergeEngine::new(vec![], false).await.unwrap();
        let player = Player::new(
            merge,
            registry,
            true,
            false,
            Arc::new(|_: crate::types::record::Trade| {}),
            None,
        );

        let start = Instant::now();
        let mut origin = None;
        for tick in [trade_tick("AAPL", 0), trade_tick("AAPL", 500_000_000)] {
            origin = Some(player.pace(&tick, origin).await);
            stamps2.lock().unwrap().push(start.elapsed());
        }

        let gaps = stamps.lock().unwrap();
        assert!(gaps[0] < std::time::Duration::from_millis(1));
        assert!(gaps[1] >= std::time::Duration::from_millis(500));
    }
}
