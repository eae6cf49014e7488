//! # intrinio-realtime-rs
//!
//! An unofficial Rust client for a real-time equities market-data
//! WebSocket feed: token acquisition, a self-healing session with
//! exponential backoff, a binary frame codec, and a replay mode that
//! reconstructs a prior trading day from downloaded tick files.
//!
//! ## Quick start
//!
//! ```no_run
//! use intrinio_realtime_rs::{Client, Config};
//!
//! #[tokio::main]
//! async fn main() -> intrinio_realtime_rs::Result<()> {
//!     let config = Config::builder().build()?;
//!     let client = Client::new(
//!         "your-access-key",
//!         |trade| println!("{trade:?}"),
//!         None::<fn(intrinio_realtime_rs::Quote)>,
//!         config,
//!     )?;
//!
//!     client.join(["AAPL", "MSFT"], None).await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     client.stop().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backoff;
pub mod client;
pub mod codec;
pub mod constants;
pub mod error;
pub mod replay;
pub mod session;
pub mod subscription;
pub mod types;

pub use client::Client;
pub use error::{Error, Result};
pub use replay::ReplayConfig;
pub use session::{Config, ConfigBuilder};
pub use types::{Provider, Quote, Record, SubProvider, Trade};
