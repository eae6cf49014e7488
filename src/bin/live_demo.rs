//! Connects to the realtime feed and prints trades (and, if requested,
//! quotes) for a handful of symbols.
//!
//! # Usage
//!
//! ```sh
//! export INTRINIO_API_KEY="your-access-key"
//! cargo run --bin live_demo --features cli -- AAPL MSFT GE
//! ```
//!
//! With no symbols given, joins `$lobby` (the full firehose).

use std::env;
use std::time::Duration;

use intrinio_realtime_rs::{Client, Config};

#[tokio::main]
async fn main() -> intrinio_realtime_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let access_key = env::var("INTRINIO_API_KEY").expect("set INTRINIO_API_KEY env var before running");

    let symbols: Vec<String> = env::args().skip(1).collect();
    let symbols = if symbols.is_empty() { vec!["$lobby".to_string()] } else { symbols };

    let config = Config::builder().handle_shutdown_signal(true).build()?;
    let client = Client::new(
        access_key,
        |trade| println!("TRADE {trade:?}"),
        Some(|quote| println!("QUOTE {quote:?}")),
        config,
    )?;

    println!("Joining {} channel(s): {symbols:?}", symbols.len());
    client.join(&symbols, None).await?;

    println!("Listening for 60 seconds (Ctrl-C to stop early)…");
    tokio::time::sleep(Duration::from_secs(60)).await;

    client.stop().await;
    println!("Received {} messages total.", client.total_msg_count());
    Ok(())
}
