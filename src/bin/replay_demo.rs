//! Downloads and replays a prior trading day's tick files, printing trades
//! as they're dispatched.
//!
//! # Usage
//!
//! ```sh
//! export INTRINIO_API_KEY="your-access-key"
//! cargo run --bin replay_demo --features cli -- 2024-01-02 AAPL MSFT
//! ```

use std::env;

use intrinio_realtime_rs::{Client, Config, ReplayConfig};

#[tokio::main]
async fn main() -> intrinio_realtime_rs::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let access_key = env::var("INTRINIO_API_KEY").expect("set INTRINIO_API_KEY env var before running");

    let mut args = env::args().skip(1);
    let date_arg = args.next().expect("usage: replay_demo YYYY-MM-DD [SYMBOL...]");
    let date = chrono::NaiveDate::parse_from_str(&date_arg, "%Y-%m-%d").expect("date must be YYYY-MM-DD");
    let symbols: Vec<String> = args.collect();
    let symbols = if symbols.is_empty() { vec!["$lobby".to_string()] } else { symbols };

    let replay = ReplayConfig::builder(date).as_if_live(true).delete_file_when_done(true).build();
    let config = Config::builder().replay(replay).build()?;

    let client = Client::new(access_key, |trade| println!("TRADE {trade:?}"), None::<fn(intrinio_realtime_rs::Quote)>, config)?;

    println!("Joining {} channel(s): {symbols:?}", symbols.len());
    client.join(&symbols, None).await?;

    println!("Replaying {date}…");
    client.wait().await?;
    println!("Replay finished.");
    Ok(())
}
