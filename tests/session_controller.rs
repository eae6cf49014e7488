//! Exercises the session controller's reconnect-and-replay contract (§8 end
//! to end scenario 4) and the `stop()` cancellation contract against a
//! hand-rolled local TCP server — no mocking-framework crate, plain
//! reqwest/tokio sockets.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

use intrinio_realtime_rs::session::State;
use intrinio_realtime_rs::{Client, Config, Provider};

/// Dispatches a single accepted connection: an HTTP `GET /auth` is answered
/// with a fixed token; anything else is treated as a WebSocket upgrade. The
/// first WebSocket connection drops abruptly after its first join frame
/// (simulating a lost connection); later connections just record frames
/// until the peer sends a close frame.
async fn handle_conn(mut stream: TcpStream, joins: Arc<Mutex<Vec<String>>>, ws_count: Arc<AtomicUsize>) {
    let mut peek_buf = [0u8; 32];
    let n = stream.peek(&mut peek_buf).await.unwrap_or(0);
    let head = String::from_utf8_lossy(&peek_buf[..n]).into_owned();

    if head.starts_with("GET /auth") {
        let mut req = [0u8; 2048];
        let _ = stream.read(&mut req).await;
        let body = "test-token";
        let resp = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = stream.write_all(resp.as_bytes()).await;
        return;
    }

    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else { return };
    let (mut write, mut read) = ws.split();
    let attempt = ws_count.fetch_add(1, Ordering::SeqCst) + 1;

    while let Some(Ok(msg)) = read.next().await {
        match msg {
            Message::Binary(data) => {
                if data.first() == Some(&0x4A) {
                    let symbol = String::from_utf8_lossy(&data[2..]).into_owned();
                    joins.lock().unwrap().push(symbol);
                    if attempt == 1 {
                        return; // simulate a dropped connection
                    }
                }
            }
            Message::Close(_) => {
                let _ = write.close().await;
                return;
            }
            _ => {}
        }
    }
}

#[tokio::test]
async fn reconnect_replays_registry_and_stop_cancels_further_reconnects() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let host = listener.local_addr().unwrap().to_string();

    let joins = Arc::new(Mutex::new(Vec::new()));
    let ws_count = Arc::new(AtomicUsize::new(0));
    let accepted_total = Arc::new(AtomicUsize::new(0));

    {
        let joins = joins.clone();
        let ws_count = ws_count.clone();
        let accepted_total = accepted_total.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else { break };
                accepted_total.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(handle_conn(stream, joins.clone(), ws_count.clone()));
            }
        });
    }

    let config = Config::builder().provider(Provider::Manual { host }).build().unwrap();
    let client = Client::new(
        "test-key",
        |_trade: intrinio_realtime_rs::Trade| {},
        None::<fn(intrinio_realtime_rs::Quote)>,
        config,
    )
    .unwrap();

    client.join(["AAPL"], None).await.unwrap();

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while joins.lock().unwrap().len() < 2 && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    assert_eq!(*joins.lock().unwrap(), vec!["AAPL".to_string(), "AAPL".to_string()]);

    client.stop().await;
    assert_eq!(client.state(), State::Stopped);

    // Give any (incorrect) further reconnect attempt time to show up.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(accepted_total.load(Ordering::SeqCst), 3);
}
