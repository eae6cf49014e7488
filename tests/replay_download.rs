//! Exercises the replay manifest-then-binary download path (C7's HTTP
//! half) against a hand-rolled local HTTP server — no mocking-framework
//! crate, plain tokio/reqwest sockets.

use std::io::Write as _;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use intrinio_realtime_rs::replay::{Downloader, Subsource};

#[tokio::test]
async fn downloads_manifest_then_binary_file() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");

    let tick_bytes: Vec<u8> = vec![0, 10, 1, 2, 3, 4, 5, 6, 7, 8, 0, 0, 0, 0, 0, 0, 0, 0];
    let tick_bytes_for_server = tick_bytes.clone();
    let file_url = format!("{base_url}/file/ticks.bin");

    tokio::spawn(async move {
        // Two requests land on this listener: the manifest, then the file.
        for _ in 0..2 {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 2048];
            let n = stream.read(&mut buf).await.unwrap_or(0);
            let head = String::from_utf8_lossy(&buf[..n]).into_owned();

            if head.starts_with("GET /securities/replay") {
                let body = format!(r#"{{"name":"ticks.bin","url":"{file_url}"}}"#);
                let resp = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(resp.as_bytes()).await.unwrap();
            } else {
                let mut resp = Vec::new();
                write!(
                    resp,
                    "HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    tick_bytes_for_server.len()
                )
                .unwrap();
                resp.extend_from_slice(&tick_bytes_for_server);
                stream.write_all(&resp).await.unwrap();
            }
        }
    });

    let dest_dir = std::env::temp_dir().join(format!("intrinio-download-test-{}", std::process::id()));
    tokio::fs::create_dir_all(&dest_dir).await.unwrap();

    let downloader = Downloader::with_base_url("test-key", base_url).unwrap();
    let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let path = downloader.download(Subsource::Iex, date, &dest_dir).await.unwrap();

    assert_eq!(path.file_name().unwrap(), "ticks.bin");
    let saved = tokio::fs::read(&path).await.unwrap();
    assert_eq!(saved, tick_bytes);
}
