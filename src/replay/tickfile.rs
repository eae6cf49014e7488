//! Lazy reader over one binary tick file (C7).
//!
//! Each call to [`TickFileReader::next_tick`] advances the underlying file
//! exactly one record, mirroring the cursor-advances-by-`msgLen` discipline
//! `codec::frame::parse_frame` uses for in-memory WebSocket frames.

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{Error, Result};

/// The largest legal sub-message is `msgLen <= 255` bytes (it's a `u8`).
const MAX_SUBMESSAGE_LEN: usize = u8::MAX as usize;
/// `N=1` header byte plus the largest legal sub-message.
const PAYLOAD_CAPACITY: usize = 1 + MAX_SUBMESSAGE_LEN;

/// One reconstructed tick: a receive timestamp and a single-message frame
/// payload that [`crate::codec::frame::parse_frame`] can decode unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tick {
    pub receive_time: u64,
    pub payload: Vec<u8>,
}

/// Reads `[msgType: u8][msgLen: u8][body: msgLen-2 bytes][receiveTime: u64 LE]`
/// records with no outer framing, synthesizing an `N=1` frame payload per
/// record on the fly.
pub struct TickFileReader<R> {
    inner: R,
}

impl<R: AsyncRead + Unpin> TickFileReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read the next record. Returns `Ok(None)` on a clean end-of-file at a
    /// record boundary; a short read mid-record is a [`Error::Decode`]
    /// truncation error.
    pub async fn next_tick(&mut self) -> Result<Option<Tick>> {
        let mut msg_type = [0u8; 1];
        match self.inner.read_exact(&mut msg_type).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(truncated(e)),
        }

        let mut msg_len_byte = [0u8; 1];
        self.inner.read_exact(&mut msg_len_byte).await.map_err(truncated)?;
        let msg_len = msg_len_byte[0] as usize;
        if msg_len < 2 {
            return Err(Error::Decode(format!("tick record msgLen {msg_len} is smaller than its own header")));
        }

        let mut body = vec![0u8; msg_len - 2];
        self.inner.read_exact(&mut body).await.map_err(truncated)?;

        let mut ts_buf = [0u8; 8];
        self.inner.read_exact(&mut ts_buf).await.map_err(truncated)?;
        let receive_time = u64::from_le_bytes(ts_buf);

        let mut payload = Vec::with_capacity(PAYLOAD_CAPACITY);
        payload.push(1u8); // N = 1
        payload.push(msg_type[0]);
        payload.push(msg_len_byte[0]);
        payload.extend_from_slice(&body);
        payload.resize(PAYLOAD_CAPACITY, 0);

        Ok(Some(Tick { receive_time, payload }))
    }
}

fn truncated(e: std::io::Error) -> Error {
    Error::Decode(format!("tick file truncated mid-record: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn record(msg_type: u8, body: &[u8], receive_time: u64) -> Vec<u8> {
        let msg_len = (2 + body.len()) as u8;
        let mut out = vec![msg_type, msg_len];
        out.extend_from_slice(body);
        out.extend_from_slice(&receive_time.to_le_bytes());
        out
    }

    #[tokio::test]
    async fn reads_sequential_records() {
        let mut bytes = Vec::new();
        bytes.extend(record(0, b"AAPL-ish", 10));
        bytes.extend(record(1, b"MSFT-ish", 20));

        let mut reader = TickFileReader::new(Cursor::new(bytes));

        let first = reader.next_tick().await.unwrap().unwrap();
        assert_eq!(first.receive_time, 10);
        assert_eq!(first.payload[0], 1);
        assert_eq!(first.payload[1], 0);
        assert_eq!(first.payload.len(), PAYLOAD_CAPACITY);

        let second = reader.next_tick().await.unwrap().unwrap();
        assert_eq!(second.receive_time, 20);
        assert_eq!(second.payload[1], 1);

        assert!(reader.next_tick().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn truncated_record_is_an_error() {
        let mut bytes = record(0, b"AAPL-ish", 10);
        bytes.truncate(bytes.len() - 3); // chop part of the timestamp
        let mut reader = TickFileReader::new(Cursor::new(bytes));
        assert!(reader.next_tick().await.is_err());
    }

    #[tokio::test]
    async fn empty_file_is_clean_eof() {
        let mut reader = TickFileReader::new(Cursor::new(Vec::<u8>::new()));
        assert!(reader.next_tick().await.unwrap().is_none());
    }
}
