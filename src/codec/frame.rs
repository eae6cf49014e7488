//! Binary frame envelope: parsing inbound trade/quote frames and encoding
//! outbound join/leave control frames.
//!
//! Each inbound message bundles `N` sub-messages, each `msgType`-dispatched
//! and length-delimited, with variable-length symbol/condition strings.

use crate::codec::reader::{read_ascii, read_price_f32, read_u32, read_u64, read_utf16_be};
use crate::constants::{FIREHOSE_WIRE_TOKEN, LOBBY_CHANNEL, OPCODE_JOIN, OPCODE_LEAVE};
use crate::error::{Error, Result};
use crate::types::enums::SubProvider;
use crate::types::record::{Quote, QuoteKind, Record, Trade};

const MSG_TYPE_TRADE: u8 = 0;
const MSG_TYPE_ASK: u8 = 1;
const MSG_TYPE_BID: u8 = 2;

/// Parse one inbound WebSocket binary message into its constituent
/// trade/quote records.
///
/// The first byte is `N`, the number of concatenated sub-messages. Each
/// sub-message's `msgLen` byte tells the cursor exactly how far to advance,
/// so an unknown `msgType` is logged and skipped without desynchronizing
/// the rest of the frame.
pub fn parse_frame(buf: &[u8]) -> Result<Vec<Record>> {
    let Some(&n) = buf.first() else {
        return Err(Error::Decode("empty frame: missing sub-message count".into()));
    };
    let mut records = Vec::with_capacity(n as usize);
    let mut cursor = 1usize;

    for _ in 0..n {
        if cursor + 3 > buf.len() {
            return Err(Error::Decode(format!(
                "frame truncated: cursor {cursor} leaves no room for sub-message header"
            )));
        }
        let msg_type = buf[cursor];
        let msg_len = buf[cursor + 1] as usize;
        let sym_len = buf[cursor + 2] as usize;

        let start = cursor;
        let end = start + msg_len;
        if end > buf.len() {
            return Err(Error::Decode(format!(
                "sub-message at {start} claims length {msg_len} but frame is only {} bytes",
                buf.len()
            )));
        }
        let body = &buf[start..end];

        match msg_type {
            MSG_TYPE_TRADE => records.push(Record::Trade(parse_trade(body, sym_len)?)),
            MSG_TYPE_ASK => records.push(Record::Quote(parse_quote(body, sym_len, QuoteKind::Ask)?)),
            MSG_TYPE_BID => records.push(Record::Quote(parse_quote(body, sym_len, QuoteKind::Bid)?)),
            other => {
                tracing::warn!(msg_type = other, start, msg_len, "unknown sub-message type, skipping");
            }
        }

        cursor = end;
    }

    Ok(records)
}

fn parse_trade(body: &[u8], sym_len: usize) -> Result<Trade> {
    let symbol = read_ascii(body, 3, 3 + sym_len);
    let sub_provider = SubProvider::from_byte(*body.get(3 + sym_len).unwrap_or(&0));
    let market_center = read_utf16_be(body, 4 + sym_len, 6 + sym_len);
    let price = read_price_f32(body, 6 + sym_len);
    let size = read_u32(body, 10 + sym_len);
    let timestamp = read_u64(body, 14 + sym_len);
    let total_volume = read_u32(body, 22 + sym_len);
    let cond_len = *body.get(26 + sym_len).unwrap_or(&0) as usize;
    let condition = read_ascii(body, 27 + sym_len, 27 + sym_len + cond_len);

    Ok(Trade {
        symbol,
        price,
        size,
        timestamp,
        total_volume,
        sub_provider,
        market_center,
        condition,
    })
}

fn parse_quote(body: &[u8], sym_len: usize, kind: QuoteKind) -> Result<Quote> {
    let symbol = read_ascii(body, 3, 3 + sym_len);
    let sub_provider = SubProvider::from_byte(*body.get(3 + sym_len).unwrap_or(&0));
    let market_center = read_utf16_be(body, 4 + sym_len, 6 + sym_len);
    let price = read_price_f32(body, 6 + sym_len);
    let size = read_u32(body, 10 + sym_len);
    let timestamp = read_u64(body, 14 + sym_len);
    let cond_len = *body.get(22 + sym_len).unwrap_or(&0) as usize;
    let condition = read_ascii(body, 23 + sym_len, 23 + sym_len + cond_len);

    Ok(Quote {
        kind,
        symbol,
        price,
        size,
        timestamp,
        sub_provider,
        market_center,
        condition,
    })
}

// ---------------------------------------------------------------------------
// Control frame encoding (client -> server)
// ---------------------------------------------------------------------------

/// Build a join control frame: opcode `'J'`, a trades-only flag byte, then
/// the symbol as ASCII (the firehose channel is sent as the literal
/// `$FIREHOSE`, never `$lobby`).
pub fn encode_join(channel: &str, trades_only: bool) -> Vec<u8> {
    let wire_symbol = wire_symbol(channel);
    let mut out = Vec::with_capacity(2 + wire_symbol.len());
    out.push(OPCODE_JOIN);
    out.push(trades_only as u8);
    out.extend_from_slice(wire_symbol.as_bytes());
    out
}

/// Build a leave control frame: opcode `'L'`, then the symbol as ASCII.
/// There is no flag byte for `leave`.
pub fn encode_leave(channel: &str) -> Vec<u8> {
    let wire_symbol = wire_symbol(channel);
    let mut out = Vec::with_capacity(1 + wire_symbol.len());
    out.push(OPCODE_LEAVE);
    out.extend_from_slice(wire_symbol.as_bytes());
    out
}

fn wire_symbol(channel: &str) -> &str {
    if channel == LOBBY_CHANNEL {
        FIREHOSE_WIRE_TOKEN
    } else {
        channel
    }
}
