//! SLIP framing (RFC 1055)
//!
//! Stream transports carry OSC packets as SLIP datagrams: every `END` byte
//! in the payload is replaced by `ESC ESC_END`, every `ESC` by `ESC ESC_ESC`,
//! and a single `END` terminates the datagram. [`Framer`] reassembles
//! datagrams from an arbitrarily chunked byte stream.

use crate::error::{Error, Result};
use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

/// Datagram terminator
pub const END: u8 = 0xC0;
/// Escape introducer
pub const ESC: u8 = 0xDB;
/// Escaped form of `END`
pub const ESC_END: u8 = 0xDC;
/// Escaped form of `ESC`
pub const ESC_ESC: u8 = 0xDD;

/// SLIP-encode one datagram, terminated by a single `END`
pub fn encode(datagram: &[u8]) -> Bytes {
    let mut out = BytesMut::with_capacity(datagram.len() + datagram.len() / 16 + 1);
    encode_to(datagram, &mut out);
    out.freeze()
}

/// Escape `datagram` into `out` and terminate it with `END`
///
/// Clean runs between escape-worthy bytes are copied wholesale; only `END`
/// and `ESC` bytes cost a two-byte sequence.
pub fn encode_to(datagram: &[u8], out: &mut BytesMut) {
    let mut rest = datagram;
    while let Some(i) = rest.iter().position(|&b| b == END || b == ESC) {
        out.extend_from_slice(&rest[..i]);
        if rest[i] == END {
            out.extend_from_slice(&[ESC, ESC_END]);
        } else {
            out.extend_from_slice(&[ESC, ESC_ESC]);
        }
        rest = &rest[i + 1..];
    }
    out.extend_from_slice(rest);
    out.put_u8(END);
}

/// Decode one SLIP datagram
///
/// Leading `END` bytes (double-ended senders, idle keepalives) are
/// discarded; one trailing `END` is dropped. A dangling escape or an unknown
/// escape follow-byte fails the whole datagram.
pub fn decode(frame: &[u8]) -> Result<Bytes> {
    let mut frame = frame;
    while frame.first() == Some(&END) {
        frame = &frame[1..];
    }
    if frame.last() == Some(&END) {
        frame = &frame[..frame.len() - 1];
    }

    let mut out = BytesMut::with_capacity(frame.len());
    let mut rest = frame;
    while let Some(i) = rest.iter().position(|&b| b == ESC) {
        out.extend_from_slice(&rest[..i]);
        match rest.get(i + 1) {
            Some(&ESC_END) => out.put_u8(END),
            Some(&ESC_ESC) => out.put_u8(ESC),
            Some(&other) => {
                return Err(Error::SlipDecoding(format!(
                    "invalid escape sequence 0xdb 0x{other:02x}"
                )))
            }
            None => {
                return Err(Error::SlipDecoding(
                    "dangling escape at end of frame".to_string(),
                ))
            }
        }
        rest = &rest[i + 2..];
    }
    out.extend_from_slice(rest);
    Ok(out.freeze())
}

/// Streaming SLIP reassembler for one connection
///
/// Bytes are buffered until a complete `END`-terminated datagram is present,
/// then decoded in one piece. A datagram that fails to decode is dropped and
/// the stream resumes at the next `END` marker, so one corrupt escape
/// sequence never desynchronizes the connection. Not shareable between
/// concurrent readers.
#[derive(Debug, Default)]
pub struct Framer {
    buf: BytesMut,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed received bytes; returns every datagram completed by this input
    pub fn push_bytes(&mut self, input: &[u8]) -> Vec<Bytes> {
        self.buf.extend_from_slice(input);

        let mut complete = Vec::new();
        while let Some(end) = self.buf.iter().position(|&b| b == END) {
            let frame = self.buf.split_to(end + 1);
            if frame.len() == 1 {
                // bare END between datagrams
                continue;
            }
            match decode(&frame) {
                Ok(datagram) => complete.push(datagram),
                Err(e) => debug!("discarding undecodable SLIP datagram: {}", e),
            }
        }
        complete
    }

    /// Bytes buffered toward the next, still incomplete datagram
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}
