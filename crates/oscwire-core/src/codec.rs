//! OSC binary codec
//!
//! Wire layout (all integers and floats big-endian, every field zero-padded
//! to a 4-byte boundary):
//!
//! ```text
//! Message:  address (string) · type tag string (string) · argument bodies
//! Bundle:   "#bundle\0" (8 bytes) · timetag (8 bytes) ·
//!           { int32 size · element bytes } *
//! String:   UTF-8 bytes · NUL · zero pad
//! Blob:     int32 length · bytes · zero pad
//! ```
//!
//! A packet is distinguished by its first byte: `/` is a message, `#` is a
//! bundle.

use crate::error::{Error, Result};
use crate::time::TimeTag;
use crate::types::{parse_tag_string, tag_string, Argument, Bundle, Message, Packet, TypeTag};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Bundle marker, written as a standard OSC string (8 bytes on the wire)
pub const BUNDLE_TAG: &str = "#bundle";

/// Zero bytes required after a field of `len` bytes
#[inline(always)]
fn pad(len: usize) -> usize {
    (4 - len % 4) % 4
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Encode a packet to its wire form
pub fn encode(packet: &Packet) -> Result<Bytes> {
    match packet {
        Packet::Message(message) => encode_message(message),
        Packet::Bundle(bundle) => encode_bundle(bundle),
    }
}

/// Decode a packet, dispatching on the leading byte
pub fn decode(bytes: &[u8]) -> Result<Packet> {
    match bytes.first() {
        Some(b'/') => Ok(Packet::Message(decode_message(bytes)?)),
        Some(b'#') => Ok(Packet::Bundle(decode_bundle(bytes)?)),
        Some(&other) => Err(Error::InvalidPacket(format!(
            "unrecognized leading byte: 0x{other:02x}"
        ))),
        None => Err(Error::InvalidPacket("empty buffer".to_string())),
    }
}

/// Encode a message: address, type tag string, argument bodies
pub fn encode_message(message: &Message) -> Result<Bytes> {
    if !message.address.starts_with('/') {
        return Err(Error::InvalidMessage(format!(
            "address must start with '/': {:?}",
            message.address
        )));
    }

    let mut buf = BytesMut::with_capacity(message_wire_size(message));
    put_str(&mut buf, &message.address);
    put_str(&mut buf, &tag_string(&message.args));
    for arg in &message.args {
        put_argument(&mut buf, arg)?;
    }
    Ok(buf.freeze())
}

/// Decode a message
///
/// Trailing bytes past the last argument are ignored; stream framing owns
/// the packet boundary.
pub fn decode_message(bytes: &[u8]) -> Result<Message> {
    let mut buf = bytes;

    let address = get_str(&mut buf)?;
    if !address.starts_with('/') {
        return Err(Error::InvalidMessage(format!(
            "address must start with '/': {address:?}"
        )));
    }

    let tags = parse_tag_string(get_str(&mut buf)?)?;
    let mut args = Vec::with_capacity(tags.len());
    for tag in &tags {
        args.push(get_argument(&mut buf, tag)?);
    }

    Ok(Message {
        address: address.to_string(),
        args,
    })
}

/// Encode a bundle
///
/// A nested bundle whose timetag precedes the enclosing bundle's is rejected
/// here as well as on decode, keeping the ordering invariant symmetric.
pub fn encode_bundle(bundle: &Bundle) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(16 + bundle.elements.len() * 32);
    put_str(&mut buf, BUNDLE_TAG);
    put_time_tag(&mut buf, bundle.time_tag);

    for element in &bundle.elements {
        if let Packet::Bundle(inner) = element {
            if inner.time_tag < bundle.time_tag {
                return Err(Error::InvalidBundle(
                    "nested bundle timetag precedes enclosing bundle".to_string(),
                ));
            }
        }
        let body = encode(element)?;
        if body.len() > i32::MAX as usize {
            return Err(Error::InvalidBundle(format!(
                "bundle element too large: {} bytes",
                body.len()
            )));
        }
        buf.put_i32(body.len() as i32);
        buf.extend_from_slice(&body);
    }

    Ok(buf.freeze())
}

/// Decode a bundle
pub fn decode_bundle(bytes: &[u8]) -> Result<Bundle> {
    let mut buf = bytes;

    let marker = get_str(&mut buf)
        .map_err(|_| Error::InvalidBundle("truncated bundle header".to_string()))?;
    if marker != BUNDLE_TAG {
        return Err(Error::InvalidBundle(format!(
            "bad bundle marker: {marker:?}"
        )));
    }
    let time_tag = get_time_tag(&mut buf)
        .map_err(|_| Error::InvalidBundle("truncated bundle timetag".to_string()))?;

    let mut elements = Vec::new();
    while !buf.is_empty() {
        let size = get_i32(&mut buf)
            .map_err(|_| Error::InvalidBundle("truncated element size".to_string()))?;
        if size < 0 {
            return Err(Error::InvalidBundle(format!(
                "negative element size: {size}"
            )));
        }
        let size = size as usize;
        if buf.len() < size {
            return Err(Error::InvalidBundle(format!(
                "truncated element: need {size} bytes, have {}",
                buf.len()
            )));
        }

        let element = match decode(&buf[..size]) {
            Ok(element) => element,
            Err(Error::InvalidPacket(e)) => {
                return Err(Error::InvalidBundle(format!("invalid element: {e}")))
            }
            Err(e) => return Err(e),
        };
        if let Packet::Bundle(inner) = &element {
            if inner.time_tag < time_tag {
                return Err(Error::InvalidBundle(
                    "nested bundle timetag precedes enclosing bundle".to_string(),
                ));
            }
        }
        elements.push(element);
        buf.advance(size);
    }

    Ok(Bundle { time_tag, elements })
}

// ============================================================================
// ENCODING PRIMITIVES
// ============================================================================

/// Exact encoded size, used to pre-allocate (avoids realloc)
fn message_wire_size(message: &Message) -> usize {
    let address = message.address.len() + 1;
    let tags = message.args.len() + 2;
    address
        + pad(address)
        + tags
        + pad(tags)
        + message
            .args
            .iter()
            .map(argument_wire_size)
            .sum::<usize>()
}

fn argument_wire_size(arg: &Argument) -> usize {
    match arg {
        Argument::Int(_) | Argument::Float(_) => 4,
        Argument::TimeTag(_) => 8,
        Argument::String(s) => {
            let len = s.len() + 1;
            len + pad(len)
        }
        Argument::Blob(b) => 4 + b.len() + pad(b.len()),
        Argument::True | Argument::False | Argument::Null | Argument::Impulse => 0,
    }
}

fn put_str(buf: &mut BytesMut, s: &str) {
    buf.extend_from_slice(s.as_bytes());
    buf.put_u8(0);
    buf.put_bytes(0, pad(s.len() + 1));
}

fn put_blob(buf: &mut BytesMut, blob: &[u8]) -> Result<()> {
    if blob.len() > i32::MAX as usize {
        return Err(Error::InvalidMessage(format!(
            "blob too large: {} bytes",
            blob.len()
        )));
    }
    buf.put_i32(blob.len() as i32);
    buf.extend_from_slice(blob);
    buf.put_bytes(0, pad(blob.len()));
    Ok(())
}

fn put_time_tag(buf: &mut BytesMut, tag: TimeTag) {
    buf.put_u32(tag.seconds);
    buf.put_u32(tag.fractional);
}

fn put_argument(buf: &mut BytesMut, arg: &Argument) -> Result<()> {
    match arg {
        Argument::Int(i) => buf.put_i32(*i),
        Argument::Float(f) => buf.put_f32(*f),
        Argument::String(s) => put_str(buf, s),
        Argument::Blob(b) => put_blob(buf, b)?,
        Argument::TimeTag(t) => put_time_tag(buf, *t),
        // unit-valued tags carry no body
        Argument::True | Argument::False | Argument::Null | Argument::Impulse => {}
    }
    Ok(())
}

// ============================================================================
// DECODING PRIMITIVES
// ============================================================================

fn get_i32(buf: &mut &[u8]) -> Result<i32> {
    if buf.remaining() < 4 {
        return Err(Error::too_small(4, buf.remaining()));
    }
    Ok(buf.get_i32())
}

fn get_f32(buf: &mut &[u8]) -> Result<f32> {
    if buf.remaining() < 4 {
        return Err(Error::too_small(4, buf.remaining()));
    }
    Ok(buf.get_f32())
}

fn get_time_tag(buf: &mut &[u8]) -> Result<TimeTag> {
    if buf.remaining() < 8 {
        return Err(Error::too_small(8, buf.remaining()));
    }
    Ok(TimeTag::new(buf.get_u32(), buf.get_u32()))
}

/// Read a NUL-terminated padded string, advancing past the padding
fn get_str<'a>(buf: &mut &'a [u8]) -> Result<&'a str> {
    let data = *buf;
    let nul = data
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| Error::InvalidMessage("unterminated string".to_string()))?;
    let s = std::str::from_utf8(&data[..nul]).map_err(|e| Error::StringEncoding(e.to_string()))?;

    let consumed = nul + 1;
    let total = consumed + pad(consumed);
    if data.len() < total {
        return Err(Error::too_small(total, data.len()));
    }
    *buf = &data[total..];
    Ok(s)
}

/// Read a length-prefixed padded blob, advancing past the padding
fn get_blob<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8]> {
    let len = get_i32(buf)?;
    if len < 0 {
        return Err(Error::InvalidMessage(format!("negative blob length: {len}")));
    }
    let len = len as usize;

    let data = *buf;
    let total = len + pad(len);
    if data.len() < total {
        return Err(Error::too_small(total, data.len()));
    }
    *buf = &data[total..];
    Ok(&data[..len])
}

/// Decode one argument body, directed by its type tag
fn get_argument(buf: &mut &[u8], tag: &TypeTag) -> Result<Argument> {
    match tag {
        TypeTag::Int => Ok(Argument::Int(get_i32(buf)?)),
        TypeTag::Float => Ok(Argument::Float(get_f32(buf)?)),
        TypeTag::String => Ok(Argument::String(get_str(buf)?.to_string())),
        TypeTag::Blob => Ok(Argument::Blob(get_blob(buf)?.to_vec())),
        TypeTag::Time => Ok(Argument::TimeTag(get_time_tag(buf)?)),
        TypeTag::True => Ok(Argument::True),
        TypeTag::False => Ok(Argument::False),
        TypeTag::Null => Ok(Argument::Null),
        TypeTag::Impulse => Ok(Argument::Impulse),
        other => Err(Error::InvalidArgumentList(format!(
            "pattern-only type in a message: {other:?}"
        ))),
    }
}

// ============================================================================
// TESTS
// ============================================================================
