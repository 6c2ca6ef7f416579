//! oscwire core
//!
//! Transport-agnostic engine for Open Sound Control 1.1.
//!
//! This crate provides:
//! - The typed packet model ([`Message`], [`Bundle`], [`Argument`])
//! - Binary wire encoding/decoding ([`codec`])
//! - Address validation and wildcard pattern matching ([`address`])
//! - SLIP byte-stuffed framing for stream transports ([`slip`])
//! - NTP-epoch timetags ([`TimeTag`])
//!
//! Socket plumbing and service discovery live outside this crate; senders
//! call [`codec::encode`] (plus [`slip::encode`] on stream transports) and
//! receivers feed bytes through [`slip::Framer`] and [`codec::decode`].

pub mod address;
pub mod codec;
pub mod error;
pub mod slip;
pub mod time;
pub mod types;

pub use address::{match_pattern, validate_method_address, MatchKind};
pub use codec::{decode, encode};
pub use error::{Error, Result};
pub use time::TimeTag;
pub use types::{
    parse_tag_string, tag_string, type_tags_match, Argument, Bundle, Message, Packet, TypeTag,
};
