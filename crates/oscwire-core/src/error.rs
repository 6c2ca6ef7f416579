//! Error types for oscwire

use thiserror::Error;

/// Result type alias for oscwire operations
pub type Result<T> = std::result::Result<T, Error>;

/// oscwire error types
#[derive(Error, Debug)]
pub enum Error {
    /// Byte sequence is not valid UTF-8 where a string is required
    #[error("string encoding failure: {0}")]
    StringEncoding(String),

    /// Type tag string is missing its leading ',' or contains an unknown tag
    #[error("invalid argument list: {0}")]
    InvalidArgumentList(String),

    /// Malformed or truncated message structure
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Bad bundle marker, invalid nested element, or timetag ordering violation
    #[error("invalid bundle: {0}")]
    InvalidBundle(String),

    /// Leading byte identifies neither a message nor a bundle
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// Method address contains a reserved character
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Malformed SLIP escape sequence
    #[error("SLIP decoding failure: {0}")]
    SlipDecoding(String),

    /// SLIP encoding failure (not reachable for in-memory datagrams; every
    /// byte value is encodable)
    #[error("SLIP encoding failure: {0}")]
    SlipEncoding(String),
}

impl Error {
    pub(crate) fn too_small(needed: usize, have: usize) -> Self {
        Error::InvalidMessage(format!("buffer too small: need {needed} bytes, have {have}"))
    }
}
