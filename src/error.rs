//! Error types for kinetic-client.

use thiserror::Error;

/// Main error type for all client operations.
///
/// These are *transport/local* failures. Application-level outcomes
/// reported by the device (NOT_FOUND, VERSION_MISMATCH, ...) travel in
/// [`Status`](crate::Status) and are never raised through this type.
#[derive(Debug, Error)]
pub enum KineticError {
    /// I/O error on the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Protobuf decode error on an inbound envelope or command.
    #[error("protobuf decode error: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Frame did not start with the magic byte `0x46`.
    #[error("invalid frame: magic byte {0:#04x}, expected 0x46")]
    InvalidFrame(u8),

    /// Frame message or value length exceeds the negotiated maximum.
    #[error("frame too large: {part} length {len} exceeds maximum {max}")]
    FrameTooLarge {
        /// Which length field overflowed ("message" or "value").
        part: &'static str,
        len: u32,
        max: u32,
    },

    /// HMAC tag on an inbound response did not verify.
    #[error("HMAC verification failed")]
    HmacMismatch,

    /// TLS configuration or server-name error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Protocol violation (missing envelope fields, wrong auth type, ...).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The connection was closed; no further submissions are accepted.
    #[error("connection closed")]
    ClientShutdown,
}

/// Result type alias using KineticError.
pub type Result<T> = std::result::Result<T, KineticError>;
