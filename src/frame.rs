//! Frame codec: the 9-byte header and its surrounding byte layout.
//!
//! Every logical message on the wire is one frame:
//!
//! ```text
//! ┌───────┬──────────────┬──────────────┬─────────────┬──────────────┐
//! │ magic │ message_len  │ value_len    │ message     │ value        │
//! │ 0x46  │ u32 BE       │ u32 BE       │ N bytes     │ M bytes      │
//! └───────┴──────────────┴──────────────┴─────────────┴──────────────┘
//! ```
//!
//! `message` is the serialized authenticated envelope; `value` is the
//! opaque payload and may be empty (`value_len = 0`, no padding).

use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::{KineticError, Result};

/// First byte of every frame ('F').
pub const FRAME_MAGIC: u8 = 0x46;

/// Fixed header size: magic + two u32 lengths.
pub const FRAME_HEADER_SIZE: usize = 9;

/// Default maximum serialized envelope size (1 MiB, the device limit).
pub const DEFAULT_MAX_MESSAGE_SIZE: u32 = 1024 * 1024;

/// Default maximum value payload size (1 MiB, the device limit).
pub const DEFAULT_MAX_VALUE_SIZE: u32 = 1024 * 1024;

/// Negotiated size bounds applied when decoding inbound frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameLimits {
    pub max_message_size: u32,
    pub max_value_size: u32,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            max_message_size: DEFAULT_MAX_MESSAGE_SIZE,
            max_value_size: DEFAULT_MAX_VALUE_SIZE,
        }
    }
}

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Length of the serialized envelope that follows.
    pub message_len: u32,
    /// Length of the trailing value payload (0 = none).
    pub value_len: u32,
}

impl FrameHeader {
    pub fn new(message_len: u32, value_len: u32) -> Self {
        Self {
            message_len,
            value_len,
        }
    }

    /// Encode to the 9-byte wire form (big endian).
    pub fn encode(&self) -> [u8; FRAME_HEADER_SIZE] {
        let mut buf = [0u8; FRAME_HEADER_SIZE];
        buf[0] = FRAME_MAGIC;
        buf[1..5].copy_from_slice(&self.message_len.to_be_bytes());
        buf[5..9].copy_from_slice(&self.value_len.to_be_bytes());
        buf
    }

    /// Decode from the 9-byte wire form.
    ///
    /// Rejects a frame whose first byte is not the magic.
    pub fn decode(buf: &[u8; FRAME_HEADER_SIZE]) -> Result<Self> {
        if buf[0] != FRAME_MAGIC {
            return Err(KineticError::InvalidFrame(buf[0]));
        }
        Ok(Self {
            message_len: u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]),
            value_len: u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]),
        })
    }

    /// Check both lengths against the negotiated limits.
    pub fn validate(&self, limits: &FrameLimits) -> Result<()> {
        if self.message_len > limits.max_message_size {
            return Err(KineticError::FrameTooLarge {
                part: "message",
                len: self.message_len,
                max: limits.max_message_size,
            });
        }
        if self.value_len > limits.max_value_size {
            return Err(KineticError::FrameTooLarge {
                part: "value",
                len: self.value_len,
                max: limits.max_value_size,
            });
        }
        Ok(())
    }
}

/// One complete inbound frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Serialized authenticated envelope.
    pub message: Bytes,
    /// Opaque value payload (empty if none).
    pub value: Bytes,
}

/// Read exactly one frame, re-issuing partial reads until the full
/// count is obtained or the socket closes.
pub async fn read_frame<R>(reader: &mut R, limits: &FrameLimits) -> Result<Frame>
where
    R: AsyncRead + Unpin,
{
    let mut header_buf = [0u8; FRAME_HEADER_SIZE];
    reader.read_exact(&mut header_buf).await?;
    let header = FrameHeader::decode(&header_buf)?;
    header.validate(limits)?;

    let mut message = vec![0u8; header.message_len as usize];
    reader.read_exact(&mut message).await?;

    let value = if header.value_len > 0 {
        let mut value = vec![0u8; header.value_len as usize];
        reader.read_exact(&mut value).await?;
        Bytes::from(value)
    } else {
        Bytes::new()
    };

    Ok(Frame {
        message: Bytes::from(message),
        value,
    })
}

/// Assemble one frame as a contiguous byte vector (header + envelope +
/// value).
pub fn encode_frame(message: &[u8], value: &[u8]) -> Vec<u8> {
    let header = FrameHeader::new(message.len() as u32, value.len() as u32);
    let mut buf = Vec::with_capacity(FRAME_HEADER_SIZE + message.len() + value.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(message);
    buf.extend_from_slice(value);
    buf
}
