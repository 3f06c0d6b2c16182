use std::fmt;

/// Which part of a frame was being read when the stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePart {
    Header,
    Body,
}

impl fmt::Display for FramePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Body => f.write_str("body"),
        }
    }
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer than 16 bytes were handed to the header decoder.
    #[error("malformed header ({len} bytes, need 16)")]
    MalformedHeader { len: usize },

    /// The stream ended before a complete header or body arrived.
    #[error("unexpected end of stream in {part} ({received} of {expected} bytes)")]
    UnexpectedEof {
        part: FramePart,
        expected: usize,
        received: usize,
    },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The body exceeds what the header can describe or the configured limit.
    #[error("body too large ({size} bytes, max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// The body does not hash to the checksum carried in its header.
    #[error("corrupted payload (header checksum {expected:#010x}, body hashes to {actual:#010x})")]
    CorruptedPayload { expected: u32, actual: u32 },

    /// The stream accepted zero bytes during a write.
    #[error("connection closed while writing frame")]
    ConnectionClosed,
}

impl FrameError {
    /// True when the peer closed the stream cleanly between two frames.
    pub fn is_closed_at_boundary(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedEof {
                part: FramePart::Header,
                received: 0,
                ..
            }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
