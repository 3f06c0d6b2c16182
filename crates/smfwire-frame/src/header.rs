use std::fmt;

use bytes::{Buf, BufMut};

use crate::error::{FrameError, Result};

/// Wire size of a header: compression (1) + bitflags (1) + session (2)
/// + size (4) + checksum (4) + meta (4).
pub const HEADER_SIZE: usize = 16;

/// The fixed 16-byte header that precedes every message body.
///
/// A header is built once per outgoing message (or decoded once per incoming
/// one) and never modified afterwards, so the fields are only exposed through
/// accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Header {
    compression: i8,
    bitflags: i8,
    session: u16,
    size: u32,
    checksum: u32,
    meta: u32,
}

impl Header {
    /// Create a header from all six field values.
    pub const fn new(
        compression: i8,
        bitflags: i8,
        session: u16,
        size: u32,
        checksum: u32,
        meta: u32,
    ) -> Self {
        Self {
            compression,
            bitflags,
            session,
            size,
            checksum,
            meta,
        }
    }

    /// Compression codec applied to the body; 0 means none.
    pub const fn compression(&self) -> i8 {
        self.compression
    }

    /// Reserved protocol flags.
    pub const fn bitflags(&self) -> i8 {
        self.bitflags
    }

    /// Request/response correlation id.
    pub const fn session(&self) -> u16 {
        self.session
    }

    /// Exact length of the body that follows the header.
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Low 32 bits of XXH64 over the body.
    pub const fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Caller-defined metadata, typically a method id.
    pub const fn meta(&self) -> u32 {
        self.meta
    }

    /// Body length as a `usize`.
    pub fn body_len(&self) -> usize {
        self.size as usize
    }

    /// Serialize into the 16-byte little-endian wire layout.
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        self.encode_into(&mut &mut out[..]);
        out
    }

    /// Append the 16-byte wire layout to `dst`.
    pub fn encode_into<B: BufMut>(&self, dst: &mut B) {
        dst.put_i8(self.compression);
        dst.put_i8(self.bitflags);
        dst.put_u16_le(self.session);
        dst.put_u32_le(self.size);
        dst.put_u32_le(self.checksum);
        dst.put_u32_le(self.meta);
    }

    /// Parse a header from the first 16 bytes of `src`.
    ///
    /// Bytes past the 16th are ignored. Fails with
    /// [`FrameError::MalformedHeader`] when fewer than 16 are supplied.
    pub fn decode(src: &[u8]) -> Result<Self> {
        if src.len() < HEADER_SIZE {
            return Err(FrameError::MalformedHeader { len: src.len() });
        }

        let mut buf = &src[..HEADER_SIZE];
        Ok(Self {
            compression: buf.get_i8(),
            bitflags: buf.get_i8(),
            session: buf.get_u16_le(),
            size: buf.get_u32_le(),
            checksum: buf.get_u32_le(),
            meta: buf.get_u32_le(),
        })
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ compression={}, bitflags={}, session={}, size={}, checksum={}, meta={} ]",
            self.compression, self.bitflags, self.session, self.size, self.checksum, self.meta
        )
    }
}
