use std::io::{ErrorKind, Read};

use bytes::{Bytes, BytesMut};
use smfwire_transport::WireStream;
use tracing::{trace, warn};

use crate::checksum::verify_checksum;
use crate::codec::{FrameConfig, Message};
use crate::error::{FrameError, FramePart, Result};
use crate::header::{Header, HEADER_SIZE};

/// Read exactly 16 bytes from `reader` and decode them (blocking).
///
/// Fails with [`FrameError::UnexpectedEof`] if the stream ends first; a
/// partially received header is never returned.
pub fn read_header<R: Read + ?Sized>(reader: &mut R) -> Result<Header> {
    let mut buf = [0u8; HEADER_SIZE];
    read_full(reader, &mut buf, FramePart::Header)?;
    Header::decode(&buf)
}

/// Read one header and the `size` body bytes that follow it (blocking).
///
/// The checksum is not verified and the body length is not bounded: the
/// body buffer is allocated from the header's `size` before any body byte
/// arrives. Read from untrusted peers through [`MessageReader`], which checks
/// `max_body_size` first and can verify the checksum.
pub fn read_message<R: Read + ?Sized>(reader: &mut R) -> Result<Message> {
    let header = read_header(reader)?;
    let body = read_body(reader, header.body_len())?;
    Ok(Message::from_wire(header, body))
}

fn read_body<R: Read + ?Sized>(reader: &mut R, len: usize) -> Result<Bytes> {
    let mut body = BytesMut::zeroed(len);
    read_full(reader, &mut body, FramePart::Body)?;
    Ok(body.freeze())
}

/// Fill `buf` completely, retrying on `Interrupted`.
fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8], part: FramePart) -> Result<()> {
    let mut filled = 0usize;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(FrameError::UnexpectedEof {
                    part,
                    expected: buf.len(),
                    received: filled,
                })
            }
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

/// Reads complete messages from any `Read` stream.
///
/// Unlike [`read_message`], the reader enforces `max_body_size` before
/// allocating and, when configured, checks the body checksum.
pub struct MessageReader<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Read> MessageReader<T> {
    /// Create a new message reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Read the next header without touching the body.
    ///
    /// The caller must consume exactly `header.size()` body bytes from
    /// [`get_mut`](Self::get_mut) before reading another header.
    pub fn read_header(&mut self) -> Result<Header> {
        read_header(&mut self.inner)
    }

    /// Read the next complete message (blocking).
    pub fn read_message(&mut self) -> Result<Message> {
        let header = read_header(&mut self.inner)?;

        let body_len = header.body_len();
        if body_len > self.config.max_body_size {
            return Err(FrameError::BodyTooLarge {
                size: body_len,
                max: self.config.max_body_size,
            });
        }

        let body = read_body(&mut self.inner, body_len)?;

        if self.config.verify_checksum {
            if let Err(err) = verify_checksum(&header, &body) {
                warn!(session = header.session(), meta = header.meta(), %err, "checksum mismatch");
                return Err(err);
            }
        }

        trace!(
            session = header.session(),
            size = header.size(),
            meta = header.meta(),
            "read message"
        );
        Ok(Message::from_wire(header, body))
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum body size for subsequent reads.
    pub fn set_max_body_size(&mut self, max_body_size: usize) {
        self.config.max_body_size = max_body_size;
    }

    /// Current reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl MessageReader<WireStream> {
    /// Create a message reader for `WireStream` and apply read timeout from config.
    pub fn with_config_stream(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_read_timeout(config.read_timeout)
            .map_err(crate::writer::transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}
