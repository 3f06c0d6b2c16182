use std::io::{ErrorKind, Write};

use smfwire_transport::{TransportError, WireStream};
use tracing::trace;

use crate::codec::{FrameConfig, Message};
use crate::error::{FrameError, Result};
use crate::header::Header;

/// Write one message to `writer`: the 16-byte header, then the body.
///
/// On success the stream has advanced by exactly `16 + body.len()` bytes.
/// Any error after the header went out leaves the stream mid-frame; the
/// connection must be torn down.
pub fn write_message<W: Write + ?Sized>(
    writer: &mut W,
    session: u16,
    body: &[u8],
    meta: u32,
) -> Result<()> {
    let header = Header::for_body(session, body, meta)?;
    write_frame(writer, &header, body)
}

fn write_frame<W: Write + ?Sized>(writer: &mut W, header: &Header, body: &[u8]) -> Result<()> {
    write_fully(writer, &header.encode())?;
    write_fully(writer, body)?;
    flush(writer)?;

    trace!(
        session = header.session(),
        size = header.size(),
        meta = header.meta(),
        "wrote message"
    );
    Ok(())
}

/// Write all of `buf`, retrying on `Interrupted`.
fn write_fully<W: Write + ?Sized>(writer: &mut W, mut buf: &[u8]) -> Result<()> {
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => buf = &buf[n..],
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
    Ok(())
}

fn flush<W: Write + ?Sized>(writer: &mut W) -> Result<()> {
    loop {
        match writer.flush() {
            Ok(()) => return Ok(()),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(FrameError::Io(err)),
        }
    }
}

/// Writes complete messages to any `Write` stream.
pub struct MessageWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Write> MessageWriter<T> {
    /// Create a new message writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new message writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Build a standard header for `body` and send header + body (blocking).
    pub fn send(&mut self, session: u16, body: &[u8], meta: u32) -> Result<()> {
        self.check_body_size(body.len())?;
        write_message(&mut self.inner, session, body, meta)
    }

    /// Send an already-built message (blocking).
    pub fn write_message(&mut self, message: &Message) -> Result<()> {
        self.check_body_size(message.body().len())?;
        write_frame(&mut self.inner, message.header(), message.body())
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        flush(&mut self.inner)
    }

    fn check_body_size(&self, size: usize) -> Result<()> {
        if size > self.config.max_body_size {
            return Err(FrameError::BodyTooLarge {
                size,
                max: self.config.max_body_size,
            });
        }
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Update maximum body size for subsequent writes.
    pub fn set_max_body_size(&mut self, max_body_size: usize) {
        self.config.max_body_size = max_body_size;
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl MessageWriter<WireStream> {
    /// Create a message writer for `WireStream` and apply write timeout from config.
    pub fn with_config_stream(inner: WireStream, config: FrameConfig) -> Result<Self> {
        inner
            .set_write_timeout(config.write_timeout)
            .map_err(transport_to_frame_error)?;
        Ok(Self::with_config(inner, config))
    }
}

pub(crate) fn transport_to_frame_error(err: TransportError) -> FrameError {
    match err {
        TransportError::Io(io) | TransportError::Accept(io) => FrameError::Io(io),
        TransportError::Bind { source, .. } | TransportError::Connect { source, .. } => {
            FrameError::Io(source)
        }
        other => FrameError::Io(std::io::Error::other(other.to_string())),
    }
}
