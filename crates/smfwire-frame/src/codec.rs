use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::checksum::{checksum, verify_checksum};
use crate::error::{FrameError, Result};
use crate::header::{Header, HEADER_SIZE};

/// Default maximum body size accepted by readers and writers: 16 MiB.
pub const DEFAULT_MAX_BODY: usize = 16 * 1024 * 1024;

/// Largest body a header can describe.
const MAX_WIRE_BODY: usize = u32::MAX as usize;

impl Header {
    /// Standard header for an outgoing body.
    ///
    /// `size` and `checksum` are derived from `body`. Compression and
    /// bitflags are not wired up for callers yet and are always zero.
    pub fn for_body(session: u16, body: &[u8], meta: u32) -> Result<Self> {
        let size = u32::try_from(body.len()).map_err(|_| FrameError::BodyTooLarge {
            size: body.len(),
            max: MAX_WIRE_BODY,
        })?;
        Ok(Header::new(0, 0, session, size, checksum(body), meta))
    }
}

/// Build the encoded header for `body`.
///
/// Fails only when `body` is longer than `u32::MAX` bytes.
pub fn build_header(session: u16, body: &[u8], meta: u32) -> Result<[u8; HEADER_SIZE]> {
    Ok(Header::for_body(session, body, meta)?.encode())
}

/// A header together with the body it describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    header: Header,
    body: Bytes,
}

impl Message {
    /// Create an outgoing message with a standard header.
    pub fn new(session: u16, body: impl Into<Bytes>, meta: u32) -> Result<Self> {
        let body = body.into();
        let header = Header::for_body(session, &body, meta)?;
        Ok(Self { header, body })
    }

    /// Pair a decoded header with the body read after it.
    pub(crate) fn from_wire(header: Header, body: Bytes) -> Self {
        Self { header, body }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn session(&self) -> u16 {
        self.header.session()
    }

    pub fn meta(&self) -> u32 {
        self.header.meta()
    }

    /// Split into header and body.
    pub fn into_parts(self) -> (Header, Bytes) {
        (self.header, self.body)
    }

    /// The total wire size of this message (header + body).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.body.len()
    }

    /// Check the body against the header checksum.
    pub fn verify_checksum(&self) -> Result<()> {
        verify_checksum(&self.header, &self.body)
    }

    /// Append header and body to `dst`.
    pub fn encode_into(&self, dst: &mut BytesMut) {
        dst.reserve(self.wire_size());
        self.header.encode_into(dst);
        dst.put_slice(&self.body);
    }
}

/// Encode a message (header + body) into `dst`.
pub fn encode_message(session: u16, body: &[u8], meta: u32, dst: &mut BytesMut) -> Result<()> {
    let header = Header::for_body(session, body, meta)?;
    dst.reserve(HEADER_SIZE + body.len());
    header.encode_into(dst);
    dst.put_slice(body);
    Ok(())
}

/// Decode a message from a buffer.
///
/// Returns `Ok(None)` until the buffer holds a complete header and body.
/// On success, consumes the message bytes from the buffer. The checksum is
/// not verified here.
pub fn decode_message(src: &mut BytesMut, max_body: usize) -> Result<Option<Message>> {
    if src.len() < HEADER_SIZE {
        return Ok(None);
    }

    let header = Header::decode(&src[..HEADER_SIZE])?;
    let body_len = header.body_len();
    if body_len > max_body {
        return Err(FrameError::BodyTooLarge {
            size: body_len,
            max: max_body,
        });
    }

    let total = HEADER_SIZE + body_len;
    if src.len() < total {
        src.reserve(total - src.len());
        return Ok(None);
    }

    src.advance(HEADER_SIZE);
    let body = src.split_to(body_len).freeze();

    Ok(Some(Message::from_wire(header, body)))
}

/// Configuration for message readers and writers.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum body size in bytes. Default: 16 MiB.
    pub max_body_size: usize,
    /// Reject bodies whose checksum does not match. Default: off.
    pub verify_checksum: bool,
    /// Read timeout for blocking operations.
    pub read_timeout: Option<std::time::Duration>,
    /// Write timeout for blocking operations.
    pub write_timeout: Option<std::time::Duration>,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_body_size: DEFAULT_MAX_BODY,
            verify_checksum: false,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_build_header_example() {
        let wire = build_header(7, &[0x41, 0x42, 0x43], 42).unwrap();
        let header = Header::decode(&wire).unwrap();

        assert_eq!(header, Header::new(0, 0, 7, 3, 0x4FCF_EE98, 42));
        assert_eq!(header.checksum(), checksum(b"ABC"));
    }

    #[test]
    fn test_build_header_empty_body() {
        let header = Header::decode(&build_header(1, &[], 2).unwrap()).unwrap();
        assert_eq!(header.size(), 0);
        assert_eq!(header.checksum(), 0x51D8_E999);
        assert_eq!(header.compression(), 0);
        assert_eq!(header.bitflags(), 0);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let body = b"hello, smfwire!";

        encode_message(11, body, 0xDEAD_BEEF, &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE + body.len());

        let message = decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().unwrap();

        assert_eq!(message.session(), 11);
        assert_eq!(message.meta(), 0xDEAD_BEEF);
        assert_eq!(message.body().as_ref(), body);
        assert!(message.verify_checksum().is_ok());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[0u8; HEADER_SIZE - 1][..]);
        assert!(decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().is_none());
        assert_eq!(buf.len(), HEADER_SIZE - 1);
    }

    #[test]
    fn test_decode_incomplete_body() {
        let mut buf = BytesMut::new();
        encode_message(1, b"hello", 0, &mut buf).unwrap();
        buf.truncate(HEADER_SIZE + 2);

        assert!(decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().is_none());
        assert_eq!(buf.len(), HEADER_SIZE + 2);
    }

    #[test]
    fn test_decode_body_too_large() {
        let mut buf = BytesMut::new();
        Header::new(0, 0, 1, 32 * 1024 * 1024, 0, 0).encode_into(&mut buf);

        let result = decode_message(&mut buf, DEFAULT_MAX_BODY);
        assert!(matches!(result, Err(FrameError::BodyTooLarge { .. })));
    }

    #[test]
    fn test_decode_does_not_verify_checksum() {
        let mut buf = BytesMut::new();
        Header::new(0, 0, 1, 3, 0, 0).encode_into(&mut buf);
        buf.put_slice(b"ABC");

        let message = decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().unwrap();
        assert!(matches!(
            message.verify_checksum(),
            Err(FrameError::CorruptedPayload { .. })
        ));
    }

    #[test]
    fn test_multiple_messages_fifo() {
        let mut buf = BytesMut::new();
        encode_message(1, b"first", 10, &mut buf).unwrap();
        encode_message(2, b"second", 20, &mut buf).unwrap();

        let m1 = decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().unwrap();
        let m2 = decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().unwrap();

        assert_eq!((m1.session(), m1.meta(), m1.body().as_ref()), (1, 10, b"first".as_ref()));
        assert_eq!((m2.session(), m2.meta(), m2.body().as_ref()), (2, 20, b"second".as_ref()));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_empty_body() {
        let mut buf = BytesMut::new();
        encode_message(0, b"", 0, &mut buf).unwrap();
        assert_eq!(buf.len(), HEADER_SIZE);

        let message = decode_message(&mut buf, DEFAULT_MAX_BODY).unwrap().unwrap();
        assert!(message.body().is_empty());
        assert_eq!(message.wire_size(), HEADER_SIZE);
    }

    #[test]
    fn test_message_encode_into_matches_encode_message() {
        let message = Message::new(5, &b"same bytes"[..], 6).unwrap();
        let mut via_message = BytesMut::new();
        message.encode_into(&mut via_message);

        let mut via_fn = BytesMut::new();
        encode_message(5, b"same bytes", 6, &mut via_fn).unwrap();

        assert_eq!(via_message, via_fn);
        assert_eq!(message.wire_size(), via_fn.len());
    }

    #[test]
    fn test_into_parts() {
        let message = Message::new(3, b"abc".to_vec(), 4).unwrap();
        let (header, body) = message.into_parts();
        assert_eq!(header.size(), 3);
        assert_eq!(body.as_ref(), b"abc");
    }

    proptest! {
        #[test]
        fn build_header_describes_body(
            session in any::<u16>(),
            body in any::<Vec<u8>>(),
            meta in any::<u32>(),
        ) {
            let wire = build_header(session, &body, meta).expect("small body should fit");
            prop_assert_eq!(wire.len(), HEADER_SIZE);

            let header = Header::decode(&wire).expect("16 bytes should decode");
            prop_assert_eq!(header.compression(), 0);
            prop_assert_eq!(header.bitflags(), 0);
            prop_assert_eq!(header.session(), session);
            prop_assert_eq!(header.body_len(), body.len());
            prop_assert_eq!(header.checksum(), checksum(&body));
            prop_assert_eq!(header.meta(), meta);
        }
    }
}
