//! `tokio_util::codec` adapter for async streams.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{decode_message, FrameConfig, Message};
use crate::error::FrameError;

/// Decodes and encodes [`Message`]s on a `Framed` async stream.
#[derive(Debug, Clone)]
pub struct SmfCodec {
    config: FrameConfig,
}

impl SmfCodec {
    pub fn new() -> Self {
        Self::with_config(FrameConfig::default())
    }

    /// Honours `max_body_size` and `verify_checksum`; timeouts are ignored.
    pub fn with_config(config: FrameConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl Default for SmfCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for SmfCodec {
    type Item = Message;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, FrameError> {
        let Some(message) = decode_message(src, self.config.max_body_size)? else {
            return Ok(None);
        };
        if self.config.verify_checksum {
            message.verify_checksum()?;
        }
        Ok(Some(message))
    }
}

impl Encoder<Message> for SmfCodec {
    type Error = FrameError;

    fn encode(&mut self, item: Message, dst: &mut BytesMut) -> Result<(), FrameError> {
        if item.body().len() > self.config.max_body_size {
            return Err(FrameError::BodyTooLarge {
                size: item.body().len(),
                max: self.config.max_body_size,
            });
        }
        item.encode_into(dst);
        Ok(())
    }
}
