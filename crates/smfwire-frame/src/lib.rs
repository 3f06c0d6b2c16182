//! Fixed-header message framing for request/response RPC streams.
//!
//! Every message on the wire is a 16-byte header followed by the body:
//!
//! ```text
//! offset  0   1   2       4           8           12          16
//!         ┌───┬───┬───────┬───────────┬───────────┬───────────┬──────────────┐
//!         │cmp│flg│session│   size    │ checksum  │   meta    │ body (size B)│
//!         │i8 │i8 │u16 LE │  u32 LE   │  u32 LE   │  u32 LE   │              │
//!         └───┴───┴───────┴───────────┴───────────┴───────────┴──────────────┘
//! ```
//!
//! `checksum` is the low 32 bits of XXH64 over the body. Verification is
//! opt-in on the receiving side.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub mod tokio_codec;

pub use checksum::{checksum, verify_checksum};
pub use codec::{
    build_header, decode_message, encode_message, FrameConfig, Message, DEFAULT_MAX_BODY,
};
pub use error::{FrameError, FramePart, Result};
pub use header::{Header, HEADER_SIZE};
pub use reader::{read_header, read_message, MessageReader};
pub use writer::{write_message, MessageWriter};

#[cfg(feature = "async")]
pub use tokio_codec::SmfCodec;
