//! Fixed-header RPC message framing.
//!
//! smfwire frames request/response messages with a 16-byte header carrying
//! session, body size, body checksum and caller metadata.
//!
//! # Crate Structure
//!
//! - [`transport`]: Blocking byte streams (TCP, Unix domain sockets)
//! - [`frame`]: Header codec, checksum and message reader/writer

/// Re-export transport types.
pub mod transport {
    pub use smfwire_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use smfwire_frame::*;
}
