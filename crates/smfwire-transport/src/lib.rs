//! Blocking byte-stream transports for smfwire.
//!
//! Provides the reliable, ordered byte stream the framing layer runs over:
//! - TCP (all platforms)
//! - Unix domain sockets (Linux/macOS)
//!
//! Everything above this crate only sees [`WireStream`], which implements
//! `Read + Write`.

pub mod endpoint;
pub mod error;
pub mod stream;
pub mod tcp;

#[cfg(unix)]
pub mod uds;

pub use endpoint::{connect, Endpoint, Listener};
pub use error::{Result, TransportError};
pub use stream::WireStream;
pub use tcp::TcpTransport;

#[cfg(unix)]
pub use uds::UnixDomainSocket;
