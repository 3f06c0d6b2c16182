//! Endpoint addressing shared by listeners and connectors.
//!
//! Accepted forms:
//! - `tcp://host:port`
//! - `unix:///path/to/socket`
//! - `127.0.0.1:7000` (a bare socket address is TCP)
//! - `/path/to/socket` (anything else is a Unix socket path)

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Result, TransportError};
use crate::stream::WireStream;
use crate::tcp::TcpTransport;

#[cfg(unix)]
use crate::uds::UnixDomainSocket;

/// Where to listen or connect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `host:port`, resolved at bind/connect time.
    Tcp(String),
    /// Filesystem path of a Unix domain socket.
    Unix(PathBuf),
}

impl FromStr for Endpoint {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(addr) = s.strip_prefix("tcp://") {
            return match addr.rsplit_once(':') {
                Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {
                    Ok(Self::Tcp(addr.to_string()))
                }
                _ => Err(TransportError::InvalidEndpoint(s.to_string())),
            };
        }
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(TransportError::InvalidEndpoint(s.to_string()));
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if s.is_empty() || s.contains("://") {
            return Err(TransportError::InvalidEndpoint(s.to_string()));
        }
        if s.parse::<SocketAddr>().is_ok() {
            return Ok(Self::Tcp(s.to_string()));
        }
        Ok(Self::Unix(PathBuf::from(s)))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "tcp://{addr}"),
            Self::Unix(path) => write!(f, "unix://{}", path.display()),
        }
    }
}

/// A bound listener for any supported endpoint.
pub enum Listener {
    Tcp(TcpTransport),
    #[cfg(unix)]
    Unix(UnixDomainSocket),
}

impl Listener {
    /// Bind and listen on `endpoint`.
    pub fn bind(endpoint: &Endpoint) -> Result<Self> {
        match endpoint {
            Endpoint::Tcp(addr) => Ok(Self::Tcp(TcpTransport::bind(addr.as_str())?)),
            #[cfg(unix)]
            Endpoint::Unix(path) => Ok(Self::Unix(UnixDomainSocket::bind(path)?)),
            #[cfg(not(unix))]
            Endpoint::Unix(_) => Err(TransportError::InvalidEndpoint(endpoint.to_string())),
        }
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<WireStream> {
        match self {
            Self::Tcp(listener) => listener.accept(),
            #[cfg(unix)]
            Self::Unix(listener) => listener.accept(),
        }
    }

    /// The endpoint actually bound (resolves an ephemeral TCP port).
    pub fn local_endpoint(&self) -> Result<Endpoint> {
        match self {
            Self::Tcp(listener) => Ok(Endpoint::Tcp(listener.local_addr()?.to_string())),
            #[cfg(unix)]
            Self::Unix(listener) => Ok(Endpoint::Unix(listener.path().to_path_buf())),
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match self {
            Self::Tcp(listener) => listener.transport_name(),
            #[cfg(unix)]
            Self::Unix(listener) => listener.transport_name(),
        }
    }
}

/// Connect to `endpoint` (blocking).
pub fn connect(endpoint: &Endpoint) -> Result<WireStream> {
    match endpoint {
        Endpoint::Tcp(addr) => TcpTransport::connect(addr.as_str()),
        #[cfg(unix)]
        Endpoint::Unix(path) => UnixDomainSocket::connect(path),
        #[cfg(not(unix))]
        Endpoint::Unix(_) => Err(TransportError::InvalidEndpoint(endpoint.to_string())),
    }
}
