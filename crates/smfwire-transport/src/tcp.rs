use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::WireStream;

/// TCP transport.
///
/// Every stream handed out has `TCP_NODELAY` set: a frame is written as a
/// header followed by a body, and neither half should sit in Nagle's buffer.
pub struct TcpTransport {
    listener: TcpListener,
    addr: SocketAddr,
}

impl TcpTransport {
    /// Bind and listen on a TCP address. Port `0` picks an ephemeral port.
    pub fn bind(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<Self> {
        let endpoint = addr.to_string();
        let listener = TcpListener::bind(&addr).map_err(|source| TransportError::Bind {
            endpoint: endpoint.clone(),
            source,
        })?;
        let addr = listener
            .local_addr()
            .map_err(|source| TransportError::Bind { endpoint, source })?;

        info!(%addr, "listening on tcp");

        Ok(Self { listener, addr })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<WireStream> {
        let (stream, peer) = self.listener.accept().map_err(TransportError::Accept)?;
        stream.set_nodelay(true).map_err(TransportError::Accept)?;
        debug!(%peer, "accepted tcp connection");
        Ok(WireStream::from_tcp(stream))
    }

    /// Connect to a listening TCP address (blocking).
    pub fn connect(addr: impl ToSocketAddrs + std::fmt::Display) -> Result<WireStream> {
        let endpoint = addr.to_string();
        let stream = TcpStream::connect(&addr).map_err(|source| TransportError::Connect {
            endpoint: endpoint.clone(),
            source,
        })?;
        stream
            .set_nodelay(true)
            .map_err(|source| TransportError::Connect { endpoint, source })?;
        debug!(%addr, "connected over tcp");
        Ok(WireStream::from_tcp(stream))
    }

    /// The address this listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.addr)
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "tcp"
    }
}
