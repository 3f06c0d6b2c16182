use std::io::{Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use crate::error::Result;

/// A connected byte stream; implements Read + Write.
///
/// This is the I/O type returned by every transport in this crate.
/// It wraps either a TCP stream or, on Unix, a Unix domain socket stream.
pub struct WireStream {
    inner: WireStreamInner,
}

enum WireStreamInner {
    Tcp(TcpStream),
    #[cfg(unix)]
    Unix(std::os::unix::net::UnixStream),
}

impl Read for WireStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.read(buf),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.read(buf),
        }
    }
}

impl Write for WireStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.write(buf),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            WireStreamInner::Tcp(stream) => stream.flush(),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.flush(),
        }
    }
}

impl WireStream {
    pub(crate) fn from_tcp(stream: TcpStream) -> Self {
        Self {
            inner: WireStreamInner::Tcp(stream),
        }
    }

    #[cfg(unix)]
    pub(crate) fn from_unix(stream: std::os::unix::net::UnixStream) -> Self {
        Self {
            inner: WireStreamInner::Unix(stream),
        }
    }

    /// Set read timeout on the underlying stream.
    pub fn set_read_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_read_timeout(timeout).map_err(Into::into),
        }
    }

    /// Set write timeout on the underlying stream.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream.set_write_timeout(timeout).map_err(Into::into),
        }
    }

    /// Try to clone this stream (creates a new file descriptor).
    ///
    /// Useful for giving the read half and the write half to different threads.
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => Ok(Self::from_tcp(stream.try_clone()?)),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => Ok(Self::from_unix(stream.try_clone()?)),
        }
    }

    /// Shut down both halves of the connection.
    ///
    /// Call this after a failed write: the peer can no longer find frame
    /// boundaries on this stream.
    pub fn shutdown(&self) -> Result<()> {
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream
                .shutdown(std::net::Shutdown::Both)
                .map_err(Into::into),
            #[cfg(unix)]
            WireStreamInner::Unix(stream) => stream
                .shutdown(std::net::Shutdown::Both)
                .map_err(Into::into),
        }
    }

    /// Human-readable description of the remote end, for logs and output.
    pub fn peer_label(&self) -> String {
        match &self.inner {
            WireStreamInner::Tcp(stream) => stream
                .peer_addr()
                .map(|addr| format!("tcp://{addr}"))
                .unwrap_or_else(|_| "tcp://unknown".to_string()),
            #[cfg(unix)]
            WireStreamInner::Unix(_) => match self.peer_credentials() {
                Some((_, _, pid)) => format!("unix:pid-{pid}"),
                None => "unix".to_string(),
            },
        }
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        match &self.inner {
            WireStreamInner::Tcp(_) => "tcp",
            #[cfg(unix)]
            WireStreamInner::Unix(_) => "unix-domain-socket",
        }
    }

    /// Get the credentials of the connected peer (Linux Unix sockets only).
    ///
    /// Returns `(uid, gid, pid)` via `SO_PEERCRED`, or `None` if unavailable.
    #[cfg(target_os = "linux")]
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        use std::os::fd::AsRawFd;

        let fd = match &self.inner {
            WireStreamInner::Unix(stream) => stream.as_raw_fd(),
            WireStreamInner::Tcp(_) => return None,
        };

        let mut cred = libc::ucred {
            pid: 0,
            uid: 0,
            gid: 0,
        };
        let mut len = std::mem::size_of::<libc::ucred>() as libc::socklen_t;

        // SAFETY: `cred` and `len` are valid writable pointers for the provided sizes,
        // and `fd` is an open Unix socket descriptor owned by this process.
        let rc = unsafe {
            libc::getsockopt(
                fd,
                libc::SOL_SOCKET,
                libc::SO_PEERCRED,
                (&mut cred as *mut libc::ucred).cast::<libc::c_void>(),
                &mut len,
            )
        };

        if rc == 0 && len as usize == std::mem::size_of::<libc::ucred>() {
            Some((cred.uid, cred.gid, cred.pid as u32))
        } else {
            None
        }
    }

    /// Get the credentials of the connected peer.
    ///
    /// Returns `None` on platforms that do not expose peer credentials.
    #[cfg(not(target_os = "linux"))]
    pub fn peer_credentials(&self) -> Option<(u32, u32, u32)> {
        None
    }
}

impl std::fmt::Debug for WireStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WireStream")
            .field("type", &self.transport_name())
            .finish()
    }
}
