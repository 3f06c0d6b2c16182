use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::stream::WireStream;

/// Unix domain socket transport over a filesystem path.
///
/// The socket file is created with mode `0600` and removed on drop, but only
/// if the path still refers to the socket this listener created.
pub struct UnixDomainSocket {
    listener: UnixListener,
    path: PathBuf,
    /// `(dev, ino)` of the socket file created by `bind`.
    identity: (u64, u64),
}

impl UnixDomainSocket {
    /// Default permission mode for created socket paths.
    pub const DEFAULT_SOCKET_MODE: u32 = 0o600;
    /// `sockaddr_un.sun_path` capacity.
    #[cfg(target_os = "linux")]
    const MAX_PATH_LEN: usize = 108;
    #[cfg(not(target_os = "linux"))]
    const MAX_PATH_LEN: usize = 104;

    /// Bind and listen on `path`, replacing a stale socket file if present.
    pub fn bind(path: impl AsRef<Path>) -> Result<Self> {
        Self::bind_with_mode(path, Self::DEFAULT_SOCKET_MODE)
    }

    /// Bind and listen on `path` with an explicit permission mode.
    pub fn bind_with_mode(path: impl AsRef<Path>, mode: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let len = path.as_os_str().len();
        if len >= Self::MAX_PATH_LEN {
            return Err(TransportError::PathTooLong {
                path,
                len,
                max: Self::MAX_PATH_LEN,
            });
        }

        remove_stale_socket(&path)?;

        let listener = UnixListener::bind(&path).map_err(|e| bind_error(&path, e))?;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| bind_error(&path, e))?;
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| bind_error(&path, e))?;

        info!(?path, "listening on unix domain socket");

        Ok(Self {
            listener,
            path,
            identity: (metadata.dev(), metadata.ino()),
        })
    }

    /// Accept an incoming connection (blocking).
    pub fn accept(&self) -> Result<WireStream> {
        let (stream, _addr) = self.listener.accept().map_err(TransportError::Accept)?;
        debug!(path = ?self.path, "accepted unix connection");
        Ok(WireStream::from_unix(stream))
    }

    /// Connect to a listening Unix domain socket (blocking).
    pub fn connect(path: impl AsRef<Path>) -> Result<WireStream> {
        let path = path.as_ref();
        let stream = UnixStream::connect(path).map_err(|source| TransportError::Connect {
            endpoint: path.display().to_string(),
            source,
        })?;
        debug!(?path, "connected to unix domain socket");
        Ok(WireStream::from_unix(stream))
    }

    /// The path this socket is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Transport name for diagnostics.
    pub fn transport_name(&self) -> &'static str {
        "unix-domain-socket"
    }
}

impl Drop for UnixDomainSocket {
    fn drop(&mut self) {
        let Ok(metadata) = std::fs::symlink_metadata(&self.path) else {
            return;
        };
        let same_socket = metadata.file_type().is_socket()
            && (metadata.dev(), metadata.ino()) == self.identity;
        if same_socket {
            debug!(path = ?self.path, "removing socket file");
            let _ = std::fs::remove_file(&self.path);
        } else {
            debug!(path = ?self.path, "socket path replaced; leaving it in place");
        }
    }
}

fn bind_error(path: &Path, source: std::io::Error) -> TransportError {
    TransportError::Bind {
        endpoint: path.display().to_string(),
        source,
    }
}

/// Remove a leftover socket at `path`; refuse to touch anything else.
fn remove_stale_socket(path: &Path) -> Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(bind_error(path, err)),
    };

    if !metadata.file_type().is_socket() {
        return Err(bind_error(
            path,
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "existing path is not a unix socket",
            ),
        ));
    }

    debug!(?path, "removing stale socket");
    std::fs::remove_file(path).map_err(|e| bind_error(path, e))
}
