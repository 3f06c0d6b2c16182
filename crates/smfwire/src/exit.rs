use std::fmt;
use std::io;

use smfwire_frame::FrameError;
use smfwire_transport::TransportError;

// Process exit codes.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::ConnectionRefused | io::ErrorKind::NotFound => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Bind { source, .. }
        | TransportError::Connect { source, .. }
        | TransportError::Accept(source)
        | TransportError::Io(source) => io_error(context, source),
        TransportError::InvalidEndpoint(_) => CliError::new(USAGE, format!("{context}: {err}")),
        other => CliError::new(TRANSPORT_ERROR, format!("{context}: {other}")),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::MalformedHeader { .. }
        | FrameError::BodyTooLarge { .. }
        | FrameError::CorruptedPayload { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::UnexpectedEof { .. } | FrameError::ConnectionClosed => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_124() {
        let err = io_error("read", io::Error::from(io::ErrorKind::WouldBlock));
        assert_eq!(err.code, TIMEOUT);
        let err = frame_error("read", FrameError::Io(io::Error::from(io::ErrorKind::TimedOut)));
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn corrupted_payload_is_data_invalid() {
        let err = frame_error(
            "receive failed",
            FrameError::CorruptedPayload {
                expected: 1,
                actual: 2,
            },
        );
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.starts_with("receive failed: corrupted payload"));
    }

    #[test]
    fn truncated_stream_is_failure() {
        let err = frame_error(
            "receive failed",
            FrameError::UnexpectedEof {
                part: smfwire_frame::FramePart::Body,
                expected: 4,
                received: 1,
            },
        );
        assert_eq!(err.code, FAILURE);
    }

    #[test]
    fn invalid_endpoint_is_usage() {
        let err = transport_error("bind failed", TransportError::InvalidEndpoint("x".into()));
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn path_too_long_is_transport_error() {
        let err = transport_error(
            "bind failed",
            TransportError::PathTooLong {
                path: "/tmp/x".into(),
                len: 200,
                max: 108,
            },
        );
        assert_eq!(err.code, TRANSPORT_ERROR);
    }
}
