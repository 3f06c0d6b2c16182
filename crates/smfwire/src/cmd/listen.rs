use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use smfwire_frame::{FrameConfig, FrameError, MessageReader};
use smfwire_transport::Listener;

use crate::cmd::ListenArgs;
use crate::exit::{frame_error, transport_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, OutputFormat};

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let listener =
        Listener::bind(&args.endpoint).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = FrameConfig {
        verify_checksum: args.verify,
        ..FrameConfig::default()
    };
    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        let peer = stream.peer_label();
        let mut reader = MessageReader::with_config(stream, config.clone());

        while running.load(Ordering::SeqCst) {
            let message = match reader.read_message() {
                Ok(message) => message,
                Err(err) => match classify_recv_error(err) {
                    RecvDisposition::NextConnection => break,
                    RecvDisposition::Fatal(err) => return Err(err),
                },
            };

            if let Some(sessions) = &args.sessions {
                if !sessions.contains(&message.session()) {
                    continue;
                }
            }

            print_message(&message, &peer, format);
            printed = printed.saturating_add(1);

            if let Some(count) = args.count {
                if printed >= count {
                    return Ok(SUCCESS);
                }
            }
        }
    }

    Ok(SUCCESS)
}

pub(crate) enum RecvDisposition {
    NextConnection,
    Fatal(CliError),
}

/// Decide whether a read failure ends this connection or the whole command.
///
/// A clean close, a truncated frame and a corrupted body all poison only the
/// current connection.
pub(crate) fn classify_recv_error(err: FrameError) -> RecvDisposition {
    match err {
        err if err.is_closed_at_boundary() => {
            tracing::debug!("peer disconnected");
            RecvDisposition::NextConnection
        }
        FrameError::UnexpectedEof { .. }
        | FrameError::CorruptedPayload { .. }
        | FrameError::BodyTooLarge { .. }
        | FrameError::ConnectionClosed => {
            tracing::warn!(error = %err, "dropping connection");
            RecvDisposition::NextConnection
        }
        FrameError::Io(ref io)
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe
            ) =>
        {
            tracing::warn!(error = %err, "connection reset");
            RecvDisposition::NextConnection
        }
        other => RecvDisposition::Fatal(frame_error("receive failed", other)),
    }
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        // A blocked accept never re-checks the flag; a second signal exits.
        if !running.swap(false, Ordering::SeqCst) {
            std::process::exit(130);
        }
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smfwire_frame::FramePart;

    #[test]
    fn clean_close_moves_to_next_connection() {
        let err = FrameError::UnexpectedEof {
            part: FramePart::Header,
            expected: 16,
            received: 0,
        };
        assert!(matches!(
            classify_recv_error(err),
            RecvDisposition::NextConnection
        ));
    }

    #[test]
    fn corrupted_payload_drops_connection() {
        let err = FrameError::CorruptedPayload {
            expected: 1,
            actual: 2,
        };
        assert!(matches!(
            classify_recv_error(err),
            RecvDisposition::NextConnection
        ));
    }

    #[test]
    fn unexpected_io_error_is_fatal() {
        let err = FrameError::Io(std::io::Error::from(std::io::ErrorKind::PermissionDenied));
        assert!(matches!(classify_recv_error(err), RecvDisposition::Fatal(_)));
    }
}
