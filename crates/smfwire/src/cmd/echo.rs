use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use smfwire_frame::{FrameConfig, Message, MessageReader, MessageWriter};
use smfwire_transport::{Listener, WireStream};

use crate::cmd::listen::{classify_recv_error, install_ctrlc_handler, RecvDisposition};
use crate::cmd::EchoArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};

pub fn run(args: EchoArgs) -> CliResult<i32> {
    let listener =
        Listener::bind(&args.endpoint).map_err(|err| transport_error("bind failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let config = FrameConfig {
        verify_checksum: args.verify,
        ..FrameConfig::default()
    };

    while running.load(Ordering::SeqCst) {
        let stream = listener
            .accept()
            .map_err(|err| transport_error("accept failed", err))?;
        serve_connection(stream, &config, &running)?;
    }

    Ok(SUCCESS)
}

fn serve_connection(
    stream: WireStream,
    config: &FrameConfig,
    running: &AtomicBool,
) -> CliResult<()> {
    let peer = stream.peer_label();
    let read_half = stream
        .try_clone()
        .map_err(|err| transport_error("accept failed", err))?;
    let mut reader = MessageReader::with_config(read_half, config.clone());
    let mut writer = MessageWriter::with_config(stream, config.clone());

    while running.load(Ordering::SeqCst) {
        let message = match reader.read_message() {
            Ok(message) => message,
            Err(err) => match classify_recv_error(err) {
                RecvDisposition::NextConnection => return Ok(()),
                RecvDisposition::Fatal(err) => return Err(err),
            },
        };

        tracing::info!(
            peer = %peer,
            session = message.session(),
            meta = message.meta(),
            size = message.body().len(),
            "echoing message"
        );

        let sent = echo_reply(&message).and_then(|reply| writer.write_message(&reply));
        if let Err(err) = sent {
            // The peer can no longer find frame boundaries on this stream.
            tracing::warn!(peer = %peer, error = %err, "echo write failed; closing connection");
            let _ = writer.get_ref().shutdown();
            return Ok(());
        }
    }

    Ok(())
}

/// Standard-header reply carrying the request's session, meta and body.
fn echo_reply(request: &Message) -> smfwire_frame::Result<Message> {
    Message::new(request.session(), request.body().clone(), request.meta())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_preserves_session_meta_and_body() {
        let request = Message::new(9, &b"ping"[..], 77).unwrap();
        let reply = echo_reply(&request).unwrap();

        assert_eq!(reply.session(), 9);
        assert_eq!(reply.meta(), 77);
        assert_eq!(reply.body(), request.body());
        assert!(reply.verify_checksum().is_ok());
    }

    #[test]
    fn reply_uses_standard_header_path() {
        let mut wire = bytes::BytesMut::new();
        smfwire_frame::Header::new(3, 1, 2, 2, smfwire_frame::checksum(b"hi"), 5)
            .encode_into(&mut wire);
        wire.extend_from_slice(b"hi");
        let request = smfwire_frame::decode_message(&mut wire, 1024)
            .unwrap()
            .unwrap();

        let reply = echo_reply(&request).unwrap();
        assert_eq!(reply.header().compression(), 0);
        assert_eq!(reply.header().bitflags(), 0);
        assert_eq!(reply.header().checksum(), request.header().checksum());
    }
}
