use std::fs;

use smfwire_frame::{FrameConfig, MessageReader, MessageWriter};
use smfwire_transport::connect;

use crate::cmd::{parse_duration, SendArgs};
use crate::exit::{frame_error, io_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;
    let body = resolve_body(&args)?;

    let stream =
        connect(&args.endpoint).map_err(|err| transport_error("connect failed", err))?;
    let peer = stream.peer_label();
    let read_half = stream
        .try_clone()
        .map_err(|err| transport_error("connect failed", err))?;

    let mut writer = MessageWriter::new(stream);
    writer
        .send(args.session, &body, args.meta)
        .map_err(|err| frame_error("send failed", err))?;
    tracing::debug!(
        session = args.session,
        meta = args.meta,
        size = body.len(),
        endpoint = %args.endpoint,
        "message sent"
    );

    if args.wait {
        let config = FrameConfig {
            verify_checksum: true,
            read_timeout: Some(wait_timeout),
            ..FrameConfig::default()
        };
        let mut reader = MessageReader::with_config_stream(read_half, config)
            .map_err(|err| frame_error("receive failed", err))?;
        let reply = reader
            .read_message()
            .map_err(|err| frame_error("receive failed", err))?;
        if reply.session() != args.session {
            tracing::warn!(
                expected = args.session,
                received = reply.session(),
                "reply carries a different session"
            );
        }
        print_message(&reply, &peer, format);
    }

    Ok(SUCCESS)
}

fn resolve_body(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(json) = &args.json {
        serde_json::from_str::<serde_json::Value>(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return Ok(json.as_bytes().to_vec());
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}
