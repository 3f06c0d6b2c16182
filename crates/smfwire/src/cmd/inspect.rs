use smfwire_frame::Header;

use crate::cmd::InspectArgs;
use crate::exit::{frame_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_header, OutputFormat};

pub fn run(args: InspectArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex(&args.hex)?;
    let header = Header::decode(&bytes).map_err(|err| frame_error("decode failed", err))?;
    if bytes.len() > smfwire_frame::HEADER_SIZE {
        tracing::debug!(
            extra = bytes.len() - smfwire_frame::HEADER_SIZE,
            "ignoring bytes past the header"
        );
    }
    print_header(&header, format);
    Ok(SUCCESS)
}

fn parse_hex(input: &str) -> CliResult<Vec<u8>> {
    let trimmed = input.trim();
    let trimmed = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = trimmed
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && *c != ':')
        .collect();

    hex::decode(&digits).map_err(|err| CliError::new(USAGE, format!("invalid hex input: {err}")))
}
