use std::io::Read;

use crate::cmd::ChecksumArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::{print_checksum, OutputFormat};

pub fn run(args: ChecksumArgs, format: OutputFormat) -> CliResult<i32> {
    let body = read_body(&args)?;
    print_checksum(body.len(), smfwire_frame::checksum(&body), format);
    Ok(SUCCESS)
}

fn read_body(args: &ChecksumArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    let mut body = Vec::new();
    std::io::stdin()
        .read_to_end(&mut body)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(body)
}
