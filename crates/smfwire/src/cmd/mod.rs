use clap::{Args, Subcommand};
use smfwire_transport::Endpoint;
use std::path::PathBuf;
use std::time::Duration;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod checksum;
pub mod echo;
pub mod inspect;
pub mod listen;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve an endpoint, replying to every message with its own body.
    Echo(EchoArgs),
    /// Send a single message.
    Send(SendArgs),
    /// Listen and print received messages.
    Listen(ListenArgs),
    /// Decode a 16-byte header given in hex.
    Inspect(InspectArgs),
    /// Compute the body checksum carried in headers.
    Checksum(ChecksumArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Echo(args) => echo::run(args),
        Command::Send(args) => send::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Checksum(args) => checksum::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EchoArgs {
    /// Endpoint to bind (tcp://host:port, unix:///path or a socket path).
    pub endpoint: Endpoint,
    /// Drop connections that deliver a body with a bad checksum.
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Endpoint to connect to.
    pub endpoint: Endpoint,
    /// Session id written to the header.
    #[arg(long, short = 's', default_value = "1")]
    pub session: u16,
    /// Metadata (e.g. method id) written to the header.
    #[arg(long, short = 'm', default_value = "0")]
    pub meta: u32,
    /// JSON body.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string body.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read body from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
    /// Wait for one reply message, verify its checksum and print it.
    #[arg(long)]
    pub wait: bool,
    /// Maximum time to wait for the reply when --wait is set (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub wait_timeout: String,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Endpoint to bind.
    pub endpoint: Endpoint,
    /// Only print messages for these sessions (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub sessions: Option<Vec<u16>>,
    /// Exit after receiving N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Drop connections that deliver a body with a bad checksum.
    #[arg(long)]
    pub verify: bool,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Header bytes as hex (whitespace, ':' and a leading 0x are ignored).
    pub hex: String,
}

#[derive(Args, Debug)]
pub struct ChecksumArgs {
    /// Raw string body. Reads stdin when neither --data nor --file is given.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read body from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse `5s`, `500ms` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(num) => (num, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
