use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use smfwire_frame::{Header, Message};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct HeaderOutput {
    compression: i8,
    bitflags: i8,
    session: u16,
    size: u32,
    checksum: u32,
    meta: u32,
}

impl From<&Header> for HeaderOutput {
    fn from(header: &Header) -> Self {
        Self {
            compression: header.compression(),
            bitflags: header.bitflags(),
            session: header.session(),
            size: header.size(),
            checksum: header.checksum(),
            meta: header.meta(),
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    kind: &'static str,
    header: HeaderOutput,
    checksum_ok: bool,
    body: String,
    peer: &'a str,
    timestamp: String,
}

pub fn print_message(message: &Message, peer: &str, format: OutputFormat) {
    let header = message.header();
    let checksum_ok = message.verify_checksum().is_ok();

    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                kind: "message",
                header: HeaderOutput::from(header),
                checksum_ok,
                body: body_preview(message.body()),
                peer,
                timestamp: now_unix_seconds(),
            };
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["SESSION", "META", "SIZE", "CHECKSUM", "PEER", "BODY"])
                .add_row(vec![
                    header.session().to_string(),
                    header.meta().to_string(),
                    header.size().to_string(),
                    checksum_cell(header.checksum(), checksum_ok),
                    peer.to_string(),
                    body_preview(message.body()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "{header} peer={peer} checksum_ok={checksum_ok} body={}",
                body_preview(message.body())
            );
        }
        OutputFormat::Raw => {
            print_raw(message.body());
        }
    }
}

pub fn print_header(header: &Header, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&HeaderOutput::from(header)),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"])
                .add_row(vec!["compression".to_string(), header.compression().to_string()])
                .add_row(vec!["bitflags".to_string(), header.bitflags().to_string()])
                .add_row(vec!["session".to_string(), header.session().to_string()])
                .add_row(vec!["size".to_string(), header.size().to_string()])
                .add_row(vec!["checksum".to_string(), format!("{:#010x}", header.checksum())])
                .add_row(vec!["meta".to_string(), header.meta().to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{header}"),
        OutputFormat::Raw => print_raw(&header.encode()),
    }
}

#[derive(Serialize)]
struct ChecksumOutput {
    size: usize,
    checksum: u32,
    checksum_hex: String,
}

pub fn print_checksum(size: usize, checksum: u32, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ChecksumOutput {
            size,
            checksum,
            checksum_hex: format!("{checksum:#010x}"),
        }),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("size={size} checksum={checksum} ({checksum:#010x})");
        }
        OutputFormat::Raw => print_raw(&checksum.to_le_bytes()),
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn checksum_cell(checksum: u32, ok: bool) -> String {
    if ok {
        format!("{checksum:#010x}")
    } else {
        format!("{checksum:#010x} (MISMATCH)")
    }
}

fn body_preview(body: &[u8]) -> String {
    match std::str::from_utf8(body) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", body.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
