#![cfg(all(unix, feature = "cli"))]

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use smfwire_frame::{read_message, write_message, Header};
use smfwire_transport::{connect, Endpoint, WireStream};

fn unique_temp_dir(tag: &str) -> PathBuf {
    let dir = PathBuf::from(format!(
        "/tmp/smfcli-{tag}-{}-{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
    dir
}

fn wait_for_connect(path: &Path, timeout: Duration) -> WireStream {
    let endpoint = Endpoint::Unix(path.to_path_buf());
    let start = Instant::now();
    loop {
        match connect(&endpoint) {
            Ok(stream) => return stream,
            Err(err) => {
                if start.elapsed() >= timeout {
                    panic!("connect timeout: {err}");
                }
                thread::sleep(Duration::from_millis(25));
            }
        }
    }
}

fn smfwire() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_smfwire"));
    cmd.arg("--log-level").arg("error");
    cmd
}

#[test]
fn echo_replies_with_same_session_meta_and_body() {
    let dir = unique_temp_dir("echo");
    let sock_path = dir.join("echo.sock");

    let mut child = smfwire()
        .arg("echo")
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("echo command should start");

    let mut stream = wait_for_connect(&sock_path, Duration::from_secs(3));
    stream
        .set_read_timeout(Some(Duration::from_secs(3)))
        .expect("timeout should apply");

    write_message(&mut stream, 7, b"ABC", 42).expect("write should succeed");
    write_message(&mut stream, 8, b"", 43).expect("write should succeed");

    let first = read_message(&mut stream).expect("first reply");
    let second = read_message(&mut stream).expect("second reply");

    assert_eq!(first.header(), &Header::new(0, 0, 7, 3, 0x4FCF_EE98, 42));
    assert_eq!(first.body().as_ref(), b"ABC");
    assert_eq!(second.session(), 8);
    assert_eq!(second.meta(), 43);
    assert!(second.body().is_empty());

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_wait_prints_verified_reply_as_json() {
    let dir = unique_temp_dir("send");
    let sock_path = dir.join("echo.sock");

    let mut child = smfwire()
        .arg("echo")
        .arg(&sock_path)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("echo command should start");
    drop(wait_for_connect(&sock_path, Duration::from_secs(3)));

    let output = smfwire()
        .arg("--format")
        .arg("json")
        .arg("send")
        .arg(&sock_path)
        .args(["--session", "7", "--meta", "42", "--data", "ABC", "--wait"])
        .output()
        .expect("send should run");

    assert!(output.status.success(), "send failed: {output:?}");
    let line = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value =
        serde_json::from_str(line.trim()).expect("stdout should be one JSON object");
    assert_eq!(value["header"]["session"], 7);
    assert_eq!(value["header"]["meta"], 42);
    assert_eq!(value["header"]["size"], 3);
    assert_eq!(value["header"]["checksum"], 1_339_027_096u32);
    assert_eq!(value["checksum_ok"], true);
    assert_eq!(value["body"], "ABC");

    let _ = child.kill();
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn listen_prints_received_message_and_exits_after_count() {
    let dir = unique_temp_dir("listen");
    let sock_path = dir.join("listen.sock");

    let child = smfwire()
        .arg("--format")
        .arg("pretty")
        .arg("listen")
        .arg(&sock_path)
        .args(["--count", "1"])
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("listen command should start");

    let mut stream = wait_for_connect(&sock_path, Duration::from_secs(3));
    write_message(&mut stream, 5, b"hello listener", 9).expect("write should succeed");
    stream.flush().expect("flush should succeed");

    let output = child.wait_with_output().expect("listen should exit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("session=5"), "stdout: {stdout}");
    assert!(stdout.contains("meta=9"), "stdout: {stdout}");
    assert!(stdout.contains("checksum_ok=true"), "stdout: {stdout}");
    assert!(stdout.contains("body=hello listener"), "stdout: {stdout}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn send_to_missing_socket_fails() {
    let dir = unique_temp_dir("missing");
    let output = smfwire()
        .arg("send")
        .arg(dir.join("nobody.sock"))
        .args(["--data", "x"])
        .output()
        .expect("send should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("connect failed"), "stderr: {stderr}");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn inspect_decodes_header_hex() {
    let output = smfwire()
        .arg("--format")
        .arg("json")
        .arg("inspect")
        .arg("0000070003000000 98eecf4f2a000000")
        .output()
        .expect("inspect should run");

    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["session"], 7);
    assert_eq!(value["size"], 3);
    assert_eq!(value["checksum"], 1_339_027_096u32);
    assert_eq!(value["meta"], 42);
}

#[test]
fn inspect_short_header_returns_60() {
    let output = smfwire()
        .arg("inspect")
        .arg("000007")
        .output()
        .expect("inspect should run");

    assert_eq!(output.status.code(), Some(60));
}

#[test]
fn checksum_reads_stdin() {
    let mut child = smfwire()
        .arg("--format")
        .arg("pretty")
        .arg("checksum")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("checksum should start");

    child
        .stdin
        .take()
        .expect("stdin should be piped")
        .write_all(b"ABC")
        .expect("stdin write should succeed");

    let output = child.wait_with_output().expect("checksum should exit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "size=3 checksum=1339027096 (0x4fcfee98)");
}
