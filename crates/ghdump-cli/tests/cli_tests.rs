//! End-to-end tests for the `ghdump` binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn ghdump(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ghdump"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run ghdump")
}

/// Run ghdump with its stdout pipe closed before anything is read
fn ghdump_closed_stdout(args: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ghdump"))
        .args(args)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run ghdump");
    drop(child.stdout.take());
    child.wait_with_output().expect("failed to wait for ghdump")
}

fn write_fixture(dir: &TempDir, name: &str, data: &[u8]) -> String {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path.to_string_lossy().into_owned()
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn dump_lines(stdout: &str) -> Vec<&str> {
    stdout
        .lines()
        .filter(|line| line.starts_with("        0x"))
        .collect()
}

#[test]
fn test_no_arguments_prints_hint() {
    let output = ghdump(&[]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Please rerun with -h to learn how to use me >_<"));
}

#[test]
fn test_color_info() {
    let output = ghdump(&["--color-info"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Color Scale Information:"));
    assert!(stdout.contains("0x00 to 0x3F: Light Blue"));
    assert!(stdout.contains("0xC0 to 0xFF: Light Red"));
}

#[test]
fn test_stream_small_file() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0u8..17).collect();
    let input = write_fixture(&dir, "small.bin", &data);

    let output = ghdump(&["--no-banner", "--rate", "100000000", &input]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("File Size: 17 bytes"));
    assert!(stdout.contains("Unique Bytes: 17"));
    assert!(stdout.contains("Formatted Binary Data:"));

    let lines = dump_lines(&stdout);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("0x0F,"));
    assert_eq!(lines[1], "        0x10");
}

#[test]
fn test_batch_output_is_plain() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..=255u8).collect();
    let input = write_fixture(&dir, "all.bin", &data);
    let out_path = dir.path().join("out.txt");
    let out = out_path.to_string_lossy().into_owned();

    let output = ghdump(&["--no-banner", "-c", "-b", "8", "-o", &out, &input]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains("Wrote"));

    let written = fs::read_to_string(Path::new(&out)).unwrap();
    assert!(!written.contains('\x1b'));

    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines.len(), 32);
    for line in &lines {
        assert!(line.starts_with("        0x"));
    }
    assert_eq!(lines[31].matches("0x").count(), 8);
    assert!(lines[31].ends_with("0xFF"));
}

#[test]
fn test_empty_file_digests() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "empty.bin", b"");

    let output = ghdump(&["--no-banner", &input]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    assert!(stdout.contains("File Size: 0 bytes"));
    assert!(stdout.contains(
        "SHA256: e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    ));
    assert!(stdout.contains("MD5: d41d8cd98f00b204e9800998ecf8427e"));
    assert!(stdout.contains("CRC32: 00000000"));
    assert!(dump_lines(&stdout).is_empty());
}

#[test]
fn test_missing_file_exit_status() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.bin");

    let output = ghdump(&["--no-banner", &missing.to_string_lossy()]);
    assert_eq!(output.status.code(), Some(66));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn test_invalid_bytes_per_line_exit_status() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "a.bin", b"abc");

    let output = ghdump(&["--no-banner", "-b", "0", &input]);
    assert_eq!(output.status.code(), Some(64));
}

#[test]
fn test_thread_count_does_not_change_output() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..10_000u32).map(|i| (i * 7 % 251) as u8).collect();
    let input = write_fixture(&dir, "mixed.bin", &data);

    let one = dir.path().join("one.txt");
    let many = dir.path().join("many.txt");
    for (threads, out) in [("1", &one), ("7", &many)] {
        let out = out.to_string_lossy();
        let output = ghdump(&["--no-banner", "-t", threads, "-o", &out, &input]);
        assert!(output.status.success());
    }

    assert_eq!(fs::read(&one).unwrap(), fs::read(&many).unwrap());
}

#[test]
fn test_closed_stdout_while_streaming() {
    let dir = TempDir::new().unwrap();
    let data: Vec<u8> = (0..200_000u32).map(|i| (i % 256) as u8).collect();
    let input = write_fixture(&dir, "big.bin", &data);

    for _ in 0..3 {
        let output = ghdump_closed_stdout(&["--no-banner", "--rate", "100000000", &input]);
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(output.status.code(), Some(0), "stderr: {stderr}");
        assert!(!stderr.contains("panicked"));
    }
}

#[test]
fn test_closed_stdout_in_batch_mode() {
    let dir = TempDir::new().unwrap();
    let input = write_fixture(&dir, "a.bin", b"0123456789abcdef");
    let out = dir.path().join("out.txt");
    let out = out.to_string_lossy();

    let output = ghdump_closed_stdout(&["-o", &out, &input]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(0), "stderr: {stderr}");
    assert!(!stderr.contains("panicked"));
}
