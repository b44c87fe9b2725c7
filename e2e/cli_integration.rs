// e2e/cli_integration.rs: the `lz4bridge` binary as a black box.
//
// Covers compress/decompress over files and stdio, option plumbing into the
// frame header, hashing, exit codes and overwrite protection.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_lz4bridge"))
}

/// A TempDir holding a ~40 KB text file.
fn make_temp_input() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.txt");
    fs::write(&input, "Hello, frames and blocks!\n".repeat(1600)).unwrap();
    (dir, input)
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(bin()).args(args).env_remove("RUST_LOG").output().expect("failed to run lz4bridge")
}

fn path_str(p: &std::path::Path) -> &str {
    p.to_str().unwrap()
}

// ── 1. Round trips ───────────────────────────────────────────────────────────

#[test]
fn compress_decompress_files() {
    let (dir, input) = make_temp_input();
    let packed = dir.path().join("input.txt.lz4");
    let restored = dir.path().join("restored.txt");

    let out = run(&["compress", path_str(&input), path_str(&packed)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let frame = fs::read(&packed).unwrap();
    assert_eq!(&frame[..4], &[0x04, 0x22, 0x4D, 0x18]);
    assert!(frame.len() < 2_000);

    let out = run(&["decompress", path_str(&packed), path_str(&restored)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(fs::read(&restored).unwrap(), fs::read(&input).unwrap());
}

#[test]
fn stdin_to_stdout_pipeline() {
    let payload = b"piped through stdin and stdout ".repeat(500);
    let mut child = Command::new(bin())
        .args(["compress", "-", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&payload).unwrap();
    let packed = child.wait_with_output().unwrap();
    assert!(packed.status.success());

    let mut child = Command::new(bin())
        .args(["decompress"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&packed.stdout).unwrap();
    let restored = child.wait_with_output().unwrap();
    assert!(restored.status.success());
    assert_eq!(restored.stdout, payload);
}

#[test]
fn every_level_and_block_size() {
    let (dir, input) = make_temp_input();
    for (level, block) in [("-1", "4"), ("1", "5"), ("4", "6"), ("12", "7")] {
        let packed = dir.path().join(format!("l{level}b{block}.lz4"));
        let out = run(&["compress", "-l", level, "-B", block, path_str(&input), path_str(&packed)]);
        assert!(out.status.success(), "level {level}: {}", String::from_utf8_lossy(&out.stderr));
        let frame = fs::read(&packed).unwrap();
        assert_eq!(frame[5] >> 4, block.parse::<u8>().unwrap());

        let out = run(&["decompress", path_str(&packed), "-"]);
        assert!(out.status.success());
        assert_eq!(out.stdout, fs::read(&input).unwrap());
    }
}

// ── 2. Header flags ──────────────────────────────────────────────────────────

#[test]
fn flags_are_written_to_the_header() {
    let (dir, input) = make_temp_input();
    let packed = dir.path().join("flags.lz4");
    let out = run(&[
        "compress", "--independent", "--block-checksum", "--no-content-checksum", "--content-size",
        path_str(&input), path_str(&packed),
    ]);
    assert!(out.status.success());
    let frame = fs::read(&packed).unwrap();
    // version | independent | block checksum | content size
    assert_eq!(frame[4], 0x40 | 0x20 | 0x10 | 0x08);
    let declared = u64::from_le_bytes(frame[6..14].try_into().unwrap());
    assert_eq!(declared, fs::metadata(&input).unwrap().len());

    let out = run(&["decompress", path_str(&packed)]);
    assert!(out.status.success());
    assert_eq!(out.stdout, fs::read(&input).unwrap());
}

#[test]
fn default_frame_has_content_checksum() {
    let (dir, input) = make_temp_input();
    let packed = dir.path().join("default.lz4");
    assert!(run(&["compress", path_str(&input), path_str(&packed)]).status.success());
    assert_eq!(fs::read(&packed).unwrap()[4], 0x44);
}

// ── 3. Hash ──────────────────────────────────────────────────────────────────

#[test]
fn hash_files() {
    let dir = TempDir::new().unwrap();
    let abc = dir.path().join("abc");
    let empty = dir.path().join("empty");
    fs::write(&abc, b"abc").unwrap();
    fs::write(&empty, b"").unwrap();

    let out = run(&["hash", path_str(&abc), path_str(&empty)]);
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], format!("32d153ff  {}", abc.display()));
    assert_eq!(lines[1], format!("02cc5d05  {}", empty.display()));

    let out = run(&["hash", "--bits", "64", path_str(&abc)]);
    assert!(String::from_utf8(out.stdout).unwrap().starts_with("44bc2cf5ad770999"));
}

// ── 4. Failures and exit codes ───────────────────────────────────────────────

#[test]
fn missing_input_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.txt");
    let out = run(&["compress", path_str(&missing), path_str(&dir.path().join("x.lz4"))]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("nope.txt"));
}

#[test]
fn corrupt_input_fails() {
    let dir = TempDir::new().unwrap();
    let bogus = dir.path().join("bogus.lz4");
    fs::write(&bogus, b"this is not an lz4 frame at all").unwrap();
    let out = run(&["decompress", path_str(&bogus), "-"]);
    assert!(!out.status.success());
}

#[test]
fn truncated_input_fails() {
    let (dir, input) = make_temp_input();
    let packed = dir.path().join("t.lz4");
    assert!(run(&["compress", path_str(&input), path_str(&packed)]).status.success());
    let mut frame = fs::read(&packed).unwrap();
    frame.truncate(frame.len() - 6);
    fs::write(&packed, &frame).unwrap();
    let out = run(&["decompress", path_str(&packed), "-"]);
    assert!(!out.status.success());
}

#[test]
fn existing_output_requires_force() {
    let (dir, input) = make_temp_input();
    let packed = dir.path().join("exists.lz4");
    fs::write(&packed, b"keep me").unwrap();
    let out = run(&["compress", path_str(&input), path_str(&packed)]);
    assert!(!out.status.success());
    assert_eq!(fs::read(&packed).unwrap(), b"keep me");

    let out = run(&["compress", "-f", path_str(&input), path_str(&packed)]);
    assert!(out.status.success());
    assert_ne!(fs::read(&packed).unwrap(), b"keep me");
}

#[test]
fn quiet_suppresses_error_text() {
    let dir = TempDir::new().unwrap();
    let out = run(&["-qq", "decompress", path_str(&dir.path().join("absent.lz4")), "-"]);
    assert!(!out.status.success());
    assert!(out.stderr.is_empty());
}

#[test]
fn invalid_block_size_is_a_usage_error() {
    let out = run(&["compress", "-B", "9"]);
    assert_eq!(out.status.code(), Some(2));
}
