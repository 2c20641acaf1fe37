//! Integration tests for the visual-run CLI.

use capture_core as _;
use runner as _;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tracing as _;
use tracing_subscriber as _;

fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    path.pop();
    path.join("visual-run")
}

fn create_temp_file(dir: &std::path::Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn missing_argument_is_a_usage_error() {
    let output = Command::new(binary_path())
        .output()
        .expect("failed to run visual-run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage: visual-run"));
}

#[test]
fn extra_argument_is_a_usage_error() {
    let output = Command::new(binary_path())
        .args(["hello.s", "world.s"])
        .output()
        .expect("failed to run visual-run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected extra argument"));
}

#[test]
fn missing_file_is_reported() {
    let output = Command::new(binary_path())
        .arg("/nonexistent/program.s")
        .output()
        .expect("failed to run visual-run");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("file not found"));
}

#[test]
fn help_prints_usage_and_succeeds() {
    let output = Command::new(binary_path())
        .arg("--help")
        .output()
        .expect("failed to run visual-run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage: visual-run"));
}

/// A stub emulator: a script that ignores the capture configuration and
/// writes a canned execution log to the path it is given.
#[cfg(unix)]
fn create_stub_emulator(dir: &std::path::Path, log_body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = format!("#!/bin/sh\nprintf '%s' '{log_body}' > \"$2\"\n");
    let path = create_temp_file(dir, "stub-emulator.sh", &script);
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn decodes_the_stub_emulator_capture() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "hello.s", "MOV R0, #0\n");
    let stub = create_stub_emulator(
        temp_dir.path(),
        "<log><line><word>0x6C6C6548</word><word>0x77202C6F</word>\
         <word>0x646C726F</word><word>0xA</word></line></log>",
    );

    let output = Command::new(binary_path())
        .arg(&program)
        .env("VISUAL_CMD", &stub)
        .output()
        .expect("failed to run visual-run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("---- PROGRAM OUTPUT ----"));
    assert!(stdout.contains("Hello, world"));
    assert!(stdout.contains("---- END PROGRAM OUTPUT ----"));
}

#[cfg(unix)]
#[test]
fn unusable_log_still_exits_cleanly() {
    let temp_dir = tempfile::tempdir().unwrap();
    let program = create_temp_file(temp_dir.path(), "hello.s", "MOV R0, #0\n");
    let stub = create_stub_emulator(temp_dir.path(), "not xml at all");

    let output = Command::new(binary_path())
        .arg(&program)
        .env("VISUAL_CMD", &stub)
        .output()
        .expect("failed to run visual-run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("---- PROGRAM OUTPUT ----"));
    assert!(stdout.contains("---- END PROGRAM OUTPUT ----"));
}
