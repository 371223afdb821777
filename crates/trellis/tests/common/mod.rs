//! Common test utilities shared across integration tests.

use std::path::Path;
use std::process::{Command, Output};

/// Run the trellis binary in the specified directory
pub fn run_trellis_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_trellis"))
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("TRELLIS_ASCII", "1")
        .output()
        .expect("Failed to execute trellis binary")
}

/// Run a command that must succeed, returning its stdout
pub fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run_trellis_in_dir(dir, args);
    assert!(
        output.status.success(),
        "trellis {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Run a command with `--json` that must succeed, parsing its stdout
pub fn run_json(dir: &Path, args: &[&str]) -> serde_json::Value {
    let mut args = args.to_vec();
    args.push("--json");
    let stdout = run_ok(dir, &args);
    serde_json::from_str(&stdout).expect("stdout should be valid JSON")
}
