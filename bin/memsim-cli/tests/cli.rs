// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! End-to-end tests of the `memsim` binary.

use std::process::Command;

fn memsim() -> Command {
    Command::new(env!("CARGO_BIN_EXE_memsim"))
}

#[test]
fn test_run_prints_hole_list() {
    let output = memsim()
        .args([
            "run",
            "--words",
            "100",
            "--word-size",
            "8",
            "--ops",
            "alloc:80,alloc:40,free:0",
        ])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("[0, 10] - [15, 85]"), "got: {stdout}");
}

#[test]
fn test_run_writes_dump() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("map.txt");
    let output = memsim()
        .args(["run", "-w", "32", "--word-size", "1", "--ops", "alloc:4,alloc:4,free:0"])
        .arg("--dump")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "[0, 4] - [8, 24]");
}

#[test]
fn test_compare_lists_both_policies() {
    let output = memsim()
        .args(["compare", "-w", "64", "--ops", "alloc:64,alloc:64"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("best-fit"));
    assert!(stdout.contains("worst-fit"));
}

#[test]
fn test_config_file_overrides_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("memsim.toml");
    std::fs::write(&path, "word_size = 2\nsize_in_words = 12\npolicy = \"worst\"\n").unwrap();

    let output = memsim()
        .arg("--config")
        .arg(&path)
        .args(["config", "--words", "999"])
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("size_in_words = 12"));
    assert!(stdout.contains("policy = \"worst\""));
}

#[test]
fn test_oversized_arena_is_rejected() {
    let output = memsim()
        .args(["run", "-w", "65537", "--ops", "alloc:1"])
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("65536"), "got: {stderr}");
}

#[test]
fn test_missing_trace_is_an_error() {
    let output = memsim().args(["run"]).output().unwrap();
    assert!(!output.status.success());
}
