//! Concurrency tests for periodize.
//!
//! These tests verify that multiple processes can safely:
//! - Append to the max log simultaneously (file locking)
//! - Read maxes while others write
//! - Run batch generations for different clients side by side

use assert_cmd::Command;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("periodize"))
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

#[test]
fn test_concurrent_max_records() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = (0..5)
        .map(|i| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .args(["max", "record", "--exercise"])
                    .arg(format!("lift_{i}"))
                    .args(["--weight", "100", "--reps", "3"])
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Every append landed on its own line
    let log = std::fs::read_to_string(data_dir.join("maxes.jsonl")).expect("Failed to read log");
    assert_eq!(log.lines().count(), 5, "Expected 5 entries, got:\n{}", log);
    for line in log.lines() {
        serde_json::from_str::<serde_json::Value>(line).expect("Torn line in max log");
    }
}

#[test]
fn test_concurrent_reads_and_writes() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    cli()
        .args(["max", "record", "--exercise", "squat", "--weight", "140"])
        .arg("--data-dir")
        .arg(&data_dir)
        .assert()
        .success();

    let writer_dir = data_dir.clone();
    let writer = thread::spawn(move || {
        for i in 0..3 {
            thread::sleep(Duration::from_millis(i * 5));
            cli()
                .args(["max", "record", "--exercise", "bench_press", "--weight", "100"])
                .arg("--data-dir")
                .arg(&writer_dir)
                .assert()
                .success();
        }
    });

    let reader_dir = data_dir.clone();
    let reader = thread::spawn(move || {
        for _ in 0..3 {
            cli()
                .args(["max", "list", "--json"])
                .arg("--data-dir")
                .arg(&reader_dir)
                .assert()
                .success();
        }
    });

    writer.join().expect("Writer panicked");
    reader.join().expect("Reader panicked");

    let output = cli()
        .args(["max", "list", "--json"])
        .arg("--data-dir")
        .arg(&data_dir)
        .output()
        .unwrap();
    let table: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(table["squat"], 140.0);
    assert_eq!(table["bench_press"], 100.0);
}

#[test]
fn test_parallel_batch_generations() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().to_path_buf();

    let handles: Vec<_> = ["ann", "ben", "cat"]
        .into_iter()
        .map(|client| {
            let data_dir = data_dir.clone();
            thread::spawn(move || {
                cli()
                    .args(["generate", "--goal", "hybrid", "--weeks", "6", "--days", "3"])
                    .args(["--client", client, "--batch-size", "3"])
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success();
                cli()
                    .args(["continue", "--client", client])
                    .arg("--data-dir")
                    .arg(&data_dir)
                    .assert()
                    .success();
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    for client in ["ann", "ben", "cat"] {
        let path = data_dir.join("states").join(format!("{client}.json"));
        let state: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(state["status"], "completed");
        assert_eq!(state["program"]["weeks"].as_array().unwrap().len(), 6);
    }

    // No temp files left behind by the atomic saves
    let entries = std::fs::read_dir(data_dir.join("states")).unwrap().count();
    assert_eq!(entries, 3);
}
