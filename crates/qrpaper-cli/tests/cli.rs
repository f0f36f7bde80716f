//! Integration tests for the qrpaper binary.
//!
//! None of these reach arXiv: failures are provoked with an unreachable API endpoint.

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

/// Nothing listens on the discard port, so every request fails fast.
const UNREACHABLE_API: &str = "http://127.0.0.1:9/api/query";

// Helper function to create a clean command instance
fn qrpaper() -> Command {
  let mut cmd = Command::cargo_bin("qrpaper").unwrap();
  cmd.env_remove("QRPAPER_INSECURE").env_remove("QRPAPER_API_BASE").env_remove("RUST_LOG");
  cmd
}

fn entries(dir: &Path) -> Vec<String> {
  let mut names: Vec<_> = fs::read_dir(dir)
    .unwrap()
    .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
    .collect();
  names.sort();
  names
}

#[test]
fn test_help() {
  qrpaper()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("--output-dir"))
    .stdout(predicate::str::contains("--insecure"))
    .stdout(predicate::str::contains("--api-base").not());
}

#[test]
fn test_empty_input_does_nothing() {
  let dir = tempdir().unwrap();

  qrpaper()
    .arg("--output-dir")
    .arg(dir.path())
    .write_stdin("")
    .assert()
    .success()
    .stdout(predicate::str::contains("No arXiv abstract URLs found"))
    .stdout(predicate::str::contains("Downloading papers").not());

  assert!(entries(dir.path()).is_empty());
}

#[test]
fn test_input_without_links_does_nothing() {
  let dir = tempdir().unwrap();

  qrpaper()
    .arg("-o")
    .arg(dir.path())
    .write_stdin("see arxiv.org/abs/2301.07041 and http://example.com/abs/1234\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("No arXiv abstract URLs found"));

  assert!(entries(dir.path()).is_empty());
}

#[test]
fn test_unreachable_arxiv_fails_without_leftovers() {
  let dir = tempdir().unwrap();

  qrpaper()
    .arg("--output-dir")
    .arg(dir.path())
    .arg("--api-base")
    .arg(UNREACHABLE_API)
    .write_stdin("https://arxiv.org/abs/2301.07041\n")
    .assert()
    .failure()
    .stdout(predicate::str::contains("Downloading papers: ...."))
    .stdout(predicate::str::contains("2301.07041 ... Failed"))
    .stdout(predicate::str::contains("Cleaning up: ...."))
    .stderr(predicate::str::contains("1 of 1 paper(s) could not be processed"));

  assert!(entries(dir.path()).is_empty());
}

#[test]
fn test_output_dir_is_created() {
  let dir = tempdir().unwrap();
  let output = dir.path().join("papers");

  qrpaper()
    .arg("--output-dir")
    .arg(&output)
    .env("QRPAPER_API_BASE", UNREACHABLE_API)
    .write_stdin("https://arxiv.org/abs/2301.07041")
    .assert()
    .failure();

  assert!(output.is_dir());
  assert!(entries(&output).is_empty());
}

#[test]
fn test_output_path_must_be_a_directory() {
  let dir = tempdir().unwrap();
  let file = dir.path().join("not-a-dir");
  fs::write(&file, b"").unwrap();

  qrpaper()
    .arg("--output-dir")
    .arg(&file)
    .write_stdin("https://arxiv.org/abs/2301.07041")
    .assert()
    .failure()
    .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_insecure_mode_warns() {
  let dir = tempdir().unwrap();

  qrpaper()
    .arg("--output-dir")
    .arg(dir.path())
    .arg("--insecure")
    .arg("--api-base")
    .arg(UNREACHABLE_API)
    .write_stdin("https://arxiv.org/abs/2301.07041")
    .assert()
    .failure()
    .stderr(predicate::str::contains("TLS certificate verification is disabled"));
}

#[ignore = "Requires network access to arXiv"]
#[test]
fn test_live_paper() {
  let dir = tempdir().unwrap();

  qrpaper()
    .arg("--output-dir")
    .arg(dir.path())
    .write_stdin("Have a look at https://arxiv.org/abs/2301.07041\n")
    .assert()
    .success()
    .stdout(predicate::str::contains("https://arxiv.org/abs/2301.07041"))
    .stdout(predicate::str::contains("2301.07041 ... Merged"));

  assert_eq!(entries(dir.path()), vec!["2301.07041.pdf"]);
}
