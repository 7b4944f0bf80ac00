//! Runs the built binary against a shell script standing in for the OCI CLI.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const CLUSTER_ID: &str = "ocid1.cluster.oc1..aaa";
const REGION: &str = "us-ashburn-1";

fn fake_oci(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("oci");
    fs::write(&path, format!("#!/bin/sh\n{script}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_oci-k8s-cache"))
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("OCI_K8S_CACHE_PATH")
        .env_remove("OCI_K8S_EXPIRATION_THRESHOLD")
        .env_remove("OCI_CLI_PATH")
        .env_remove("OCI_CLI_REGION")
        .output()
        .unwrap()
}

fn stderr_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_fresh_token_is_cached_and_printed() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let document = r#"{"status":{"token":"abc","expirationTimestamp":"2999-01-01T00:00:00Z"}}"#;
    let oci = fake_oci(dir.path(), &format!("printf '%s' '{document}'"));

    let output = run(&[
        "--cache-path",
        cache_dir.to_str().unwrap(),
        "--oci-path",
        oci.to_str().unwrap(),
        "--cluster-id",
        CLUSTER_ID,
        "--region",
        REGION,
    ]);

    assert!(output.status.success());
    assert_eq!(output.stdout, document.as_bytes());
    assert!(output.stderr.is_empty());
    assert_eq!(
        fs::read(cache_dir.join(format!("{REGION}-{CLUSTER_ID}"))).unwrap(),
        document.as_bytes()
    );
}

#[test]
fn test_failing_cli_prints_a_single_diagnostic_line() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let oci = fake_oci(dir.path(), "echo 'permission denied' >&2\nexit 2");

    let output = run(&[
        "--cache-path",
        cache_dir.to_str().unwrap(),
        "--oci-path",
        oci.to_str().unwrap(),
        "--cluster-id",
        CLUSTER_ID,
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let lines = stderr_lines(&output);
    assert_eq!(lines.len(), 1, "unexpected stderr: {lines:?}");
    assert!(lines[0].starts_with("error: "));
    assert!(lines[0].contains("error code 2"));
    assert!(lines[0].contains("permission denied"));
    assert!(!lines[0].contains('\u{1b}'));
    assert!(!cache_dir.join(format!("{REGION}-{CLUSTER_ID}")).exists());
}

#[test]
fn test_empty_cluster_id_fails_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let oci = fake_oci(dir.path(), &format!("touch '{}'", dir.path().join("called").display()));

    let output = run(&[
        "--cache-path",
        cache_dir.to_str().unwrap(),
        "--oci-path",
        oci.to_str().unwrap(),
        "--cluster-id",
        "",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert_eq!(stderr_lines(&output).len(), 1);
    assert!(!cache_dir.exists());
    assert!(!dir.path().join("called").exists());
}

#[test]
fn test_trailing_words_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let cache_dir = dir.path().join("cache");
    let document = r#"{"status":{"token":"abc","expirationTimestamp":"2999-01-01T00:00:00Z"}}"#;
    let oci = fake_oci(dir.path(), &format!("printf '%s' '{document}'"));

    let output = run(&[
        "token",
        "-cache-path",
        cache_dir.to_str().unwrap(),
        "-oci-path",
        oci.to_str().unwrap(),
        "-cluster-id",
        CLUSTER_ID,
        "extra",
        "--bogus",
    ]);

    assert!(output.status.success(), "{:?}", stderr_lines(&output));
    assert_eq!(output.stdout, document.as_bytes());
}
