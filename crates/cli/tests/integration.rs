//! Integration tests for the webotron CLI
//!
//! These tests require a running S3-compatible server.
//!
//! Run with:
//! ```bash
//! # Start an S3-compatible server
//! docker run -d --name minio -p 9000:9000 \
//!     -e MINIO_ROOT_USER=accesskey \
//!     -e MINIO_ROOT_PASSWORD=secretkey \
//!     minio/minio server /data
//!
//! # Run tests
//! TEST_S3_ENDPOINT=http://localhost:9000 \
//! TEST_S3_ACCESS_KEY=accesskey \
//! TEST_S3_SECRET_KEY=secretkey \
//!     cargo test --features integration
//! ```
//!
//! Buckets created here are left in place; webotron has no delete command.

#![cfg(feature = "integration")]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use std::time::Duration;
use tempfile::TempDir;

const PROFILE: &str = "test";

/// Run webotron with an isolated config directory
fn run_webotron(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_webotron"))
        .args(args)
        .env("WEBOTRON_CONFIG_DIR", config_dir)
        .env_remove("WEBOTRON_PROFILE")
        .output()
        .expect("Failed to execute webotron")
}

/// Get S3 test configuration from environment
fn get_test_config() -> Option<(String, String, String)> {
    let endpoint = std::env::var("TEST_S3_ENDPOINT").ok()?;
    let access_key = std::env::var("TEST_S3_ACCESS_KEY").ok()?;
    let secret_key = std::env::var("TEST_S3_SECRET_KEY").ok()?;
    Some((endpoint, access_key, secret_key))
}

/// Wait for the S3 service to answer a bucket listing
fn wait_for_s3_ready(config_dir: &Path) -> bool {
    for _ in 0..30 {
        let output = run_webotron(&["--profile", PROFILE, "list-buckets", "--json"], config_dir);
        if output.status.success() {
            return true;
        }
        std::thread::sleep(Duration::from_secs(1));
    }
    false
}

/// Configure the test profile and return its config directory
fn setup_profile() -> Option<TempDir> {
    let (endpoint, access_key, secret_key) = get_test_config()?;
    let config_dir = tempfile::tempdir().ok()?;

    let output = run_webotron(
        &[
            "profile",
            "set",
            PROFILE,
            "--endpoint",
            &endpoint,
            "--access-key",
            &access_key,
            "--secret-key",
            &secret_key,
            "--path-style",
        ],
        config_dir.path(),
    );
    if !output.status.success() {
        eprintln!(
            "Failed to set profile: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        return None;
    }

    if !wait_for_s3_ready(config_dir.path()) {
        eprintln!("S3 service did not become ready in time");
        return None;
    }

    Some(config_dir)
}

/// Generate unique suffix for test resources
fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{:x}", duration.as_nanos() % 0xFFFFFFFF)
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

mod setup_bucket {
    use super::*;

    #[test]
    fn test_setup_bucket_is_idempotent() {
        let Some(config_dir) = setup_profile() else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let bucket = format!("site-{}", unique_suffix());

        for _ in 0..2 {
            let output = run_webotron(
                &["--profile", PROFILE, "setup-bucket", &bucket, "--json"],
                config_dir.path(),
            );
            assert!(
                output.status.success(),
                "setup-bucket failed: {}",
                String::from_utf8_lossy(&output.stderr)
            );
            let json = stdout_json(&output);
            assert_eq!(json["bucket"], bucket.as_str());
            assert!(json["url"].as_str().unwrap().contains(&bucket));
        }

        let output = run_webotron(
            &["--profile", PROFILE, "list-buckets", "--json"],
            config_dir.path(),
        );
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains(&bucket));
    }

    #[test]
    fn test_setup_bucket_rejects_invalid_name() {
        let config_dir = tempfile::tempdir().unwrap();
        let output = run_webotron(&["setup-bucket", "Not_A_Bucket"], config_dir.path());
        assert_eq!(output.status.code(), Some(2));
    }
}

mod sync {
    use super::*;

    fn site_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<h1>hello</h1>").unwrap();
        fs::write(dir.path().join("error.html"), "<h1>oops</h1>").unwrap();
        fs::create_dir_all(dir.path().join("css")).unwrap();
        fs::write(dir.path().join("css/site.css"), "body { margin: 0 }").unwrap();
        dir
    }

    #[test]
    fn test_sync_uploads_tree() {
        let Some(config_dir) = setup_profile() else {
            eprintln!("Skipping: S3 test config not available");
            return;
        };
        let bucket = format!("sync-{}", unique_suffix());
        let output = run_webotron(
            &["--profile", PROFILE, "setup-bucket", &bucket],
            config_dir.path(),
        );
        assert!(output.status.success());

        let site = site_dir();
        let output = run_webotron(
            &[
                "--profile",
                PROFILE,
                "sync",
                &site.path().to_string_lossy(),
                &bucket,
                "--json",
                "--no-progress",
            ],
            config_dir.path(),
        );
        assert!(
            output.status.success(),
            "sync failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let report = stdout_json(&output);
        assert_eq!(report["objects"].as_array().unwrap().len(), 3);

        let output = run_webotron(
            &["--profile", PROFILE, "list-bucket-objects", &bucket, "--json"],
            config_dir.path(),
        );
        assert!(output.status.success());
        let listing = stdout_json(&output);
        let keys: Vec<&str> = listing["items"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|item| item["key"].as_str())
            .collect();
        assert!(keys.contains(&"index.html"));
        assert!(keys.contains(&"error.html"));
        assert!(keys.contains(&"css/site.css"));
    }

    #[test]
    fn test_sync_dry_run_needs_no_server() {
        let config_dir = tempfile::tempdir().unwrap();
        let site = site_dir();

        let output = run_webotron(
            &[
                "sync",
                &site.path().to_string_lossy(),
                "my-site",
                "--dry-run",
                "--json",
            ],
            config_dir.path(),
        );
        assert!(output.status.success());
        let plan = stdout_json(&output);
        assert_eq!(plan["uploads"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_sync_missing_directory() {
        let config_dir = tempfile::tempdir().unwrap();
        let missing = config_dir.path().join("missing");

        let output = run_webotron(
            &["sync", &missing.to_string_lossy(), "my-site", "--dry-run"],
            config_dir.path(),
        );
        assert_eq!(output.status.code(), Some(5));
    }
}

mod profiles {
    use super::*;

    #[test]
    fn test_profile_set_list_remove() {
        let config_dir = tempfile::tempdir().unwrap();

        let output = run_webotron(
            &["profile", "set", "staging", "--region", "eu-west-1"],
            config_dir.path(),
        );
        assert!(output.status.success());

        let output = run_webotron(&["profile", "list", "--json"], config_dir.path());
        assert!(output.status.success());
        let json = stdout_json(&output);
        assert_eq!(json["profiles"][0]["name"], "staging");
        assert_eq!(json["profiles"][0]["region"], "eu-west-1");

        let output = run_webotron(&["profile", "remove", "staging"], config_dir.path());
        assert!(output.status.success());

        let output = run_webotron(&["profile", "remove", "staging"], config_dir.path());
        assert_eq!(output.status.code(), Some(5));
    }
}
