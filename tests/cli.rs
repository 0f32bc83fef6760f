//! Command-line smoke tests
//!
//! Every run gets its own config and data directories and an in-memory vault
//! key, so nothing touches the user's files or the system keyring.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    config: TempDir,
    data: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            config: TempDir::new().unwrap(),
            data: TempDir::new().unwrap(),
        }
    }

    fn ghview(&self) -> Command {
        let mut cmd = Command::cargo_bin("ghview").unwrap();
        cmd.env("GHVIEW_CONFIG_DIR", self.config.path())
            .env("GHVIEW_DATA_DIR", self.data.path())
            .env("GHVIEW_KEY_SOURCE", "memory")
            .env_remove("GHVIEW_CLIENT_SECRET")
            .env_remove("RUST_LOG");
        cmd
    }
}

#[test]
fn help_lists_commands() {
    Sandbox::new()
        .ghview()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("auth"))
        .stdout(predicate::str::contains("repos"))
        .stdout(predicate::str::contains("branches"));
}

#[test]
fn status_without_credentials() {
    Sandbox::new()
        .ghview()
        .args(["auth", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not authenticated"))
        .stdout(predicate::str::contains("Key source: memory"));
}

#[test]
fn logout_without_credentials_is_a_noop() {
    Sandbox::new()
        .ghview()
        .args(["auth", "logout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not currently authenticated"));
}

#[test]
fn repos_require_login() {
    Sandbox::new()
        .ghview()
        .args(["repos", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not logged in"));
}

#[test]
fn config_set_then_get() {
    let sandbox = Sandbox::new();

    sandbox
        .ghview()
        .args(["config", "set", "page-size", "50"])
        .assert()
        .success();

    sandbox
        .ghview()
        .args(["config", "get", "page-size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page-size: 50"));

    assert!(sandbox.config.path().join("config.toml").exists());
}

#[test]
fn config_rejects_out_of_range_page_size() {
    Sandbox::new()
        .ghview()
        .args(["config", "set", "page-size", "0"])
        .assert()
        .failure();
}

#[test]
fn config_path_points_into_config_dir() {
    let sandbox = Sandbox::new();
    let expected = sandbox.config.path().join("config.toml");

    sandbox
        .ghview()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(expected.to_string_lossy().to_string()));
}
