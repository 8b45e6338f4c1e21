//! End-to-end CLI tests for the asset-preview binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::mock_store::MockStore;
use tempfile::TempDir;

/// Binary command with the default config location pointed at an empty dir.
fn cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("asset-preview").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

/// Runs a blocking command from inside the async test runtime.
async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[test]
fn test_binary_help_displays_usage() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preview images"))
        .stdout(predicate::str::contains("--rate-limit"));
}

#[test]
fn test_binary_version_displays_version() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("asset-preview"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_without_product_id_fails() {
    let config_home = TempDir::new().unwrap();
    cmd(&config_home)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No product id"));
}

#[test]
fn test_binary_rejects_invalid_config_file() {
    let config_home = TempDir::new().unwrap();
    let config_path = config_home.path().join("bad.toml");
    std::fs::write(&config_path, "requests_per_second = 99999\n").unwrap();

    cmd(&config_home)
        .arg("1")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requests_per_second"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_downloads_and_exits_zero() {
    let store = MockStore::start().await;
    store.mount_session().await;
    store.mount_catalog(&[("g1", "a.png", "file"), ("g2", "b.txt", "file")]).await;
    store.mount_thumbnails(&[]).await;
    store.mount_image("g1", 200, b"image").await;
    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut command = cmd(&config_home);
    command
        .args(["55", "--no-progress", "--thumbnail-scheme", "http"])
        .arg("--base-url")
        .arg(store.base_url())
        .arg("--output-dir")
        .arg(output.path());

    run_blocking(command)
        .await
        .code(0)
        .stdout(predicate::str::contains("Downloaded 1"));

    assert_eq!(
        std::fs::read(output.path().join("55").join("g1.png")).unwrap(),
        b"image"
    );
    assert!(!output.path().join("55").join("g2.txt").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_partial_failure_exits_two() {
    let store = MockStore::start().await;
    store.mount_session().await;
    store.mount_catalog(&[("g1", "a.png", "file"), ("g2", "b.png", "file")]).await;
    store.mount_thumbnails(&[]).await;
    store.mount_image("g1", 200, b"image").await;
    store.mount_image("g2", 500, b"").await;
    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let mut command = cmd(&config_home);
    command
        .args(["55", "-q", "--thumbnail-scheme", "http"])
        .arg("--base-url")
        .arg(store.base_url())
        .arg("-o")
        .arg(output.path());

    run_blocking(command).await.code(2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_reads_product_id_from_config_file() {
    let store = MockStore::start().await;
    store.mount_session().await;
    store.mount_catalog(&[]).await;
    let config_home = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let app_dir = config_home.path().join("asset-preview");
    std::fs::create_dir_all(&app_dir).unwrap();
    std::fs::write(
        app_dir.join("config.toml"),
        format!(
            "product_id = \"77\"\nbase_url = \"{}\"\noutput_dir = \"{}\"\n",
            store.base_url(),
            output.path().display()
        ),
    )
    .unwrap();

    run_blocking(cmd(&config_home)).await.code(0);
    assert!(output.path().join("77").is_dir());
}
