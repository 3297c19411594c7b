use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn tourist(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tourist").unwrap();
    cmd.env("TOURIST_HOME", home)
        .env("NO_COLOR", "1")
        .env_remove("FLICKR_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_pin_add_and_list() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .args(["pin", "add", "-33.86", "151.21"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pin added"));

    tourist(temp_dir.path())
        .args(["pin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("-33.86000"))
        .stdout(predicate::str::contains("151.21000"))
        .stdout(predicate::str::contains("no photos"));

    assert!(temp_dir.path().join("data.json").exists());
}

#[test]
fn test_default_command_lists_pins() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No pins yet"));
}

#[test]
fn test_duplicate_pin_is_not_added_twice() {
    let temp_dir = tempfile::tempdir().unwrap();

    for _ in 0..2 {
        tourist(temp_dir.path())
            .args(["pin", "add", "48.85", "2.35"])
            .assert()
            .success();
    }

    tourist(temp_dir.path())
        .args(["pin", "ls"])
        .assert()
        .success()
        .stdout(predicate::function(|out: &str| out.lines().count() == 1));
}

#[test]
fn test_invalid_coordinate_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .args(["pin", "add", "91", "0"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_pin_rm() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .args(["pin", "add", "10", "20"])
        .assert()
        .success();

    tourist(temp_dir.path())
        .args(["pin", "rm", "1"])
        .assert()
        .success();

    tourist(temp_dir.path())
        .args(["pin", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pins yet"));
}

#[test]
fn test_unknown_pin_index_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .args(["photos", "3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_config_set_and_get() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .args(["config", "per-page", "20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("per-page set to 20"));

    tourist(temp_dir.path())
        .args(["config", "per-page"])
        .assert()
        .success()
        .stdout(predicate::str::contains("20"));

    tourist(temp_dir.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("max-page = 10"));
}

#[test]
fn test_doctor_on_clean_store() {
    let temp_dir = tempfile::tempdir().unwrap();

    tourist(temp_dir.path())
        .args(["pin", "add", "10", "20"])
        .assert()
        .success();

    tourist(temp_dir.path())
        .arg("doctor")
        .assert()
        .success();
}
