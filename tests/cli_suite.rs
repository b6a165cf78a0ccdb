use assert_cmd::Command;
use predicates::prelude::*;

// Helper function to initialize the command to test.
fn pkgfacts() -> Command {
    Command::new(env!("CARGO_BIN_EXE_pkgfacts"))
}

#[test]
fn test_help_command() {
    let mut cmd = pkgfacts();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "heterogeneous package managers",
        ));
}

#[test]
fn test_version_flag() {
    let mut cmd = pkgfacts();

    let version = env!("CARGO_PKG_VERSION");
    let expected = format!("pkgfacts {}", version);

    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[test]
fn test_unknown_command_fails_with_usage() {
    let mut cmd = pkgfacts();

    cmd.arg("unknown-command-xyz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: pkgfacts"));
}

#[test]
fn test_search_requires_a_term() {
    let mut cmd = pkgfacts();

    cmd.arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("TERM"));
}

#[test]
fn test_unsupported_manager_is_a_configuration_error() {
    let mut cmd = pkgfacts();

    cmd.args(["search", "curl", "-m", "slackpkg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "unsupported manager(s) requested: slackpkg",
        ));
}

#[test]
fn test_managers_lists_every_family() {
    let mut cmd = pkgfacts();

    let mut assert = cmd.arg("managers").assert().success();
    for family in ["rpm", "apt", "pacman", "pkg", "portage", "apk", "pkg_info"] {
        assert = assert.stdout(predicate::str::contains(family));
    }
}

#[test]
fn test_managers_json_is_parseable() {
    let mut cmd = pkgfacts();

    let output = cmd.args(["managers", "--json"]).output().unwrap();
    assert!(output.status.success());

    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = parsed.as_array().unwrap();
    assert_eq!(rows.len(), 7);
    assert!(rows.iter().all(|row| row["name"].is_string() && row["available"].is_boolean()));
}
