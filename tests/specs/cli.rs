//! `indexer` CLI argument-parsing specs — the slice of the surface that
//! doesn't require a live Postgres instance to exercise.

use assert_cmd::Command;

fn indexer() -> Command {
    Command::cargo_bin("indexer").expect("indexer binary should build")
}

#[test]
fn no_subcommand_shows_usage() {
    let output = indexer().output().expect("indexer should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"), "expected usage text, got: {stderr}");
}

#[test]
fn help_lists_all_key_commands() {
    let output = indexer().arg("--help").output().expect("indexer should run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["create-key", "list-keys", "revoke-key", "rotate-key"] {
        assert!(stdout.contains(name), "expected --help to mention '{name}', got: {stdout}");
    }
}

#[test]
fn create_key_without_name_fails() {
    let output = indexer().arg("create-key").output().expect("indexer should run");
    assert!(!output.status.success());
}

#[test]
fn revoke_key_requires_a_valid_uuid() {
    let output =
        indexer().args(["revoke-key", "--id", "not-a-uuid"]).output().expect("indexer should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("id"), "expected a uuid parse error mentioning 'id', got: {stderr}");
}
