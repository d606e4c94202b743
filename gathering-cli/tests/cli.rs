use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_subcommand() {
    let mut cmd = Command::cargo_bin("gathering-cli").unwrap();

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("signup"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("create"))
        .stdout(predicate::str::contains("like"))
        .stdout(predicate::str::contains("comment"))
        .stdout(predicate::str::contains("stats"))
        .stdout(predicate::str::contains("health"));
}

#[test]
fn signup_requires_its_arguments() {
    let mut cmd = Command::cargo_bin("gathering-cli").unwrap();

    cmd.arg("signup")
        .arg("--name")
        .arg("Ada")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
fn status_without_a_session_reports_it() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = Command::cargo_bin("gathering-cli").unwrap();

    cmd.arg("--session-file")
        .arg(dir.path().join("session.json"))
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No session found"));
}
