use assert_cmd::Command;
use predicates::prelude::*;

fn checkflow() -> Command {
    Command::cargo_bin("checkflow").unwrap()
}

#[test]
fn help_names_the_product() {
    checkflow()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Decision-support backend"));
}

#[test]
fn serve_help_lists_port_and_host() {
    checkflow()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port").and(predicate::str::contains("--host")));
}

#[test]
fn serve_without_database_url_fails() {
    checkflow()
        .env_remove("DATABASE_URL")
        .arg("serve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL"));
}
