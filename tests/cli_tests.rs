mod common;

use assert_cmd::Command;
use predicates::str::contains;
use std::path::Path;

fn script(base: &Path, input: &str) -> assert_cmd::assert::Assert {
    Command::cargo_bin("spendwise_cli")
        .unwrap()
        .env("SPENDWISE_HOME", base)
        .env("SPENDWISE_CLI_SCRIPT", "1")
        .env("NO_COLOR", "1")
        .write_stdin(input.to_string())
        .assert()
}

#[test]
fn script_mode_records_and_lists_transactions() {
    let base = common::temp_base();
    script(
        &base,
        "user set demo\n\
         transaction add 42.5 want \"Concert tickets\"\n\
         transaction add 1000 income Salary\n\
         transaction list\n\
         transaction total\n\
         exit\n",
    )
    .success()
    .stdout(contains("Active user set to `demo`"))
    .stdout(contains("Concert tickets"))
    .stdout(contains("Net total across 2 transactions: 957.50 USD"));

    let raw = std::fs::read_to_string(base.join("data").join("transactions.json")).unwrap();
    assert!(raw.contains("Salary"));
}

#[test]
fn unknown_command_suggests_closest_name() {
    let base = common::temp_base();
    script(&base, "trasaction list\nexit\n")
        .success()
        .stdout(contains("Unknown command `trasaction`"))
        .stdout(contains("Suggestion: `transaction`?"));
}

#[test]
fn errors_are_reported_without_stopping_the_script() {
    let base = common::temp_base();
    script(
        &base,
        "transaction list\n\
         user set demo\n\
         transaction add -5 need\n\
         goal add Bike 300\n\
         goal list\n",
    )
    .success()
    .stdout(contains("No active user"))
    .stdout(contains("is not a positive amount"))
    .stdout(contains("Bike"));
}

#[test]
fn recurring_templates_process_once() {
    let base = common::temp_base();
    script(
        &base,
        "user set demo\n\
         recurring add Rent 1500 need monthly --start 2020-01-01\n\
         recurring process\n\
         recurring process\n\
         recurring list\n",
    )
    .success()
    .stdout(contains("Created Monthly template `Rent`"))
    .stdout(contains("Created 1 transaction(s)."))
    .stdout(contains("Nothing is due today."));
}

#[test]
fn one_shot_mode_runs_a_single_command() {
    let base = common::temp_base();
    Command::cargo_bin("spendwise_cli")
        .unwrap()
        .env("SPENDWISE_HOME", &base)
        .env_remove("SPENDWISE_CLI_SCRIPT")
        .args(["config", "set", "currency", "eur"])
        .assert()
        .success()
        .stdout(contains("Set currency"));

    let config = std::fs::read_to_string(base.join("config").join("config.json")).unwrap();
    assert!(config.contains("\"EUR\""));

    Command::cargo_bin("spendwise_cli")
        .unwrap()
        .env("SPENDWISE_HOME", &base)
        .env_remove("SPENDWISE_CLI_SCRIPT")
        .arg("nonsense")
        .assert()
        .failure()
        .stderr(contains("Error:"));
}

#[test]
fn backups_can_be_listed() {
    let base = common::temp_base();
    script(
        &base,
        "user set demo\n\
         transaction add 10 need\n\
         backup create nightly\n\
         backup list\n",
    )
    .success()
    .stdout(contains("_nightly"));
}
