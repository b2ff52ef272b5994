//! End-to-end tests for the `logrig` binary.
//!
//! These exercise the wiring from process arguments through `logrig-cli`
//! down to the files the commands produce, and confirm that an initialized
//! file actually provisions a working logger. Per-command edge cases are
//! covered in depth inside the `logrig-cli` crate.

use assert_cmd::Command;
use logrig_conf::{ConfigFile, FILE_NAME, MASTER_SECTION};
use logrig_core::facade::LoggerFacade;
use logrig_core::handler::sink::ConsoleCapture;
use logrig_core::normalize;
use predicates::prelude::*;
use tempfile::TempDir;

fn logrig() -> Command {
    Command::cargo_bin("logrig").expect("logrig binary is built for tests")
}

#[test]
fn version_flag_prints_and_succeeds() {
    logrig()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")))
        .stderr(predicate::str::is_empty());
}

#[test]
fn help_lists_the_subcommands() {
    logrig()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("add"))
                .and(predicate::str::contains("remove"))
                .and(predicate::str::contains("upgrade")),
        );
}

#[test]
fn init_add_remove_lifecycle_edits_one_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();

    logrig()
        .args(["init", "-p", root])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    logrig()
        .args(["add", "worker", "-p", root, "--level", "info"])
        .assert()
        .success();

    let file = ConfigFile::load(dir.path().join(FILE_NAME)).unwrap();
    assert!(file.has_section("worker"));
    assert!(file.has_section(MASTER_SECTION));

    logrig()
        .args(["remove", "worker", "-p", root])
        .assert()
        .success();

    let file = ConfigFile::load(dir.path().join(FILE_NAME)).unwrap();
    assert!(!file.has_section("worker"));
}

#[test]
fn initialized_files_provision_working_loggers() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();

    logrig().args(["init", "-p", root]).assert().success();

    let file = ConfigFile::load(dir.path().join(FILE_NAME)).unwrap();
    let logger = LoggerFacade::from_source("cli-e2e", MASTER_SECTION, &file).unwrap();
    assert_eq!(logger.handlers().len(), 1);

    let capture = ConsoleCapture::install();
    logger.info("ready");
    assert!(capture.stderr().contains(" - cli-e2e - INFO - ready"));
}

#[test]
fn upgrade_rewrites_legacy_files_and_reports_the_path() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();
    std::fs::write(
        dir.path().join(FILE_NAME),
        "[logrig]\nlevel = DEBUG\nStreamHandler =\n\tactive: True\n",
    )
    .unwrap();

    logrig()
        .args(["upgrade", "-p", root])
        .assert()
        .success()
        .stdout(predicate::str::contains("upgraded"));

    let file = ConfigFile::load(dir.path().join(FILE_NAME)).unwrap();
    let normalized = normalize(&file.logger_section(MASTER_SECTION).unwrap()).unwrap();
    assert!(normalized.advisories.is_empty());
    assert_eq!(normalized.config.handlers[0].key, "stream");
}

#[test]
fn command_failures_exit_one_with_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().to_str().unwrap();

    logrig().args(["init", "-p", root]).assert().success();
    logrig()
        .args(["remove", "logrig", "-p", root])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("master configuration"));
}

#[test]
fn usage_errors_exit_two() {
    logrig().arg("destroy").assert().code(2);
}
