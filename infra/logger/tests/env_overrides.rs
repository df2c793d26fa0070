//! Environment overrides are checked in a child run of this test binary, so the variables never
//! touch the environment of the parent process.

use provis_logger::{LogLevel, LoggerSettings};
use serial_test::serial;
use std::process::Command;

const CHILD_RUN: &str = "LOGGER_ENV_OVERRIDE_CHILD";

#[test]
#[serial]
fn environment_overrides_file_values() {
    if std::env::var_os(CHILD_RUN).is_some() {
        let settings = LoggerSettings::from_toml(r#"level = "debug""#).unwrap();
        assert_eq!(settings.level, Some(LogLevel::Warn));
        return;
    }

    let status = Command::new(std::env::current_exe().unwrap())
        .args(["--exact", "environment_overrides_file_values", "--test-threads=1"])
        .env(CHILD_RUN, "1")
        .env("PROVIS__LEVEL", "warn")
        .status()
        .unwrap();
    assert!(status.success(), "child run failed: {status}");
}

#[test]
#[serial]
fn file_value_applies_without_override() {
    if std::env::var_os("PROVIS__LEVEL").is_some() {
        return;
    }
    let settings = LoggerSettings::from_toml(r#"level = "debug""#).unwrap();
    assert_eq!(settings.level, Some(LogLevel::Debug));
}
