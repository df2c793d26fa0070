use provis_logger::{Diagnostics, LogLevel, LoggerError};
use serial_test::serial;

#[test]
#[serial]
fn installs_once_per_process() {
    let diagnostics =
        Diagnostics::builder().name("provis-test").level(LogLevel::Debug).ansi(false).init();
    let diagnostics = diagnostics.unwrap();
    assert_eq!(diagnostics.name(), "provis-test");

    tracing::debug!(target: "provis_logger", "diagnostics ready");

    let second = Diagnostics::builder().name("provis-test").json().init();
    assert!(matches!(second, Err(LoggerError::Subscriber { .. })));
}
