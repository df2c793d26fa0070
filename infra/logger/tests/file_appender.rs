use provis_kernel::prelude::{ScopeId, ScopeTree};
use provis_logger::{
    AppenderConfig, FormatterStrategy, Logger, PartialLoggerConfig, provide_logger, with_color,
};
use std::fs;

#[test]
fn file_appender_writes_rolling_log() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");

    let partial =
        PartialLoggerConfig::default().with_appenders([AppenderConfig::file(&log_dir, "shell")]);
    let tree = ScopeTree::new(provide_logger(partial, [])?);
    let logger = Logger::from_scope(&tree, ScopeId::ROOT)?;

    logger.info("persisted");
    logger.flush();

    let logs: Vec<_> = fs::read_dir(&log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("log"))
        .collect();
    assert_eq!(logs.len(), 1, "exactly one log file should be created");

    let contents = fs::read_to_string(&logs[0])?;
    assert!(contents.contains("[INFO] app: persisted"));
    Ok(())
}

#[test]
fn colored_json_logger_keeps_file_lines_parseable() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let log_dir = dir.path().join("logs");

    let partial = PartialLoggerConfig::default()
        .with_formatter(FormatterStrategy::json())
        .with_appenders([AppenderConfig::file(&log_dir, "json")]);
    let tree = ScopeTree::new(provide_logger(partial, [with_color()])?);
    let logger = Logger::from_scope(&tree, ScopeId::ROOT)?;

    logger.info("hi");
    logger.flush();

    let log = fs::read_dir(&log_dir)?.flatten().next().map(|entry| entry.path());
    let contents = fs::read_to_string(log.ok_or("no log file created")?)?;
    let line = contents.lines().next().ok_or("empty log file")?;
    assert!(!line.contains('\x1b'), "file lines must not carry escape codes: {line:?}");

    let value: serde_json::Value = serde_json::from_str(line)?;
    assert_eq!(value["level"], "INFO");
    assert_eq!(value["message"], "hi");
    Ok(())
}
