//! Output sinks. Each configured appender is registered as one entry of the appender collection.

use crate::error::{LoggerError, LoggerErrorExt as _};
use crate::level::LogLevel;
use parking_lot::Mutex;
use provis_kernel::prelude::{Factory, Instance, ResolveError, Resolver};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

const LOG_FILE_SUFFIX: &str = "log";
const DEFAULT_FILE_PREFIX: &str = "provis";

/// Target used for records forwarded into `tracing`.
pub const TRACING_TARGET: &str = "provis::log";

/// Writes formatted lines somewhere.
pub trait LogAppender: fmt::Debug + Send + Sync {
    /// # Errors
    /// Returns [`LoggerError`] when the line cannot be written.
    fn append(&self, level: LogLevel, line: &str) -> Result<(), LoggerError>;

    /// Whether this sink receives lines painted by the color feature.
    fn ansi(&self) -> bool {
        false
    }

    /// # Errors
    /// Returns [`LoggerError`] when buffered output cannot be written.
    fn flush(&self) -> Result<(), LoggerError> {
        Ok(())
    }
}

/// Appender handle as stored in a scope.
pub type SharedAppender = Arc<dyn LogAppender>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsoleStream {
    #[default]
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<FileRotation> for Rotation {
    fn from(rotation: FileRotation) -> Self {
        match rotation {
            FileRotation::Minutely => Self::MINUTELY,
            FileRotation::Hourly => Self::HOURLY,
            FileRotation::Daily => Self::DAILY,
            FileRotation::Never => Self::NEVER,
        }
    }
}

/// In-process line buffer. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
    ansi: bool,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A buffer that records lines painted by the color feature, like a terminal would.
    #[must_use]
    pub fn with_ansi() -> Self {
        Self { lines: Arc::default(), ansi: true }
    }

    /// Snapshot of every line written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }

    fn push(&self, line: &str) {
        self.lines.lock().push(line.to_owned());
    }
}

impl PartialEq for MemorySink {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.lines, &other.lines)
    }
}

/// Declarative description of a sink.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AppenderConfig {
    Console {
        #[serde(default)]
        stream: ConsoleStream,
    },
    /// Rolling files named `<prefix>.<date>.log` under `directory`.
    File {
        directory: PathBuf,
        #[serde(default = "default_prefix")]
        prefix: String,
        #[serde(default)]
        rotation: FileRotation,
    },
    /// Forwards lines into `tracing` under [`TRACING_TARGET`].
    Tracing,
    #[serde(skip_deserializing)]
    Memory(MemorySink),
}

fn default_prefix() -> String {
    DEFAULT_FILE_PREFIX.to_owned()
}

impl Default for AppenderConfig {
    fn default() -> Self {
        Self::Console { stream: ConsoleStream::Stdout }
    }
}

impl AppenderConfig {
    #[must_use]
    pub const fn console() -> Self {
        Self::Console { stream: ConsoleStream::Stdout }
    }

    pub fn file(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self::File { directory: directory.into(), prefix: prefix.into(), rotation: FileRotation::Daily }
    }

    #[must_use]
    pub const fn memory(sink: MemorySink) -> Self {
        Self::Memory(sink)
    }

    /// Opens the sink.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty file prefix.
    /// * [`LoggerError::Io`] when the log directory cannot be created.
    /// * [`LoggerError::Appender`] when the rolling file cannot be opened.
    pub fn build(&self) -> Result<SharedAppender, LoggerError> {
        Ok(match self {
            Self::Console { stream } => Arc::new(ConsoleAppender { stream: *stream }),
            Self::File { directory, prefix, rotation } => {
                if prefix.trim().is_empty() {
                    return Err(LoggerError::InvalidConfiguration {
                        message: "file appender prefix cannot be empty".into(),
                        context: None,
                    });
                }
                std::fs::create_dir_all(directory).context(format!(
                    "Failed to create log directory: {}",
                    directory.display()
                ))?;

                let writer = RollingFileAppender::builder()
                    .rotation((*rotation).into())
                    .filename_prefix(prefix)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .build(directory)?;
                Arc::new(FileAppender { writer: Mutex::new(writer) })
            },
            Self::Tracing => Arc::new(TracingAppender),
            Self::Memory(sink) => Arc::new(MemoryAppender(sink.clone())),
        })
    }
}

/// Factory registered for every configured appender; the sink is opened on first resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct AppenderFactory(pub AppenderConfig);

impl Factory for AppenderFactory {
    fn produce(&self, _resolver: &Resolver<'_>) -> Result<Instance, ResolveError> {
        let appender = self
            .0
            .build()
            .map_err(|err| ResolveError::Construction { source: Box::new(err), context: None })?;
        Ok(Arc::new(appender))
    }
}

#[derive(Debug)]
struct ConsoleAppender {
    stream: ConsoleStream,
}

impl LogAppender for ConsoleAppender {
    fn append(&self, _level: LogLevel, line: &str) -> Result<(), LoggerError> {
        match self.stream {
            ConsoleStream::Stdout => writeln!(std::io::stdout().lock(), "{line}")?,
            ConsoleStream::Stderr => writeln!(std::io::stderr().lock(), "{line}")?,
        }
        Ok(())
    }

    fn ansi(&self) -> bool {
        true
    }

    fn flush(&self) -> Result<(), LoggerError> {
        match self.stream {
            ConsoleStream::Stdout => std::io::stdout().flush()?,
            ConsoleStream::Stderr => std::io::stderr().flush()?,
        }
        Ok(())
    }
}

struct FileAppender {
    writer: Mutex<RollingFileAppender>,
}

impl fmt::Debug for FileAppender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileAppender").finish_non_exhaustive()
    }
}

impl LogAppender for FileAppender {
    fn append(&self, _level: LogLevel, line: &str) -> Result<(), LoggerError> {
        writeln!(self.writer.lock(), "{line}")?;
        Ok(())
    }

    fn flush(&self) -> Result<(), LoggerError> {
        self.writer.lock().flush()?;
        Ok(())
    }
}

#[derive(Debug)]
struct TracingAppender;

impl LogAppender for TracingAppender {
    fn append(&self, level: LogLevel, line: &str) -> Result<(), LoggerError> {
        match level {
            LogLevel::Trace => tracing::trace!(target: TRACING_TARGET, "{line}"),
            LogLevel::Debug => tracing::debug!(target: TRACING_TARGET, "{line}"),
            LogLevel::Info => tracing::info!(target: TRACING_TARGET, "{line}"),
            LogLevel::Warn => tracing::warn!(target: TRACING_TARGET, "{line}"),
            LogLevel::Error => tracing::error!(target: TRACING_TARGET, "{line}"),
            LogLevel::Off => {},
        }
        Ok(())
    }
}

#[derive(Debug)]
struct MemoryAppender(MemorySink);

impl LogAppender for MemoryAppender {
    fn append(&self, _level: LogLevel, line: &str) -> Result<(), LoggerError> {
        self.0.push(line);
        Ok(())
    }

    fn ansi(&self) -> bool {
        self.0.ansi
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_sinks_compare_by_identity() {
        let sink = MemorySink::new();
        assert_eq!(AppenderConfig::memory(sink.clone()), AppenderConfig::memory(sink));
        assert_ne!(AppenderConfig::memory(MemorySink::new()), AppenderConfig::memory(MemorySink::new()));
    }

    #[test]
    fn memory_appender_shares_its_buffer() -> Result<(), LoggerError> {
        let sink = MemorySink::new();
        let appender = AppenderConfig::memory(sink.clone()).build()?;
        appender.append(LogLevel::Info, "one")?;
        appender.append(LogLevel::Error, "two")?;
        assert_eq!(sink.lines(), ["one", "two"]);
        sink.clear();
        assert!(sink.lines().is_empty());
        Ok(())
    }

    #[test]
    fn deserializes_tagged_appenders() {
        let console: AppenderConfig = serde_json::from_str(r#"{"kind":"console","stream":"stderr"}"#).unwrap();
        assert_eq!(console, AppenderConfig::Console { stream: ConsoleStream::Stderr });

        let file: AppenderConfig = serde_json::from_str(r#"{"kind":"file","directory":"logs"}"#).unwrap();
        assert_eq!(file, AppenderConfig::file("logs", "provis"));

        assert!(serde_json::from_str::<AppenderConfig>(r#"{"kind":"memory"}"#).is_err());
    }

    #[test]
    fn only_terminal_like_sinks_take_color() -> Result<(), LoggerError> {
        assert!(AppenderConfig::console().build()?.ansi());
        assert!(!AppenderConfig::Tracing.build()?.ansi());
        assert!(!AppenderConfig::memory(MemorySink::new()).build()?.ansi());
        assert!(AppenderConfig::memory(MemorySink::with_ansi()).build()?.ansi());
        Ok(())
    }

    #[test]
    fn empty_file_prefix_is_rejected() {
        let err = AppenderConfig::file("logs", " ").build().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
