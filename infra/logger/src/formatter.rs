//! Formatter strategies: a formatter type constructed by the scope tree, or a plain function.

use crate::config::LOG_FORMATTER;
use crate::error::LoggerError;
use crate::record::LogRecord;
use provis_kernel::prelude::{ClassProducer, Factory, Instance, Registration, ResolveError, Resolver};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Renders a record into a single line.
pub trait LogFormatter: fmt::Debug + Send + Sync {
    fn format(&self, record: &LogRecord<'_>) -> String;
}

/// Formatter handle as stored in a scope.
pub type SharedFormatter = Arc<dyn LogFormatter>;

/// `2024-01-01T00:00:00Z [INFO] app: message key=value`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlainFormatter;

impl LogFormatter for PlainFormatter {
    fn format(&self, record: &LogRecord<'_>) -> String {
        let mut line = String::with_capacity(record.message.len() + 32);
        if let Some(timestamp) = record.timestamp {
            line.push_str(timestamp);
            line.push(' ');
        }
        line.push('[');
        line.push_str(record.level.label());
        line.push_str("] ");
        line.push_str(record.target);
        line.push_str(": ");
        line.push_str(record.message);
        for field in record.context {
            line.push(' ');
            line.push_str(&field.key);
            line.push('=');
            line.push_str(&field.value);
        }
        line
    }
}

/// One JSON object per record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JsonFormatter;

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    timestamp: Option<&'a str>,
    level: &'static str,
    target: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    context: serde_json::Map<String, serde_json::Value>,
}

impl LogFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord<'_>) -> String {
        let context = record
            .context
            .iter()
            .map(|field| (field.key.to_string(), serde_json::Value::from(field.value.as_ref())))
            .collect();
        let json = JsonRecord {
            timestamp: record.timestamp,
            level: record.level.label(),
            target: record.target,
            message: record.message,
            context,
        };

        serde_json::to_string(&json).unwrap_or_else(|_| PlainFormatter.format(record))
    }
}

/// A formatter type the scope tree constructs with [`Default`].
#[derive(Clone, Copy, PartialEq)]
pub struct FormatterClass(ClassProducer);

impl FormatterClass {
    #[must_use]
    pub fn of<T: LogFormatter + Default + 'static>() -> Self {
        Self(ClassProducer::of::<T>(construct::<T>))
    }

    #[must_use]
    pub const fn producer(&self) -> ClassProducer {
        self.0
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

impl fmt::Debug for FormatterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

#[allow(clippy::unnecessary_wraps)]
fn construct<T: LogFormatter + Default + 'static>(
    _resolver: &Resolver<'_>,
) -> Result<Instance, ResolveError> {
    let formatter: SharedFormatter = Arc::new(T::default());
    Ok(Arc::new(formatter))
}

/// Function-style formatter.
pub type FormatFn = fn(&LogRecord<'_>) -> String;

/// Wraps a [`FormatFn`] so it can serve both as a factory and as the formatter it produces.
#[derive(Clone, Copy)]
pub struct FunctionFormatter(pub FormatFn);

impl LogFormatter for FunctionFormatter {
    fn format(&self, record: &LogRecord<'_>) -> String {
        (self.0)(record)
    }
}

impl Factory for FunctionFormatter {
    fn produce(&self, _resolver: &Resolver<'_>) -> Result<Instance, ResolveError> {
        let formatter: SharedFormatter = Arc::new(*self);
        Ok(Arc::new(formatter))
    }
}

impl PartialEq for FunctionFormatter {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.0, other.0)
    }
}

impl fmt::Debug for FunctionFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionFormatter").field(&(self.0 as *const ())).finish()
    }
}

/// How a logger turns records into lines.
#[derive(Clone, Copy)]
pub enum FormatterStrategy {
    Class(FormatterClass),
    Function(FormatFn),
}

impl FormatterStrategy {
    #[must_use]
    pub fn plain() -> Self {
        Self::Class(FormatterClass::of::<PlainFormatter>())
    }

    #[must_use]
    pub fn json() -> Self {
        Self::Class(FormatterClass::of::<JsonFormatter>())
    }

    /// The registration supplying [`LOG_FORMATTER`] for this strategy.
    #[must_use]
    pub fn registration(&self) -> Registration {
        match *self {
            Self::Class(class) => Registration::class(LOG_FORMATTER, class.producer()),
            Self::Function(format) => {
                Registration::factory(LOG_FORMATTER, FunctionFormatter(format))
            },
        }
    }
}

impl Default for FormatterStrategy {
    fn default() -> Self {
        Self::plain()
    }
}

impl PartialEq for FormatterStrategy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Class(a), Self::Class(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => std::ptr::fn_addr_eq(*a, *b),
            _ => false,
        }
    }
}

impl fmt::Debug for FormatterStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(class) => fmt::Debug::fmt(class, f),
            Self::Function(format) => fmt::Debug::fmt(&FunctionFormatter(*format), f),
        }
    }
}

impl FromStr for FormatterStrategy {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" => Ok(Self::plain()),
            "json" => Ok(Self::json()),
            other => Err(LoggerError::InvalidConfiguration {
                message: format!("unknown formatter '{other}', expected 'plain' or 'json'").into(),
                context: None,
            }),
        }
    }
}

impl<'de> Deserialize<'de> for FormatterStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::record::ContextField;

    fn shout(record: &LogRecord<'_>) -> String {
        record.message.to_uppercase()
    }

    fn whisper(record: &LogRecord<'_>) -> String {
        record.message.to_lowercase()
    }

    fn record<'a>(context: &'a [ContextField], timestamp: Option<&'a str>) -> LogRecord<'a> {
        LogRecord { level: LogLevel::Warn, target: "db", message: "slow query", timestamp, context }
    }

    #[test]
    fn plain_layout() {
        let context = [ContextField::new("ms", "350")];
        assert_eq!(PlainFormatter.format(&record(&[], None)), "[WARN] db: slow query");
        assert_eq!(
            PlainFormatter.format(&record(&context, Some("2024-01-01T00:00:00Z"))),
            "2024-01-01T00:00:00Z [WARN] db: slow query ms=350"
        );
    }

    #[test]
    fn json_layout() {
        let context = [ContextField::new("ms", "350")];
        let line = JsonFormatter.format(&record(&context, None));
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["target"], "db");
        assert_eq!(value["context"]["ms"], "350");
        assert!(value.get("timestamp").is_none());
    }

    #[test]
    fn strategies_compare_structurally() {
        assert_eq!(FormatterStrategy::plain(), FormatterStrategy::default());
        assert_ne!(FormatterStrategy::plain(), FormatterStrategy::json());
        assert_eq!(FormatterStrategy::Function(shout), FormatterStrategy::Function(shout));
        assert_ne!(FormatterStrategy::Function(shout), FormatterStrategy::Function(whisper));
        assert_ne!(FormatterStrategy::Function(shout), FormatterStrategy::plain());
    }

    #[test]
    fn parses_builtin_names() {
        assert_eq!("JSON".parse::<FormatterStrategy>().unwrap(), FormatterStrategy::json());
        assert!(matches!(
            "xml".parse::<FormatterStrategy>(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }
}
