use crate::level::LogLevel;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A key/value pair attached to every record emitted by a logger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextField {
    pub key: Cow<'static, str>,
    pub value: Cow<'static, str>,
}

impl ContextField {
    pub fn new(key: impl Into<Cow<'static, str>>, value: impl Into<Cow<'static, str>>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// A single log event as seen by formatters.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub level: LogLevel,
    pub target: &'a str,
    pub message: &'a str,
    /// Rendered timestamp, present when the timestamps feature is enabled.
    pub timestamp: Option<&'a str>,
    pub context: &'a [ContextField],
}
