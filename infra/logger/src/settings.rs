//! File-loadable logger settings.

use crate::appender::AppenderConfig;
use crate::config::{PartialLoggerConfig, provide_logger};
use crate::error::LoggerError;
use crate::features::{FeatureSpec, LoggerFeature};
use crate::formatter::FormatterStrategy;
use crate::level::LogLevel;
use provis_kernel::config::{load_config, load_config_str};
use provis_kernel::prelude::{ComposeError, Registration};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Logger settings as written in a configuration file.
///
/// ```toml
/// level = "debug"
/// formatter = "json"
/// appenders = [{ kind = "console", stream = "stderr" }]
/// features = ["color", { kind = "context", key = "service", value = "api" }]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub level: Option<LogLevel>,
    pub formatter: Option<FormatterStrategy>,
    pub appenders: Option<Vec<AppenderConfig>>,
    pub features: Vec<FeatureSpec>,
}

impl LoggerSettings {
    /// Loads settings from a file, with `PROVIS__` environment overrides.
    ///
    /// # Errors
    /// Returns [`LoggerError::Settings`] when the file is missing or malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoggerError> {
        Ok(load_config(path)?)
    }

    /// # Errors
    /// Returns [`LoggerError::Settings`] when the document is malformed.
    pub fn from_toml(toml: &str) -> Result<Self, LoggerError> {
        Ok(load_config_str(toml)?)
    }

    #[must_use]
    pub fn partial(&self) -> PartialLoggerConfig {
        PartialLoggerConfig {
            level: self.level,
            formatter: self.formatter,
            appenders: self.appenders.clone(),
        }
    }

    /// # Errors
    /// Returns the first feature that cannot be built.
    pub fn features(&self) -> Result<Vec<LoggerFeature>, ComposeError> {
        self.features.iter().map(FeatureSpec::build).collect()
    }

    /// Composes the registrations described by these settings.
    ///
    /// # Errors
    /// Returns [`LoggerError::Compose`] for unknown, incomplete or conflicting features.
    pub fn into_registrations(self) -> Result<Vec<Registration>, LoggerError> {
        let features = self.features()?;
        debug!(features = features.len(), "Composing logger from settings");
        Ok(provide_logger(self.partial(), features)?)
    }
}
