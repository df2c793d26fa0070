//! Logger configuration and its composition into registrations.

use crate::appender::{AppenderConfig, AppenderFactory};
use crate::features::{LoggerFeature, LoggerFeatureKind};
use crate::formatter::FormatterStrategy;
use crate::level::LogLevel;
use provis_kernel::prelude::{Capability, ComposeError, Composable, Registration, compose};
use serde::Deserialize;

/// The merged [`LoggerConfig`].
pub const LOGGER_CONFIG: Capability = Capability::new("logger.config");
/// The active [`SharedFormatter`](crate::SharedFormatter).
pub const LOG_FORMATTER: Capability = Capability::new("logger.formatter");
/// Collection of [`SharedAppender`](crate::SharedAppender)s.
pub const LOG_APPENDERS: Capability = Capability::new("logger.appenders");
/// [`ColorScheme`](crate::ColorScheme) applied to formatted lines.
pub const LOG_COLOR: Capability = Capability::new("logger.color");
/// [`Timestamps`](crate::Timestamps) settings.
pub const LOG_CLOCK: Capability = Capability::new("logger.timestamps");
/// Collection of [`ContextField`](crate::ContextField)s.
pub const LOG_CONTEXT: Capability = Capability::new("logger.context");
/// Collection of [`TargetFilter`](crate::TargetFilter)s.
pub const LOG_FILTERS: Capability = Capability::new("logger.filters");
/// Marker enabling delegation to the enclosing logger.
pub const LOG_CHAIN: Capability = Capability::new("logger.chain");

/// Fully specified logger configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub formatter: FormatterStrategy,
    pub appenders: Vec<AppenderConfig>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            formatter: FormatterStrategy::plain(),
            appenders: vec![AppenderConfig::console()],
        }
    }
}

/// Caller-supplied configuration. Unset fields fall back to [`LoggerConfig::default`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PartialLoggerConfig {
    pub level: Option<LogLevel>,
    pub formatter: Option<FormatterStrategy>,
    pub appenders: Option<Vec<AppenderConfig>>,
}

impl PartialLoggerConfig {
    #[must_use]
    pub const fn with_level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub const fn with_formatter(mut self, formatter: FormatterStrategy) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Replaces the default sinks. An empty list leaves only sinks added through features.
    #[must_use]
    pub fn with_appenders(mut self, appenders: impl IntoIterator<Item = AppenderConfig>) -> Self {
        self.appenders = Some(appenders.into_iter().collect());
        self
    }
}

impl Composable for LoggerConfig {
    type Partial = PartialLoggerConfig;
    type Kind = LoggerFeatureKind;

    const CAPABILITY: Capability = LOGGER_CONFIG;

    fn merge(self, partial: PartialLoggerConfig) -> Self {
        Self {
            level: partial.level.unwrap_or(self.level),
            formatter: partial.formatter.unwrap_or(self.formatter),
            appenders: partial.appenders.unwrap_or(self.appenders),
        }
    }

    fn strategies(&self) -> Vec<Registration> {
        vec![self.formatter.registration()]
    }

    fn sinks(&self) -> Vec<Registration> {
        self.appenders
            .iter()
            .map(|appender| Registration::factory(LOG_APPENDERS, AppenderFactory(appender.clone())))
            .collect()
    }
}

/// Composes the registrations of one logger scope.
///
/// # Errors
/// Returns [`ComposeError::ConfigurationConflict`] when an exclusive feature (color, timestamps,
/// chaining) is supplied more than once.
///
/// # Example
/// ```rust
/// use provis_logger::{LogLevel, PartialLoggerConfig, provide_logger, with_color};
///
/// let registrations =
///     provide_logger(PartialLoggerConfig::default().with_level(LogLevel::Debug), [with_color()])
///         .unwrap();
/// assert_eq!(registrations.len(), 4);
/// ```
pub fn provide_logger(
    partial: PartialLoggerConfig,
    features: impl IntoIterator<Item = LoggerFeature>,
) -> Result<Vec<Registration>, ComposeError> {
    compose::<LoggerConfig>(partial, features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{with_chaining, with_color, with_context, with_timestamps};
    use crate::formatter::{FormatterClass, PlainFormatter};
    use provis_kernel::prelude::Producer;

    #[test]
    fn debug_level_without_features() {
        let registrations =
            provide_logger(PartialLoggerConfig::default().with_level(LogLevel::Debug), []).unwrap();

        let expected = LoggerConfig { level: LogLevel::Debug, ..LoggerConfig::default() };
        assert_eq!(
            registrations,
            vec![
                Registration::value(LOGGER_CONFIG, expected),
                Registration::class(LOG_FORMATTER, FormatterClass::of::<PlainFormatter>().producer()),
                Registration::factory(LOG_APPENDERS, AppenderFactory(AppenderConfig::console()))
                    .multi(),
            ]
        );
    }

    #[test]
    fn duplicate_color_conflicts() {
        let err = provide_logger(PartialLoggerConfig::default(), [with_color(), with_color()])
            .unwrap_err();
        assert!(matches!(err, ComposeError::ConfigurationConflict { ref kind, count: 2, .. } if kind == "color"));
    }

    #[test]
    fn smallest_conflicting_kind_is_reported() {
        let features = [with_chaining(), with_timestamps(), with_chaining(), with_timestamps()];
        let err = provide_logger(PartialLoggerConfig::default(), features).unwrap_err();
        assert!(matches!(err, ComposeError::ConfigurationConflict { ref kind, .. } if kind == "timestamps"));
    }

    #[test]
    fn repeated_multi_features_are_allowed() {
        let registrations = provide_logger(
            PartialLoggerConfig::default().with_appenders([]),
            [with_context("service", "api"), with_context("region", "eu")],
        )
        .unwrap();

        assert_eq!(registrations.len(), 4);
        assert!(registrations[2..].iter().all(Registration::is_multi));
        assert!(matches!(registrations[0].producer(), Producer::Value(_)));
    }
}
