//! Optional logger features and their named constructors.

use crate::appender::{AppenderConfig, AppenderFactory};
use crate::config::{LOG_APPENDERS, LOG_CHAIN, LOG_CLOCK, LOG_COLOR, LOG_CONTEXT, LOG_FILTERS};
use crate::level::LogLevel;
use crate::record::ContextField;
use chrono::{DateTime, Utc};
use provis_kernel::prelude::{ComposeError, Feature, FeatureKind, Registration, parse_kind};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::Write as _;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

/// Feature bundle accepted by [`provide_logger`](crate::provide_logger).
pub type LoggerFeature = Feature<LoggerFeatureKind>;

/// Every feature a logger scope understands. Declaration order decides which conflict is
/// reported first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum LoggerFeatureKind {
    Color,
    Timestamps,
    Context,
    Filter,
    Appender,
    Chaining,
}

impl FeatureKind for LoggerFeatureKind {
    fn is_exclusive(self) -> bool {
        matches!(self, Self::Color | Self::Timestamps | Self::Chaining)
    }
}

const RESET: &str = "\x1b[0m";

/// ANSI escape prefixes per level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorScheme {
    pub trace: Cow<'static, str>,
    pub debug: Cow<'static, str>,
    pub info: Cow<'static, str>,
    pub warn: Cow<'static, str>,
    pub error: Cow<'static, str>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            trace: Cow::Borrowed("\x1b[90m"),
            debug: Cow::Borrowed("\x1b[36m"),
            info: Cow::Borrowed("\x1b[32m"),
            warn: Cow::Borrowed("\x1b[33m"),
            error: Cow::Borrowed("\x1b[31m"),
        }
    }
}

impl ColorScheme {
    #[must_use]
    pub fn code(&self, level: LogLevel) -> Option<&str> {
        match level {
            LogLevel::Trace => Some(&*self.trace),
            LogLevel::Debug => Some(&*self.debug),
            LogLevel::Info => Some(&*self.info),
            LogLevel::Warn => Some(&*self.warn),
            LogLevel::Error => Some(&*self.error),
            LogLevel::Off => None,
        }
    }

    /// Wraps `line` in the level's escape sequence.
    #[must_use]
    pub fn paint(&self, level: LogLevel, line: &str) -> String {
        match self.code(level) {
            Some(code) if !code.is_empty() => format!("{code}{line}{RESET}"),
            _ => line.to_owned(),
        }
    }
}

/// Source of record timestamps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    #[default]
    System,
    /// Always reports the same instant.
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(instant) => *instant,
        }
    }
}

/// `strftime` layout used when none is given.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamps {
    pub clock: Clock,
    pub format: Cow<'static, str>,
}

impl Default for Timestamps {
    fn default() -> Self {
        Self { clock: Clock::System, format: Cow::Borrowed(DEFAULT_TIMESTAMP_FORMAT) }
    }
}

impl Timestamps {
    /// Renders the current instant. An invalid layout falls back to RFC 3339.
    #[must_use]
    pub fn render(&self) -> String {
        let now = self.clock.now();
        let mut rendered = String::new();
        if write!(rendered, "{}", now.format(&self.format)).is_err() {
            return now.to_rfc3339();
        }
        rendered
    }
}

/// Overrides the threshold for targets starting with `prefix`. The longest matching prefix wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFilter {
    pub prefix: Cow<'static, str>,
    pub level: LogLevel,
}

impl TargetFilter {
    #[must_use]
    pub fn matches(&self, target: &str) -> bool {
        target.starts_with(self.prefix.as_ref())
    }
}

/// Presence of this value makes a logger forward every record to the nearest enclosing logger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChainToParent;

/// Colors lines with the default [`ColorScheme`].
#[must_use]
pub fn with_color() -> LoggerFeature {
    with_color_scheme(ColorScheme::default())
}

#[must_use]
pub fn with_color_scheme(scheme: ColorScheme) -> LoggerFeature {
    Feature::new(LoggerFeatureKind::Color, vec![Registration::value(LOG_COLOR, scheme)])
}

/// Prefixes records with the system time.
#[must_use]
pub fn with_timestamps() -> LoggerFeature {
    with_clock(Timestamps::default())
}

#[must_use]
pub fn with_clock(timestamps: Timestamps) -> LoggerFeature {
    Feature::new(LoggerFeatureKind::Timestamps, vec![Registration::value(LOG_CLOCK, timestamps)])
}

/// Attaches `key=value` to every record of the scope.
pub fn with_context(
    key: impl Into<Cow<'static, str>>,
    value: impl Into<Cow<'static, str>>,
) -> LoggerFeature {
    Feature::new(
        LoggerFeatureKind::Context,
        vec![Registration::value(LOG_CONTEXT, ContextField::new(key, value)).multi()],
    )
}

pub fn with_filter(prefix: impl Into<Cow<'static, str>>, level: LogLevel) -> LoggerFeature {
    Feature::new(
        LoggerFeatureKind::Filter,
        vec![Registration::value(LOG_FILTERS, TargetFilter { prefix: prefix.into(), level }).multi()],
    )
}

/// Adds one sink next to the configured ones.
#[must_use]
pub fn with_appender(appender: AppenderConfig) -> LoggerFeature {
    Feature::new(
        LoggerFeatureKind::Appender,
        vec![Registration::factory(LOG_APPENDERS, AppenderFactory(appender)).multi()],
    )
}

/// Forwards records to the logger of the enclosing scope as well.
#[must_use]
pub fn with_chaining() -> LoggerFeature {
    Feature::new(LoggerFeatureKind::Chaining, vec![Registration::value(LOG_CHAIN, ChainToParent)])
}

/// Builds a feature from its kind name using default parameters.
///
/// # Errors
/// * [`ComposeError::UnknownFeatureKind`] when `name` is not a feature kind.
/// * [`ComposeError::InvalidFeature`] for `context` and `filter`, which need parameters.
pub fn feature_by_name(name: &str) -> Result<LoggerFeature, ComposeError> {
    FeatureParams::named(name).build()
}

/// Parameters of a feature listed in settings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FeatureParams {
    pub kind: String,
    /// `context` key.
    pub key: Option<String>,
    /// `context` value.
    pub value: Option<String>,
    /// `filter` target prefix.
    pub target: Option<String>,
    /// `filter` threshold.
    pub level: Option<LogLevel>,
    /// `appender` sink.
    pub appender: Option<AppenderConfig>,
    /// `timestamps` layout.
    pub format: Option<String>,
}

impl FeatureParams {
    fn named(kind: &str) -> Self {
        Self { kind: kind.to_owned(), ..Self::default() }
    }

    /// # Errors
    /// See [`feature_by_name`].
    pub fn build(&self) -> Result<LoggerFeature, ComposeError> {
        let kind = parse_kind::<LoggerFeatureKind>(&self.kind)?;
        let missing = |what: &'static str| ComposeError::InvalidFeature {
            kind: kind.to_string().into(),
            message: format!("missing '{what}'").into(),
            context: None,
        };

        Ok(match kind {
            LoggerFeatureKind::Color => with_color(),
            LoggerFeatureKind::Timestamps => match &self.format {
                Some(format) => with_clock(Timestamps { clock: Clock::System, format: format.clone().into() }),
                None => with_timestamps(),
            },
            LoggerFeatureKind::Context => {
                let key = self.key.clone().ok_or_else(|| missing("key"))?;
                let value = self.value.clone().ok_or_else(|| missing("value"))?;
                with_context(key, value)
            },
            LoggerFeatureKind::Filter => {
                let target = self.target.clone().ok_or_else(|| missing("target"))?;
                let level = self.level.ok_or_else(|| missing("level"))?;
                with_filter(target, level)
            },
            LoggerFeatureKind::Appender => with_appender(self.appender.clone().unwrap_or_default()),
            LoggerFeatureKind::Chaining => with_chaining(),
        })
    }
}

/// A feature entry in settings: either a bare kind name or a table with parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FeatureSpec {
    Named(String),
    Detailed(FeatureParams),
}

impl FeatureSpec {
    /// # Errors
    /// See [`feature_by_name`].
    pub fn build(&self) -> Result<LoggerFeature, ComposeError> {
        match self {
            Self::Named(name) => feature_by_name(name),
            Self::Detailed(params) => params.build(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strum::IntoEnumIterator;

    #[test]
    fn only_color_timestamps_and_chaining_are_exclusive() {
        let exclusive: Vec<_> = LoggerFeatureKind::iter().filter(|k| k.is_exclusive()).collect();
        assert_eq!(
            exclusive,
            [LoggerFeatureKind::Color, LoggerFeatureKind::Timestamps, LoggerFeatureKind::Chaining]
        );
    }

    #[test]
    fn kind_names_round_trip_through_display() {
        for kind in LoggerFeatureKind::iter() {
            assert_eq!(parse_kind::<LoggerFeatureKind>(&kind.to_string()).unwrap(), kind);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = feature_by_name("sparkles").unwrap_err();
        assert!(matches!(err, ComposeError::UnknownFeatureKind { ref name, .. } if name == "sparkles"));
    }

    #[test]
    fn parameterised_kinds_need_parameters() {
        assert!(matches!(feature_by_name("context"), Err(ComposeError::InvalidFeature { .. })));
        assert!(matches!(feature_by_name("filter"), Err(ComposeError::InvalidFeature { .. })));
        assert_eq!(feature_by_name(" Color ").unwrap(), with_color());
    }

    #[test]
    fn detailed_spec_builds_with_parameters() {
        let spec: FeatureSpec =
            serde_json::from_str(r#"{"kind":"filter","target":"db","level":"error"}"#).unwrap();
        assert_eq!(spec.build().unwrap(), with_filter("db", LogLevel::Error));

        let spec: FeatureSpec = serde_json::from_str(r#""chaining""#).unwrap();
        assert_eq!(spec.build().unwrap(), with_chaining());
    }

    #[test]
    fn fixed_clock_renders_layout() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let stamps = Timestamps { clock: Clock::Fixed(instant), format: "%Y-%m-%d %H:%M".into() };
        assert_eq!(stamps.render(), "2024-05-01 12:30");
    }

    #[test]
    fn invalid_layout_falls_back_to_rfc3339() {
        let instant = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        let stamps = Timestamps { clock: Clock::Fixed(instant), format: "%Q %Y".into() };
        assert_eq!(stamps.render(), "2024-05-01T12:30:00+00:00");
    }

    #[test]
    fn paint_wraps_in_escape_codes() {
        let scheme = ColorScheme::default();
        assert_eq!(scheme.paint(LogLevel::Error, "boom"), "\x1b[31mboom\x1b[0m");
        assert_eq!(scheme.paint(LogLevel::Off, "quiet"), "quiet");
    }
}
