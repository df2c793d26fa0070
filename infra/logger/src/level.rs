use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Verbosity threshold. Variants are ordered from most to least verbose; `Off` disables output.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Upper-case label used by the built-in formatters.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Off => "OFF",
        }
    }

    /// Whether a record at `record` level passes this threshold.
    #[must_use]
    pub fn admits(self, record: Self) -> bool {
        self != Self::Off && record != Self::Off && record >= self
    }
}

impl From<LogLevel> for tracing_subscriber::filter::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
            LogLevel::Off => Self::OFF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>().ok(), Some(LogLevel::Debug));
        assert_eq!("warn".parse::<LogLevel>().ok(), Some(LogLevel::Warn));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn threshold_admits_equal_or_more_severe() {
        assert!(LogLevel::Info.admits(LogLevel::Info));
        assert!(LogLevel::Info.admits(LogLevel::Error));
        assert!(!LogLevel::Info.admits(LogLevel::Debug));
        assert!(!LogLevel::Off.admits(LogLevel::Error));
    }
}
