//! # Logger
//!
//! A logging library configured through provider composition.
//!
//! [`provide_logger`] turns a [`PartialLoggerConfig`] and a list of features into registrations
//! for one scope of a [`ScopeTree`](provis_kernel::prelude::ScopeTree). The scope tree then
//! builds a [`Logger`] in every scope that composed one.
//!
//! * The formatter is a strategy: a [`LogFormatter`] type ([`PlainFormatter`], [`JsonFormatter`]
//!   or your own) or a plain function.
//! * Sinks are [`AppenderConfig`]s: console, rolling files, `tracing`, or an in-memory buffer.
//! * Features: [`with_color`], [`with_timestamps`], [`with_context`], [`with_filter`],
//!   [`with_appender`], [`with_chaining`].
//! * [`Diagnostics`] installs the global `tracing` subscriber the libraries log through.
//!
//! ## Example
//!
//! ```rust
//! use provis_kernel::prelude::{ScopeId, ScopeTree};
//! use provis_logger::{
//!     AppenderConfig, LogLevel, Logger, MemorySink, PartialLoggerConfig, provide_logger,
//!     with_context,
//! };
//!
//! let sink = MemorySink::new();
//! let config = PartialLoggerConfig::default()
//!     .with_level(LogLevel::Debug)
//!     .with_appenders([AppenderConfig::memory(sink.clone())]);
//! let tree = ScopeTree::new(provide_logger(config, [with_context("service", "api")]).unwrap());
//!
//! let logger = Logger::from_scope(&tree, ScopeId::ROOT).unwrap();
//! logger.debug("ready");
//! assert_eq!(sink.lines(), ["[DEBUG] app: ready service=api"]);
//! ```

mod appender;
mod config;
mod diagnostics;
mod error;
mod features;
mod formatter;
mod level;
mod logger;
mod record;
#[cfg(feature = "settings")]
mod settings;

pub use crate::appender::{
    AppenderConfig, AppenderFactory, ConsoleStream, FileRotation, LogAppender, MemorySink,
    SharedAppender, TRACING_TARGET,
};
pub use crate::config::{
    LOG_APPENDERS, LOG_CHAIN, LOG_CLOCK, LOG_COLOR, LOG_CONTEXT, LOG_FILTERS, LOG_FORMATTER,
    LOGGER_CONFIG, LoggerConfig, PartialLoggerConfig, provide_logger,
};
pub use crate::diagnostics::{Diagnostics, DiagnosticsBuilder, NoName, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use crate::features::{
    ChainToParent, Clock, ColorScheme, DEFAULT_TIMESTAMP_FORMAT, FeatureParams, FeatureSpec,
    LoggerFeature, LoggerFeatureKind, TargetFilter, Timestamps, feature_by_name, with_appender,
    with_chaining, with_clock, with_color, with_color_scheme, with_context, with_filter,
    with_timestamps,
};
pub use crate::formatter::{
    FormatFn, FormatterClass, FormatterStrategy, FunctionFormatter, JsonFormatter, LogFormatter,
    PlainFormatter, SharedFormatter,
};
pub use crate::level::LogLevel;
pub use crate::logger::{DEFAULT_TARGET, Logger};
pub use crate::record::{ContextField, LogRecord};
#[cfg(feature = "settings")]
pub use crate::settings::LoggerSettings;
