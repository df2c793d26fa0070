use crate::appender::SharedAppender;
use crate::config::{
    LOG_APPENDERS, LOG_CHAIN, LOG_CLOCK, LOG_COLOR, LOG_CONTEXT, LOG_FILTERS, LOG_FORMATTER,
    LOGGER_CONFIG, LoggerConfig,
};
use crate::features::{ChainToParent, ColorScheme, TargetFilter, Timestamps};
use crate::formatter::SharedFormatter;
use crate::level::LogLevel;
use crate::record::{ContextField, LogRecord};
use provis_kernel::prelude::{Capability, Injectable, Lookup, ResolveError, Resolver, ScopeId, ScopeTree};
use std::sync::Arc;
use tracing::warn;

/// Target used by the level shortcuts ([`Logger::info`] and friends).
pub const DEFAULT_TARGET: &str = "app";

/// Logging service of one scope.
///
/// Instantiated by the scope tree in the nearest scope registering [`LOGGER_CONFIG`]. Every
/// setting is read from that scope only, so a nested scope composing its own logger never
/// inherits the color, filters or sinks of its parent. With chaining enabled, each record is
/// also offered to the enclosing logger, which applies its own settings.
///
/// Colored lines only reach sinks that ask for them (the console); files and forwarded
/// `tracing` events stay plain.
#[derive(Debug)]
pub struct Logger {
    scope: ScopeId,
    config: Arc<LoggerConfig>,
    formatter: Arc<SharedFormatter>,
    appenders: Vec<Arc<SharedAppender>>,
    color: Option<Arc<ColorScheme>>,
    timestamps: Option<Arc<Timestamps>>,
    context: Vec<ContextField>,
    filters: Vec<Arc<TargetFilter>>,
    parent: Option<Arc<Self>>,
}

impl Injectable for Logger {
    const ANCHOR: Capability = LOGGER_CONFIG;

    fn inject(resolver: &Resolver<'_>) -> Result<Self, ResolveError> {
        let local = Lookup::SELF_ONLY | Lookup::OPTIONAL;

        let config = resolver.get::<LoggerConfig>(&LOGGER_CONFIG)?;
        let formatter = resolver.get::<SharedFormatter>(&LOG_FORMATTER)?;
        let appenders = resolver.resolve_all::<SharedAppender>(&LOG_APPENDERS, local)?;
        let color = resolver.resolve::<ColorScheme>(&LOG_COLOR, local)?;
        let timestamps = resolver.resolve::<Timestamps>(&LOG_CLOCK, local)?;
        let context = resolver
            .resolve_all::<ContextField>(&LOG_CONTEXT, local)?
            .into_iter()
            .map(Arc::unwrap_or_clone)
            .collect();

        let mut filters = resolver.resolve_all::<TargetFilter>(&LOG_FILTERS, local)?;
        filters.sort_by_key(|filter| std::cmp::Reverse(filter.prefix.len()));

        let parent = match resolver.resolve::<ChainToParent>(&LOG_CHAIN, local)? {
            Some(_) => resolver.inject::<Self>(Lookup::PARENT)?,
            None => None,
        };

        Ok(Self {
            scope: resolver.scope(),
            config,
            formatter,
            appenders,
            color,
            timestamps,
            context,
            filters,
            parent,
        })
    }
}

impl Logger {
    /// The logger serving `scope`.
    ///
    /// # Errors
    /// [`ResolveError::NotFound`] when neither `scope` nor an ancestor composes a logger, or any
    /// error raised while building it.
    pub fn from_scope(tree: &ScopeTree, scope: ScopeId) -> Result<Arc<Self>, ResolveError> {
        tree.inject::<Self>(scope, Lookup::empty())?.ok_or_else(|| ResolveError::NotFound {
            capability: LOGGER_CONFIG,
            scope,
            context: None,
        })
    }

    /// Scope hosting this logger.
    #[must_use]
    pub const fn scope(&self) -> ScopeId {
        self.scope
    }

    #[must_use]
    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// The enclosing logger records are forwarded to, when chaining is enabled.
    #[must_use]
    pub const fn parent(&self) -> Option<&Arc<Self>> {
        self.parent.as_ref()
    }

    /// Whether this logger (ignoring any chained parent) would emit `level` for `target`.
    #[must_use]
    pub fn enabled(&self, level: LogLevel, target: &str) -> bool {
        let threshold = self
            .filters
            .iter()
            .find(|filter| filter.matches(target))
            .map_or(self.config.level, |filter| filter.level);
        threshold.admits(level)
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if self.enabled(level, target) {
            self.emit(level, target, message);
        }
        if let Some(parent) = &self.parent {
            parent.log(level, target, message);
        }
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, DEFAULT_TARGET, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, DEFAULT_TARGET, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, DEFAULT_TARGET, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, DEFAULT_TARGET, message);
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, DEFAULT_TARGET, message);
    }

    /// Flushes every sink of this logger and of the chained parents.
    pub fn flush(&self) {
        for appender in &self.appenders {
            if let Err(err) = appender.flush() {
                warn!(scope = %self.scope, error = %err, "Failed to flush log appender");
            }
        }
        if let Some(parent) = &self.parent {
            parent.flush();
        }
    }

    fn emit(&self, level: LogLevel, target: &str, message: &str) {
        let timestamp = self.timestamps.as_ref().map(|timestamps| timestamps.render());
        let record = LogRecord {
            level,
            target,
            message,
            timestamp: timestamp.as_deref(),
            context: &self.context,
        };

        let line = self.formatter.format(&record);
        let painted = self.color.as_ref().map(|scheme| scheme.paint(level, &line));

        for appender in &self.appenders {
            let output = match &painted {
                Some(painted) if appender.ansi() => painted,
                _ => &line,
            };
            if let Err(err) = appender.append(level, output) {
                warn!(scope = %self.scope, error = %err, "Failed to write log record");
            }
        }
    }
}
