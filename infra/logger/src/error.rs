use provis_kernel::ComposeError;
use std::borrow::Cow;

/// Errors raised by the logging library and the diagnostics subscriber.
#[provis_derive::provis_error]
pub enum LoggerError {
    /// Failure when configuring the rolling file appender (e.g., invalid path).
    #[error("Rolling file appender error{}: {source}", format_context(context))]
    Appender { source: tracing_appender::rolling::InitError, context: Option<Cow<'static, str>> },

    /// A global tracing subscriber has already been installed in this process.
    #[error("Tracing subscriber error{}: {source}", format_context(context))]
    Subscriber {
        source: tracing_subscriber::util::TryInitError,
        context: Option<Cow<'static, str>>,
    },

    /// Writing to a sink failed.
    #[error("Log output error{}: {source}", format_context(context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Settings could not be turned into registrations.
    #[error("Logger composition error{}: {source}", format_context(context))]
    Compose { source: ComposeError, context: Option<Cow<'static, str>> },

    /// Settings could not be loaded.
    #[cfg(feature = "settings")]
    #[error("Logger settings error{}: {source}", format_context(context))]
    Settings {
        source: provis_kernel::config::ConfigError,
        context: Option<Cow<'static, str>>,
    },

    /// Invalid configuration supplied to the logger or the diagnostics builder.
    #[error("Invalid logger configuration{}: {message}", format_context(context))]
    InvalidConfiguration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
