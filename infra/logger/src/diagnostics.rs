//! Process-wide `tracing` subscriber for the library's own diagnostics.

use crate::error::LoggerError;
use crate::level::LogLevel;
use private::Sealed;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[derive(Debug)]
struct DiagnosticsConfig {
    level: LogLevel,
    json: bool,
    ansi: bool,
    env_filter: Option<String>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self { level: LogLevel::Info, json: false, ansi: true, env_filter: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl Sealed for NoName {}
impl Sealed for WithName {}

/// Configures and installs the global subscriber. A name is required before [`init`](Self::init).
#[derive(Debug)]
pub struct DiagnosticsBuilder<N: Sealed = NoName> {
    config: DiagnosticsConfig,
    name: N,
}

impl DiagnosticsBuilder<NoName> {
    /// Names the application emitting the diagnostics.
    pub fn name(self, name: impl Into<String>) -> DiagnosticsBuilder<WithName> {
        DiagnosticsBuilder { config: self.config, name: WithName(name.into()) }
    }
}

impl DiagnosticsBuilder<WithName> {
    /// Minimum level when neither `RUST_LOG` nor [`env_filter`](Self::env_filter) says otherwise.
    #[must_use = "The builder must be configured before it can be used to initialize diagnostics."]
    pub const fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    /// Adds an explicit filter (e.g., `provis_kernel=trace,provis_logger=debug`).
    ///
    /// Invalid filters make [`init`](Self::init) fail.
    #[must_use = "The builder must be configured before it can be used to initialize diagnostics."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    /// Emits JSON lines instead of the compact layout.
    #[must_use = "The builder must be configured before it can be used to initialize diagnostics."]
    pub const fn json(mut self) -> Self {
        self.config.json = true;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize diagnostics."]
    pub const fn ansi(mut self, enabled: bool) -> Self {
        self.config.ansi = enabled;
        self
    }

    /// Installs the subscriber. Output goes to stderr.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name or an invalid filter.
    /// * [`LoggerError::Subscriber`] if a global subscriber has already been set.
    pub fn init(self) -> Result<Diagnostics, LoggerError> {
        validate_name(&self.name.0)?;
        let env_filter = build_env_filter(&self.config)?;

        let console = layer().with_writer(std::io::stderr).with_target(true);
        let console = if self.config.json {
            console.json().boxed()
        } else {
            console.compact().with_ansi(self.config.ansi).boxed()
        };

        tracing_subscriber::registry().with(env_filter).with(console).try_init()?;
        tracing::debug!(name = %self.name.0, "Diagnostics initialized");

        Ok(Diagnostics { name: self.name.0 })
    }
}

/// Handle returned once the global subscriber is installed.
#[derive(Debug)]
pub struct Diagnostics {
    name: String,
}

impl Diagnostics {
    #[must_use = "The builder must be configured before it can be used to initialize diagnostics."]
    pub fn builder() -> DiagnosticsBuilder {
        DiagnosticsBuilder { config: DiagnosticsConfig::default(), name: NoName }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn validate_name(name: &str) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::InvalidConfiguration {
            message: "Diagnostics name cannot be empty".into(),
            context: None,
        });
    }
    Ok(())
}

fn build_env_filter(config: &DiagnosticsConfig) -> Result<EnvFilter, LoggerError> {
    let builder =
        EnvFilter::builder().with_default_directive(LevelFilter::from(config.level).into());
    config.env_filter.as_ref().map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_initial_state() {
        let builder = Diagnostics::builder().name("shell").env_filter("provis_kernel=trace");
        assert_eq!(builder.config.level, LogLevel::Info);
        assert!(!builder.config.json);
        assert_eq!(builder.config.env_filter.as_deref(), Some("provis_kernel=trace"));
    }

    #[test]
    fn empty_name_is_rejected_before_install() {
        let err = Diagnostics::builder().name("  ").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn invalid_filter_is_rejected_before_install() {
        let err = Diagnostics::builder().name("shell").env_filter("=[").init().unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }
}
