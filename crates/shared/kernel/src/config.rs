//! Layered loading of partial configurations.

use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides, e.g. `PROVIS__LEVEL=debug`.
pub const ENV_PREFIX: &str = "PROVIS";

#[provis_derive::provis_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration from a file, overlaid with `PROVIS__`-prefixed environment variables.
///
/// Top-level keys map directly (`PROVIS__LEVEL` overrides `level`); nested keys join their
/// segments with double underscores. The file format follows the extension (`toml`, `json`,
/// `yaml`, ...). Fields absent from both layers are left to the target type's `serde` defaults, which is how partial configurations stay partial.
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing or malformed, or when the merged
/// layers do not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use provis_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct Settings {
///     level: Option<String>,
/// }
///
/// let settings: Settings = load_config("config/local.toml").unwrap_or_default();
/// ```
pub fn load_config<T>(path: impl AsRef<Path>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    info!("Loading config from {}", path.display());

    layered(Config::builder().add_source(File::from(path).required(true)))
}

/// Same layering as [`load_config`] but reading an in-memory TOML document.
///
/// # Errors
/// Returns [`ConfigError::Config`] when the document is malformed or does not deserialize.
pub fn load_config_str<T>(toml: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    layered(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn layered<T: DeserializeOwned>(
    builder: config::ConfigBuilder<config::builder::DefaultState>,
) -> Result<T, ConfigError> {
    let config = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        )
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
