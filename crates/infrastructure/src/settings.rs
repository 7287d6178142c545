//! Runner settings loading.
//!
//! Layers, lowest precedence first: built-in defaults, an optional settings
//! file (YAML, JSON or TOML by extension), then `APICHECK_*` environment
//! variables such as `APICHECK_BASE_URL` or `APICHECK_API_KEY`. Command-line
//! overrides are applied by the binary on top.

use std::path::Path;

use apicheck_domain::{DomainError, RunnerSettings};
use config::{Config, Environment, File};
use tracing::debug;

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "APICHECK";

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A source could not be read or merged.
    #[error("failed to load settings: {0}")]
    Config(#[from] config::ConfigError),

    /// The merged settings are not usable.
    #[error(transparent)]
    Invalid(#[from] DomainError),
}

/// Loads and validates settings from defaults, `path` and the environment.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed, a value has the wrong
/// type, or the result fails validation.
pub fn load_settings(path: Option<&Path>) -> Result<RunnerSettings, SettingsError> {
    load_with_env(path, Environment::with_prefix(ENV_PREFIX))
}

fn load_with_env(
    path: Option<&Path>,
    env: Environment,
) -> Result<RunnerSettings, SettingsError> {
    let mut builder = Config::builder().add_source(Config::try_from(&RunnerSettings::default())?);
    if let Some(path) = path {
        debug!(path = %path.display(), "reading settings file");
        builder = builder.add_source(File::from(path).required(true));
    }
    let settings: RunnerSettings = builder
        .add_source(env.try_parsing(true))
        .build()?
        .try_deserialize()?;

    settings.validate()?;
    Ok(settings)
}
