use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Prefix of environment overrides, e.g. `ELIM__ENGINE__STRICT=true`.
pub const ENV_PREFIX: &str = "ELIM";
/// Base name of the configuration file used when no path is given.
pub const DEFAULT_CONFIG: &str = "elim";

/// Custom error type for config loading.
#[elim_derive::elim_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads layered configuration: a file (any format the `config` crate recognises by
/// extension, or by probing `<name>.toml`, `<name>.yaml`, ... when the extension is
/// omitted), overlaid by `ELIM__`-prefixed environment variables where `__` separates
/// nested keys.
///
/// An explicit `path` must exist. Without one, the `elim` file in the working directory
/// is optional and missing keys fall back to `T`'s serde defaults.
///
/// # Errors
/// Returns [`ConfigError::Config`] if an explicit file is missing, a source is malformed,
/// or the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use elim_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (file, required) = match &path {
        Some(path) => (path.as_ref().to_path_buf(), true),
        None => (Path::new(DEFAULT_CONFIG).to_path_buf(), false),
    };

    let builder = Config::builder()
        .add_source(File::from(file.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX).separator("__").convert_case(config::Case::Snake),
        );

    info!(path = %file.display(), required, "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
