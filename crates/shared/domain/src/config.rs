use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Top-level host configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HostConfigInner {
    pub engine: EngineConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(flatten, default)]
    inner: Arc<HostConfigInner>,
}

impl Deref for HostConfig {
    type Target = HostConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for HostConfig {
    fn deref_mut(&mut self) -> &mut HostConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Rule engine settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding one document per rule.
    pub rules_dir: PathBuf,
    /// Fail a rule file when a property is missing instead of using the default.
    pub strict: bool,
    /// Rewrite loaded files with the values actually applied.
    pub write_back: bool,
    /// Seed the default rule set when the rules directory is created.
    pub seed_defaults: bool,
    /// Maximum number of cached rule descriptions.
    pub description_capacity: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub console: bool,
    /// Directory for rolling log files; no file output when absent.
    pub path: Option<PathBuf>,
    /// Extra filter directives such as `elim_rules=debug`.
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules_dir: PathBuf::from("rules"),
            strict: false,
            write_back: true,
            seed_defaults: true,
            description_capacity: 1_024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, console: true, path: None, env_filter: None }
    }
}
