//! Facade crate for the entity limiter.
//! Re-exports domain, kernel and model primitives and assembles the rule engine.
//! Keep this crate thin: it should compose other crates, not implement business logic.
//!
//! ## Usage
//! - Load a [`domain::config::HostConfig`] with [`kernel::config::load_config`].
//! - Call [`init`] with its engine section to get a loaded [`RuleEngine`].

pub use elim_domain as domain;
pub use elim_kernel as kernel;
pub use elim_model as model;
pub use elim_rules::{RuleDescription, RuleEngine, RuleError};

use elim_domain::config::EngineConfig;
use tracing::info;

/// Feature registry for runtime introspection.
pub mod features {
    pub use elim_rules as rules;

    /// Features compiled into this build.
    pub const ENABLED: &[&str] = &["rules"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

/// Builds the rule engine described by `config` and loads its rule files.
///
/// # Errors
/// Returns an error if the rules directory cannot be opened or scanned, or if the rule
/// contract does not resolve. Individual malformed files are skipped, not reported.
pub fn init(config: &EngineConfig) -> Result<RuleEngine, RuleError> {
    let engine = RuleEngine::builder().config(config).build()?;
    let rules = engine.init()?;
    info!(rules = rules.len(), strict = config.strict, "Entity limiter ready");
    Ok(engine)
}
