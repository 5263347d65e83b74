//! Kernel utilities shared across crates.
//! Keep this crate lightweight; today it owns layered configuration loading.
//!
//! ## Config loading
//! ```rust,no_run
//! use elim_kernel::config::load_config;
//! use elim_kernel::domain::config::HostConfig;
//!
//! let cfg: HostConfig = load_config(Some("elim")).unwrap();
//! println!("rules live in {}", cfg.engine.rules_dir.display());
//! ```

pub mod config;

pub use elim_domain as domain;
