//! # Logger
//!
//! Installs the process-wide `tracing` subscriber: console output, optional rolling log
//! files written through a non-blocking worker, and `RUST_LOG`-style filtering.
//!
//! ## Example
//!
//! ```rust
//! # use elim_logger::{Logger, LevelFilter};
//! let _logger = Logger::builder()
//!     .name("elim")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("elim_rules=trace")
//!     .init()
//!     .unwrap();
//! ```

mod builder;
mod error;

pub use crate::builder::{LoggerBuilder, NoName, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use tracing_appender::non_blocking::WorkerGuard;

/// Handle to the installed subscriber.
///
/// Holds the file worker guard; pending file output is flushed when it drops, so keep it
/// alive until shutdown.
#[must_use = "Dropping this handle stops the background log writer."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// `true` when file output is active.
    #[must_use]
    pub const fn writes_files(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers");
        }
    }
}

/// Parses a level name such as `info` or `DEBUG`; `off` disables output.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for unknown names.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    level.trim().parse::<LevelFilter>().map_err(|_| LoggerError::InvalidConfiguration {
        message: format!("Unknown log level '{level}'").into(),
        context: None,
    })
}
