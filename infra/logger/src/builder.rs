use crate::error::LoggerError;
use crate::{LevelFilter, Logger, Rotation};
use private::Sealed;
use std::fs;
use std::path::PathBuf;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

const DEFAULT_MAX_FILES: usize = 7;
const LOG_FILE_SUFFIX: &str = "log";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    json: bool,
    level: LevelFilter,
    env_filter: Option<String>,
    directory: Option<PathBuf>,
    rotation: Rotation,
    max_files: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            json: false,
            level: LevelFilter::INFO,
            env_filter: None,
            directory: None,
            rotation: Rotation::DAILY,
            max_files: DEFAULT_MAX_FILES,
        }
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

/// Configures and installs the global subscriber. A name is required before `init`.
#[derive(Debug)]
pub struct LoggerBuilder<N: Sealed = NoName> {
    name: N,
    config: LoggerConfig,
}

impl LoggerBuilder<NoName> {
    pub(crate) fn new() -> Self {
        Self { name: NoName, config: LoggerConfig::default() }
    }

    /// Names the application; also the prefix of rolled files (`elim.2026-10-18.log`).
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), config: self.config }
    }
}

impl<N: Sealed> LoggerBuilder<N> {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Programmatic filter directives (e.g. `elim_rules=debug`). `RUST_LOG` is only consulted
    /// when no directives are given.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, directives: impl Into<String>) -> Self {
        let directives = directives.into();
        self.config.env_filter = (!directives.trim().is_empty()).then_some(directives);
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Emits JSON lines instead of the compact text format.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    /// Writes rolling log files into `directory`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directory(mut self, directory: Option<impl Into<PathBuf>>) -> Self {
        self.config.directory = directory.map(Into::into);
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn rotation(mut self, rotation: Rotation) -> Self {
        self.config.rotation = rotation;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }
}

impl LoggerBuilder<WithName> {
    /// Installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero `max_files`, bad filter
    ///   directives, or when neither console nor file output is enabled.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already installed.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let name = self.name.0;
        let config = self.config;
        validate(&name, &config)?;

        let filter = env_filter(&config)?;
        let mut layers: Vec<BoxedLayer> = Vec::new();

        if config.console {
            layers.push(if config.json {
                layer().json().boxed()
            } else {
                layer().compact().with_ansi(true).boxed()
            });
        }

        let guard = match &config.directory {
            Some(directory) => {
                fs::create_dir_all(directory).map_err(|source| LoggerError::Io {
                    source,
                    context: Some(format!("Creating {}", directory.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(config.rotation.clone())
                    .filename_prefix(&name)
                    .filename_suffix(LOG_FILE_SUFFIX)
                    .max_log_files(config.max_files)
                    .build(directory)?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file = layer().with_writer(writer).with_ansi(false);
                layers.push(if config.json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(layers).with(filter).try_init()?;

        tracing::debug!(logger = %name, level = %config.level, files = guard.is_some(), "Logger initialized");
        Ok(Logger { guard })
    }
}

fn validate(name: &str, config: &LoggerConfig) -> Result<(), LoggerError> {
    let problem = if name.trim().is_empty() {
        Some("Logger name cannot be empty")
    } else if config.max_files == 0 {
        Some("max_files must be greater than zero")
    } else if !config.console && config.directory.is_none() {
        Some("No output enabled; enable the console or set a log directory")
    } else {
        None
    };

    problem.map_or(Ok(()), |message| {
        Err(LoggerError::InvalidConfiguration { message: message.into(), context: None })
    })
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.env_filter {
        Some(directives) => builder.parse(directives).map_err(|err| LoggerError::InvalidConfiguration {
            message: format!("Invalid env filter '{directives}': {err}").into(),
            context: None,
        }),
        None => Ok(builder.from_env_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    #[serial]
    fn builder_defaults() {
        let builder = Logger::builder().name("elim-test").env_filter("elim=debug");
        assert!(builder.config.console);
        assert!(!builder.config.json);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert_eq!(builder.config.env_filter.as_deref(), Some("elim=debug"));
        assert!(builder.config.directory.is_none());
    }

    #[test]
    #[serial]
    fn blank_filter_is_ignored() {
        let builder = Logger::builder().env_filter("  ");
        assert!(builder.config.env_filter.is_none());
    }

    #[test]
    #[serial]
    fn validation_rejects_silent_logger() {
        let config = LoggerConfig { console: false, ..LoggerConfig::default() };
        assert!(matches!(validate("elim", &config), Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn validation_rejects_zero_retention() {
        let dir = tempdir().unwrap();
        let config = LoggerConfig { max_files: 0, directory: Some(dir.path().into()), ..LoggerConfig::default() };
        assert!(validate("elim", &config).is_err());
        assert!(validate(" ", &LoggerConfig::default()).is_err());
    }

    #[test]
    #[serial]
    fn bad_directives_are_reported() {
        let config = LoggerConfig { env_filter: Some("elim=[".into()), ..LoggerConfig::default() };
        assert!(env_filter(&config).is_err());
    }
}
