//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for Helm binaries.
//!
//! * Console output in a compact human format or as JSON lines.
//! * Optional daily/hourly rolling log files written by a non-blocking worker.
//! * Level plus directive filtering (`"helm_settings=debug,tower_http=info"`); `RUST_LOG`
//!   wins when no directives are given.
//!
//! ```rust
//! use helm_logger::{LevelFilter, LogFormat, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("helm-server")
//!     .format(LogFormat::Compact)
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

const DEFAULT_MAX_FILES: usize = 7;

/// Line format for console and file output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(LoggerError::invalid(format!("unknown log format '{other}'"))),
        }
    }
}

#[derive(Debug)]
struct FileSink {
    dir: PathBuf,
    rotation: Rotation,
    max_files: usize,
}

#[derive(Debug)]
struct LoggerConfig {
    console: bool,
    format: LogFormat,
    level: LevelFilter,
    directives: Option<String>,
    file: Option<FileSink>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self { console: true, format: LogFormat::Compact, level: LevelFilter::INFO, directives: None, file: None }
    }
}

#[derive(Debug)]
pub struct NoName;
#[derive(Debug)]
pub struct WithName(String);

mod private {
    pub trait Sealed {}
}
impl private::Sealed for NoName {}
impl private::Sealed for WithName {}

/// Builder for the global subscriber. A name is required before [`LoggerBuilder::init`].
#[must_use = "The builder does nothing until `init` is called"]
#[derive(Debug)]
pub struct LoggerBuilder<N: private::Sealed = NoName> {
    name: N,
    config: LoggerConfig,
}

impl LoggerBuilder<NoName> {
    /// Names the logger; also the prefix of rolling log files.
    pub fn name(self, name: impl Into<String>) -> LoggerBuilder<WithName> {
        LoggerBuilder { name: WithName(name.into()), config: self.config }
    }
}

impl<N: private::Sealed> LoggerBuilder<N> {
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    pub const fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub const fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level;
        self
    }

    /// Explicit filter directives. Overrides `RUST_LOG` when set; invalid directives fail
    /// [`LoggerBuilder::init`].
    pub fn directives(mut self, directives: impl Into<String>) -> Self {
        self.config.directives = Some(directives.into()).filter(|d: &String| !d.trim().is_empty());
        self
    }

    /// Adds a rolling file sink under `dir`.
    pub fn file(mut self, dir: impl Into<PathBuf>, rotation: Rotation) -> Self {
        self.config.file = Some(FileSink { dir: dir.into(), rotation, max_files: DEFAULT_MAX_FILES });
        self
    }

    /// Number of rotated files to retain. Only meaningful with [`LoggerBuilder::file`].
    pub fn max_files(mut self, max: usize) -> Self {
        if let Some(file) = self.config.file.as_mut() {
            file.max_files = max;
        }
        self
    }
}

impl LoggerBuilder<WithName> {
    /// Installs the subscriber.
    ///
    /// The returned [`Logger`] owns the file worker guard; keep it alive until shutdown
    /// or buffered lines are lost.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an empty name, zero retention, bad
    ///   directives, or no enabled sink.
    /// * [`LoggerError::Appender`] if the log directory cannot be used.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already set.
    pub fn init(self) -> Result<Logger, LoggerError> {
        let WithName(name) = self.name;
        let config = self.config;
        validate(&name, &config)?;

        let filter = env_filter(&config)?;
        let mut layers = Vec::new();

        if config.console {
            let console = fmt::layer().with_ansi(true);
            layers.push(match config.format {
                LogFormat::Compact => console.compact().boxed(),
                LogFormat::Pretty => console.pretty().boxed(),
                LogFormat::Json => console.json().with_ansi(false).boxed(),
            });
        }

        let guard = match config.file {
            Some(sink) => {
                fs::create_dir_all(&sink.dir).map_err(|e| LoggerError::Internal {
                    message: e.to_string().into(),
                    context: Some(format!("Creating log directory {}", sink.dir.display()).into()),
                })?;

                let appender = RollingFileAppender::builder()
                    .rotation(sink.rotation)
                    .filename_prefix(&name)
                    .filename_suffix("log")
                    .max_log_files(sink.max_files)
                    .build(&sink.dir)
                    .context("Building rolling appender")?;
                let (writer, guard) = tracing_appender::non_blocking(appender);

                let file = fmt::layer().with_writer(writer).with_ansi(false);
                layers.push(if config.format == LogFormat::Json { file.json().boxed() } else { file.boxed() });
                Some(guard)
            },
            None => None,
        };

        tracing_subscriber::registry().with(filter).with(layers).try_init()?;
        tracing::debug!(logger = %name, "Logging initialized");

        Ok(Logger { guard })
    }
}

/// Keeps the logging backend alive. Drop it last.
#[must_use = "Dropping this handle stops the background log writer"]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder { name: NoName, config: LoggerConfig::default() }
    }

    /// Whether a file sink is active.
    #[must_use]
    pub const fn has_file_sink(&self) -> bool {
        self.guard.is_some()
    }
}

fn validate(name: &str, config: &LoggerConfig) -> Result<(), LoggerError> {
    if name.trim().is_empty() {
        return Err(LoggerError::invalid("logger name cannot be empty"));
    }
    if config.file.as_ref().is_some_and(|f| f.max_files == 0) {
        return Err(LoggerError::invalid("max_files must be greater than zero"));
    }
    if !config.console && config.file.is_none() {
        return Err(LoggerError::invalid("no sink enabled; enable the console or a log file"));
    }
    Ok(())
}

fn env_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    let builder = EnvFilter::builder().with_default_directive(config.level.into());
    match &config.directives {
        Some(directives) => builder
            .parse(directives)
            .map_err(|e| LoggerError::invalid(format!("invalid directives '{directives}': {e}"))),
        None => Ok(builder.from_env_lossy()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let builder = Logger::builder().name("helm-test");
        assert!(builder.config.console);
        assert_eq!(builder.config.format, LogFormat::Compact);
        assert_eq!(builder.config.level, LevelFilter::INFO);
        assert!(builder.config.file.is_none());
    }

    #[test]
    fn test_blank_directives_are_ignored() {
        let builder = Logger::builder().directives("  ");
        assert!(builder.config.directives.is_none());
    }

    #[test]
    fn test_max_files_applies_to_file_sink() {
        let builder = Logger::builder().file("logs", Rotation::DAILY).max_files(3);
        assert_eq!(builder.config.file.as_ref().map(|f| f.max_files), Some(3));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_configs() {
        assert!(matches!(
            Logger::builder().name(" ").init(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Logger::builder().name("x").console(false).init(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
        assert!(matches!(
            Logger::builder().name("x").directives("helm=[[[").init(),
            Err(LoggerError::InvalidConfiguration { .. })
        ));
    }
}
