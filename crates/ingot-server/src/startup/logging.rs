//! File-based logging with per-component log files.
//!
//! | Log File          | Component                  | Target Prefixes     |
//! |-------------------|----------------------------|---------------------|
//! | ingot.log         | Root logger (all events)   | (all)               |
//! | lock.log          | Lock coordination          | ingot_consistency   |
//! | persistence.log   | Item storage               | ingot_persistence   |
//!
//! Console output goes to stderr so that command output on stdout stays
//! machine-readable. File logging is off unless enabled in configuration.
//! Log files are stored in `~/ingot/logs` by default; override with
//! `INGOT_LOG_DIR` or `log.dir`.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

struct ComponentLogDef {
    file_name: &'static str,
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "lock.log",
        targets: &["ingot_consistency"],
    },
    ComponentLogDef {
        file_name: "persistence.log",
        targets: &["ingot_persistence"],
    },
];

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

/// Logging configuration for the entire application.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log directory (default: `~/ingot/logs`)
    pub log_dir: PathBuf,
    /// Console and root file level, unless `RUST_LOG` is set
    pub console_level: Level,
    /// Enable file logging
    pub file_logging: bool,
    pub rotation: LogRotation,
}

fn default_log_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(format!("{}/ingot/logs", home))
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            console_level: Level::INFO,
            file_logging: false,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    /// Create from environment variables.
    pub fn from_env() -> Self {
        let log_dir = std::env::var("INGOT_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_log_dir());

        let console_level = std::env::var("INGOT_LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Level::INFO);

        let file_logging = std::env::var("INGOT_LOG_FILE")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(false);

        Self {
            log_dir,
            console_level,
            file_logging,
            rotation: LogRotation::Daily,
        }
    }
}

/// Guard that keeps the non-blocking file writers alive.
///
/// Dropping it flushes buffered log output.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

/// Initialize the global tracing subscriber.
///
/// Each layer filters independently: console and root file through
/// `RUST_LOG` (falling back to the configured level), component files through
/// target prefixes.
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<LoggingGuard, Box<dyn std::error::Error + Send + Sync>> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_string()));
    layers.push(Box::new(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_filter(console_filter),
    ));

    if config.file_logging {
        let root_appender =
            RollingFileAppender::new(config.rotation.into(), &config.log_dir, "ingot.log");
        let (root_nb, root_guard) = tracing_appender::non_blocking(root_appender);
        guards.push(root_guard);

        let root_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.console_level.to_string()));
        layers.push(Box::new(
            fmt::layer()
                .with_writer(root_nb)
                .with_target(true)
                .with_thread_names(true)
                .with_ansi(false)
                .with_filter(root_filter),
        ));

        for component in COMPONENT_LOGS {
            let appender = RollingFileAppender::new(
                config.rotation.into(),
                &config.log_dir,
                component.file_name,
            );
            let (nb, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let mut targets = Targets::new();
            for target in component.targets {
                targets = targets.with_target(*target, LevelFilter::TRACE);
            }

            layers.push(Box::new(
                fmt::layer()
                    .with_writer(nb)
                    .with_target(true)
                    .with_thread_names(true)
                    .with_ansi(false)
                    .with_filter(targets),
            ));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| format!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            component_files = COMPONENT_LOGS.len(),
            "File logging initialized"
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_conversion() {
        assert_eq!(Rotation::from(LogRotation::Daily), Rotation::DAILY);
        assert_eq!(Rotation::from(LogRotation::Never), Rotation::NEVER);
    }

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert!(!config.file_logging);
        assert_eq!(config.console_level, Level::INFO);
        assert!(config.log_dir.ends_with("ingot/logs"));
    }
}
