//! Configuration management for the Ingot server
//!
//! Sources, lowest to highest precedence: `conf/application.yml` (or the file
//! given with `--config`), `INGOT_*` environment variables, command line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use config::{Config, Environment, File};
use tracing::Level;

use ingot_common::{DEFAULT_LOCK_TTL_SECS, IngotError, Result};
use ingot_core::IngestionConfig;
use ingot_persistence::StorageMode;

use crate::startup::{LogRotation, LoggingConfig};

pub const DEFAULT_CONFIG_FILE: &str = "conf/application";

pub const STORAGE_MODE: &str = "storage.mode";
pub const STORAGE_DATA_DIR: &str = "storage.data_dir";
pub const LOCK_TTL_SECS: &str = "lock.ttl_secs";
pub const LOCK_CLEANUP_INTERVAL_MS: &str = "lock.cleanup_interval_ms";
pub const LOG_LEVEL: &str = "log.level";
pub const LOG_DIR: &str = "log.dir";
pub const LOG_FILE_ENABLED: &str = "log.file_enabled";
pub const METRICS_EXPORT_PATH: &str = "metrics.export_path";

const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_CLEANUP_INTERVAL_MS: u64 = 5000;
/// Upper bound for `lock.ttl_secs`: one day
pub const MAX_LOCK_TTL_SECS: i64 = 86_400;

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "ingot", version, about = "Duplicate-safe content ingestion")]
pub struct Cli {
    /// Configuration file (defaults to conf/application.yml when present)
    #[arg(short = 'c', long = "config", env = "INGOT_CONFIG")]
    pub config_file: Option<String>,
    /// Storage mode: memory or embedded
    #[arg(short = 'm', long = "storage-mode")]
    pub storage_mode: Option<String>,
    /// Data directory for embedded storage
    #[arg(short = 'd', long = "data-dir")]
    pub data_dir: Option<String>,
    /// Lock time-to-live in seconds
    #[arg(long = "lock-ttl-secs")]
    pub lock_ttl_secs: Option<u64>,
    /// Write metrics in Prometheus text format to this file on exit
    #[arg(long = "metrics-file")]
    pub metrics_file: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Ingest one item per non-empty line from the given files, or stdin
    Ingest { files: Vec<PathBuf> },
    /// Print all stored items
    List,
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    pub fn new(args: &Cli) -> Result<Self> {
        let file = match &args.config_file {
            Some(path) => File::with_name(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let mut config_builder = Config::builder().add_source(file).add_source(
            Environment::with_prefix("INGOT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(v) = &args.storage_mode {
            config_builder = config_builder
                .set_override(STORAGE_MODE, v.as_str())
                .map_err(config_error)?;
        }
        if let Some(v) = &args.data_dir {
            config_builder = config_builder
                .set_override(STORAGE_DATA_DIR, v.as_str())
                .map_err(config_error)?;
        }
        if let Some(v) = args.lock_ttl_secs {
            config_builder = config_builder
                .set_override(LOCK_TTL_SECS, v)
                .map_err(config_error)?;
        }
        if let Some(v) = &args.metrics_file {
            config_builder = config_builder
                .set_override(METRICS_EXPORT_PATH, v.as_str())
                .map_err(config_error)?;
        }

        let config = config_builder.build().map_err(config_error)?;

        Ok(Configuration { config })
    }

    // ========================================================================
    // Storage Configuration
    // ========================================================================

    pub fn storage_mode(&self) -> Result<StorageMode> {
        match self.config.get_string(STORAGE_MODE) {
            Ok(v) => v.parse().map_err(IngotError::ConfigError),
            Err(_) => Ok(StorageMode::default()),
        }
    }

    pub fn embedded_data_dir(&self) -> String {
        self.config
            .get_string(STORAGE_DATA_DIR)
            .unwrap_or(DEFAULT_DATA_DIR.to_string())
    }

    // ========================================================================
    // Lock Configuration
    // ========================================================================

    pub fn lock_ttl(&self) -> Result<Duration> {
        let secs = match self.config.get_int(LOCK_TTL_SECS) {
            Ok(v) => v,
            Err(config::ConfigError::NotFound(_)) => DEFAULT_LOCK_TTL_SECS as i64,
            Err(e) => return Err(config_error(e)),
        };
        if !(1..=MAX_LOCK_TTL_SECS).contains(&secs) {
            return Err(IngotError::ConfigError(format!(
                "{} must be between 1 and {}, got {}",
                LOCK_TTL_SECS, MAX_LOCK_TTL_SECS, secs
            )));
        }
        Ok(Duration::from_secs(secs as u64))
    }

    pub fn lock_cleanup_interval(&self) -> Duration {
        let ms = self
            .config
            .get_int(LOCK_CLEANUP_INTERVAL_MS)
            .ok()
            .filter(|v| *v > 0)
            .map(|v| v as u64)
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_MS);
        Duration::from_millis(ms)
    }

    pub fn ingestion_config(&self) -> Result<IngestionConfig> {
        Ok(IngestionConfig {
            lock_ttl: self.lock_ttl()?,
        })
    }

    // ========================================================================
    // Metrics Configuration
    // ========================================================================

    pub fn metrics_export_path(&self) -> Option<PathBuf> {
        self.config
            .get_string(METRICS_EXPORT_PATH)
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    // ========================================================================
    // Logging Configuration
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        let defaults = LoggingConfig::from_env();

        LoggingConfig {
            log_dir: self
                .config
                .get_string(LOG_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            console_level: self
                .config
                .get_string(LOG_LEVEL)
                .ok()
                .and_then(|v| v.parse::<Level>().ok())
                .unwrap_or(defaults.console_level),
            file_logging: self
                .config
                .get_bool(LOG_FILE_ENABLED)
                .unwrap_or(defaults.file_logging),
            rotation: LogRotation::Daily,
        }
    }
}

fn config_error(e: config::ConfigError) -> IngotError {
    IngotError::ConfigError(e.to_string())
}
