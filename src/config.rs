//! Configuration file
//!
//! ```json
//! {
//!   "credentials": { "driver": "ODBC Driver 18 for SQL Server",
//!                    "server": "localhost", "database": "testdb",
//!                    "username": "user", "password": "secret" },
//!   "templates_dir": "./queries",
//!   "log": { "destination": "stderr", "level": "info" }
//! }
//! ```
//!
//! `templates_dir` and `log` are optional. `log.destination` is `stdout`,
//! `stderr`, `none` or a directory in which a timestamped log file is
//! created.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::driver::Credentials;
use crate::observability::{LogSink, Logger, ObservabilityError, Severity};
use crate::statement::{StatementFormatter, TemplateSource};

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Failed to set up logging: {0}")]
    Logging(#[from] ObservabilityError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub credentials: Credentials,

    /// Directory holding one `.sql` template per kind; built-in when absent
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_destination")]
    pub destination: String,

    #[serde(default = "default_level")]
    pub level: String,
}

fn default_destination() -> String {
    "stderr".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            destination: default_destination(),
            level: default_level(),
        }
    }
}

/// Parsed `log.destination`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogDestination {
    Stdout,
    Stderr,
    None,
    Directory(PathBuf),
}

impl LogConfig {
    pub fn destination(&self) -> LogDestination {
        match self.destination.as_str() {
            "stdout" => LogDestination::Stdout,
            "stderr" => LogDestination::Stderr,
            "none" => LogDestination::None,
            dir => LogDestination::Directory(PathBuf::from(dir)),
        }
    }

    pub fn level(&self) -> ConfigResult<Severity> {
        self.level
            .parse()
            .map_err(|e: ObservabilityError| ConfigError::Invalid(e.message().to_string()))
    }
}

impl Config {
    /// Load and validate
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        self.credentials
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("credentials: {}", e)))?;

        if self.log.destination.is_empty() {
            return Err(ConfigError::Invalid("log.destination must not be empty".to_string()));
        }
        self.log.level()?;

        Ok(())
    }

    pub fn template_source(&self) -> TemplateSource {
        match &self.templates_dir {
            Some(dir) => TemplateSource::directory(dir),
            None => TemplateSource::Builtin,
        }
    }

    pub fn formatter(&self) -> StatementFormatter {
        StatementFormatter::new(self.template_source())
    }

    /// Build the logger; a directory destination creates its log file now
    pub fn logger(&self) -> ConfigResult<Logger> {
        let level = self.log.level()?;
        let logger = match self.log.destination() {
            LogDestination::Stdout => Logger::new(LogSink::Stdout),
            LogDestination::Stderr => Logger::new(LogSink::Stderr),
            LogDestination::None => Logger::null(),
            LogDestination::Directory(dir) => Logger::to_directory(&dir)?,
        };
        Ok(logger.with_min_severity(level))
    }
}
