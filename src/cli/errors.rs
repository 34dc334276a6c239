//! CLI-specific error types
//!
//! Service errors are not CLI errors: they are reported to stdout as a
//! JSON error envelope. A `CliError` means the command itself could not
//! run.

use std::fmt;
use std::io;

use crate::config::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Command needs a backend this build does not include
    Unsupported,
    /// A statement failed; the envelope was already written
    StatementFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "SQL_CLI_CONFIG_ERROR",
            Self::IoError => "SQL_CLI_IO_ERROR",
            Self::Unsupported => "SQL_CLI_UNSUPPORTED",
            Self::StatementFailed => "SQL_CLI_STATEMENT_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::Unsupported, msg)
    }

    pub fn statement_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::StatementFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(CliError::unsupported("x").code_str(), "SQL_CLI_UNSUPPORTED");
        assert_eq!(CliError::config_error("x").code_str(), "SQL_CLI_CONFIG_ERROR");
    }

    #[test]
    fn test_config_error_converts() {
        let err: CliError = ConfigError::Invalid("credentials: missing server".into()).into();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
        assert!(err.to_string().starts_with("SQL_CLI_CONFIG_ERROR: Invalid config"));
    }
}
