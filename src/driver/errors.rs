//! Driver errors

use thiserror::Error;

/// Result type for raw driver calls
pub type DriverResult<T> = Result<T, DriverError>;

/// Failure reported by (or on behalf of) the underlying driver
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// Error raised by the driver itself
    #[error("{}{message}", state_prefix(.state))]
    Driver {
        /// SQLSTATE when the driver reports one
        state: Option<String>,
        message: String,
    },

    /// Credentials cannot be turned into a connection string
    #[error("Invalid connection string: {0}")]
    ConnectionString(String),

    /// Result metadata has no column at the requested position
    #[error("Index out of range: {0}")]
    IndexOutOfRange(String),

    /// The cursor was already closed
    #[error("Cursor is closed")]
    CursorClosed,
}

impl DriverError {
    pub fn driver(message: impl Into<String>) -> Self {
        DriverError::Driver {
            state: None,
            message: message.into(),
        }
    }

    pub fn with_state(state: impl Into<String>, message: impl Into<String>) -> Self {
        DriverError::Driver {
            state: Some(state.into()),
            message: message.into(),
        }
    }
}

fn state_prefix(state: &Option<String>) -> String {
    state
        .as_ref()
        .map(|s| format!("[{}] ", s))
        .unwrap_or_default()
}

#[cfg(feature = "odbc")]
impl From<odbc_api::Error> for DriverError {
    fn from(e: odbc_api::Error) -> Self {
        DriverError::driver(e.to_string())
    }
}
