//! Observability for sqlcrud
//!
//! - Structured logging (JSON lines) through an injected [`Logger`]
//! - Typed lifecycle [`Event`]s
//! - [`ObservationScope`] for begin/complete/failed triples
//!
//! # Usage
//!
//! ```ignore
//! use sqlcrud::observability::{Event, Logger, LogSink, ObservationScope};
//!
//! let logger = Logger::new(LogSink::Stderr).with_field("transaction_id", "…");
//! let scope = ObservationScope::new(&logger, Event::Connect);
//! // ... do work ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{LogSink, Logger, MemoryLog, Severity};
pub use scope::{ObservationScope, Timer};

use std::fmt;
use std::io;

/// Observability error code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservabilityErrorCode {
    /// Observability operation failed
    SqlObservabilityFailed,
}

impl ObservabilityErrorCode {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            ObservabilityErrorCode::SqlObservabilityFailed => "SQL_OBSERVABILITY_FAILED",
        }
    }
}

impl fmt::Display for ObservabilityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observability error
///
/// Raised only while setting a logger up (opening a file, parsing a
/// level). Once a logger exists, writing to it never fails a request.
#[derive(Debug)]
pub struct ObservabilityError {
    code: ObservabilityErrorCode,
    message: String,
    source: Option<io::Error>,
}

impl ObservabilityError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: ObservabilityErrorCode::SqlObservabilityFailed,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: ObservabilityErrorCode::SqlObservabilityFailed,
            message: message.into(),
            source: Some(source),
        }
    }

    pub fn code(&self) -> ObservabilityErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ObservabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ERROR] {}: {}", self.code, self.message)?;
        if let Some(ref source) = self.source {
            write!(f, " (caused by: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ObservabilityError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for observability operations
pub type ObservabilityResult<T> = Result<T, ObservabilityError>;
