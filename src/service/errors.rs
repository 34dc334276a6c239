//! Service error types
//!
//! Error codes:
//! - SQL_INVALID_REQUEST (ERROR)
//! - SQL_CONNECTION_STRING_FAILED (FATAL)
//! - SQL_CONNECTION_FAILED (FATAL)
//! - SQL_CURSOR_FAILED (FATAL)
//! - SQL_STATEMENT_FORMATION_FAILED (FATAL)
//! - SQL_EXECUTION_FAILED (ERROR)
//! - SQL_FETCH_FAILED (ERROR)
//! - SQL_COMMIT_FAILED (ERROR)
//! - SQL_CLOSE_FAILED (FATAL)
//!
//! The captured lower-level error stays reachable through
//! [`std::error::Error::source`] and [`ServiceError::cause`]. When a close
//! fails after the statement already failed, the close failure is raised
//! and the statement error rides along in [`ServiceError::masked`].

use std::fmt;

use crate::driver::{DriverError, Failure};
use crate::request::RequestError;
use crate::statement::TemplateError;

/// Service error severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The request failed; the process is fine
    Error,
    /// The request failed before or after any useful work could happen
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "ERROR"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorCode {
    /// Bad statement kind, missing fields or undecodable params
    SqlInvalidRequest,
    /// Credentials could not be turned into a connection string
    SqlConnectionStringFailed,
    SqlConnectionFailed,
    SqlCursorFailed,
    /// Template missing or unrenderable
    SqlStatementFormationFailed,
    SqlExecutionFailed,
    /// Reading columns or rows of a result set
    SqlFetchFailed,
    SqlCommitFailed,
    /// Close failed twice
    SqlCloseFailed,
}

impl ServiceErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            ServiceErrorCode::SqlInvalidRequest => "SQL_INVALID_REQUEST",
            ServiceErrorCode::SqlConnectionStringFailed => "SQL_CONNECTION_STRING_FAILED",
            ServiceErrorCode::SqlConnectionFailed => "SQL_CONNECTION_FAILED",
            ServiceErrorCode::SqlCursorFailed => "SQL_CURSOR_FAILED",
            ServiceErrorCode::SqlStatementFormationFailed => "SQL_STATEMENT_FORMATION_FAILED",
            ServiceErrorCode::SqlExecutionFailed => "SQL_EXECUTION_FAILED",
            ServiceErrorCode::SqlFetchFailed => "SQL_FETCH_FAILED",
            ServiceErrorCode::SqlCommitFailed => "SQL_COMMIT_FAILED",
            ServiceErrorCode::SqlCloseFailed => "SQL_CLOSE_FAILED",
        }
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            ServiceErrorCode::SqlConnectionStringFailed
            | ServiceErrorCode::SqlConnectionFailed
            | ServiceErrorCode::SqlCursorFailed
            | ServiceErrorCode::SqlStatementFormationFailed
            | ServiceErrorCode::SqlCloseFailed => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The captured lower-level error
#[derive(Debug)]
pub enum Cause {
    Request(RequestError),
    Template(TemplateError),
    Driver(DriverError),
}

impl Cause {
    fn as_error(&self) -> &(dyn std::error::Error + 'static) {
        match self {
            Cause::Request(e) => e as &(dyn std::error::Error + 'static),
            Cause::Template(e) => e,
            Cause::Driver(e) => e,
        }
    }
}

#[derive(Debug)]
pub struct ServiceError {
    code: ServiceErrorCode,
    message: String,
    cause: Option<Cause>,
    masked: Option<Box<ServiceError>>,
}

impl ServiceError {
    pub fn new(code: ServiceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            cause: None,
            masked: None,
        }
    }

    /// Wrap a failed primitive, keeping its message and driver error
    pub fn from_failure(code: ServiceErrorCode, failure: Failure) -> Self {
        Self {
            code,
            message: failure.message,
            cause: Some(Cause::Driver(failure.error)),
            masked: None,
        }
    }

    pub fn invalid_request(err: RequestError) -> Self {
        Self {
            code: ServiceErrorCode::SqlInvalidRequest,
            message: err.to_string(),
            cause: Some(Cause::Request(err)),
            masked: None,
        }
    }

    pub fn statement_formation(err: TemplateError) -> Self {
        Self {
            code: ServiceErrorCode::SqlStatementFormationFailed,
            message: format!("An error occurred when trying to form statement, {}", err),
            cause: Some(Cause::Template(err)),
            masked: None,
        }
    }

    /// Attach the earlier error this one took precedence over
    pub fn masking(mut self, earlier: ServiceError) -> Self {
        self.masked = Some(Box::new(earlier));
        self
    }

    /// Returns the error code
    pub fn code(&self) -> ServiceErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the severity
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }

    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// The statement error hidden by a later close failure
    pub fn masked(&self) -> Option<&ServiceError> {
        self.masked.as_deref()
    }

    /// The driver error, when a driver call is what failed
    pub fn driver_error(&self) -> Option<&DriverError> {
        match &self.cause {
            Some(Cause::Driver(e)) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity(), self.code, self.message)
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_ref().map(Cause::as_error)
    }
}

impl From<RequestError> for ServiceError {
    fn from(err: RequestError) -> Self {
        ServiceError::invalid_request(err)
    }
}

impl From<TemplateError> for ServiceError {
    fn from(err: TemplateError) -> Self {
        ServiceError::statement_formation(err)
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
