//! Uniform result of every driver primitive
//!
//! Primitives never raise: each returns an [`OperationResult`] carrying a
//! human-readable message plus either the payload or the captured
//! [`DriverError`]. The orchestration layer decides which failures become
//! errors.

use super::errors::DriverError;

#[derive(Debug)]
pub enum OperationResult<T> {
    Success { message: String, payload: T },
    Failure { message: String, error: DriverError },
}

impl<T> OperationResult<T> {
    pub fn success(message: impl Into<String>, payload: T) -> Self {
        OperationResult::Success {
            message: message.into(),
            payload,
        }
    }

    pub fn failure(message: impl Into<String>, error: DriverError) -> Self {
        OperationResult::Failure {
            message: message.into(),
            error,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            OperationResult::Success { message, .. } => message,
            OperationResult::Failure { message, .. } => message,
        }
    }

    pub fn payload(&self) -> Option<&T> {
        match self {
            OperationResult::Success { payload, .. } => Some(payload),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&DriverError> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { error, .. } => Some(error),
        }
    }

    /// Split into payload or `(message, error)`
    pub fn into_result(self) -> Result<T, Failure> {
        match self {
            OperationResult::Success { payload, .. } => Ok(payload),
            OperationResult::Failure { message, error } => Err(Failure { message, error }),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        match self {
            OperationResult::Success { message, payload } => OperationResult::Success {
                message,
                payload: f(payload),
            },
            OperationResult::Failure { message, error } => {
                OperationResult::Failure { message, error }
            }
        }
    }
}

/// The failure half of an [`OperationResult`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub error: DriverError,
}
