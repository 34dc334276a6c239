//! Request errors

use thiserror::Error;

/// Result type for request construction
pub type RequestResult<T> = Result<T, RequestError>;

/// Why a request was rejected before any connection was made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    /// Statement kind outside SELECT/INSERT/UPDATE/DELETE
    #[error(
        "An invalid value '{0}' was passed for statement_type. \
         You must use a valid option: select, insert, update or delete."
    )]
    InvalidKind(String),

    /// Kind-specific required fields are absent
    #[error("{0}")]
    MissingFields(String),

    /// The update params string could not be decoded
    #[error("Malformed params: {0}")]
    MalformedParams(String),
}

impl RequestError {
    /// The offending kind is reported lower-cased
    pub fn invalid_kind(value: &str) -> Self {
        RequestError::InvalidKind(value.to_lowercase())
    }
}
