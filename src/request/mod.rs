//! Request model
//!
//! A request is built once per external call from a statement type string
//! and a raw [`RequestArgs`] bundle. Construction decodes the arguments,
//! validates them for the statement kind and produces an immutable
//! [`Request`] holding a typed [`Operation`]. Nothing here touches a
//! connection.

mod args;
mod errors;
mod kind;
mod operation;
mod validator;

pub use args::{comma_split, decode_update_params, RequestArgs, RequestParams};
pub use errors::{RequestError, RequestResult};
pub use kind::StatementKind;
pub use operation::{DeleteOp, InsertOp, Operation, SelectOp, UpdateOp, UpdateParam};
pub use validator::{RequestField, RequestValidator, ValidationOutcome};

/// A validated request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    operation: Operation,
}

impl Request {
    /// Decode and validate
    pub fn new(statement_type: &str, args: RequestArgs) -> RequestResult<Self> {
        let kind: StatementKind = statement_type.parse()?;
        let params = RequestParams::decode_for(kind, args)?;

        if let ValidationOutcome::Invalid(reason) = RequestValidator::validate_kind(kind, &params) {
            return Err(RequestError::MissingFields(reason));
        }

        Ok(Self {
            operation: Operation::from_params(kind, params)?,
        })
    }

    pub fn kind(&self) -> StatementKind {
        self.operation.kind()
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }
}
