//! Service responses

use serde::Serialize;
use uuid::Uuid;

use crate::driver::Record;
use crate::request::StatementKind;

/// What one statement path produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatementResponse {
    /// SELECT: one record per row, in driver order
    Rows(Vec<Record>),
    /// INSERT / UPDATE / DELETE
    Affected {
        /// `"<N> row(s) affected"`
        message: String,
        row_count: Option<u64>,
    },
}

impl StatementResponse {
    pub fn rows(&self) -> Option<&[Record]> {
        match self {
            StatementResponse::Rows(rows) => Some(rows),
            StatementResponse::Affected { .. } => None,
        }
    }

    pub fn row_count(&self) -> Option<u64> {
        match self {
            StatementResponse::Rows(rows) => u64::try_from(rows.len()).ok(),
            StatementResponse::Affected { row_count, .. } => *row_count,
        }
    }
}

/// One handled request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceResponse {
    pub transaction_id: Uuid,
    pub kind: StatementKind,
    pub data: StatementResponse,
}
