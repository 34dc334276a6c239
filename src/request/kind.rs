//! Statement kinds

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::RequestError;
use super::validator::RequestField;

/// The four supported statement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

impl StatementKind {
    pub const ALL: [StatementKind; 4] = [
        StatementKind::Select,
        StatementKind::Insert,
        StatementKind::Update,
        StatementKind::Delete,
    ];

    /// Upper-case SQL keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementKind::Select => "SELECT",
            StatementKind::Insert => "INSERT",
            StatementKind::Update => "UPDATE",
            StatementKind::Delete => "DELETE",
        }
    }

    /// Fields that must be present for this kind
    pub fn required_fields(&self) -> &'static [RequestField] {
        match self {
            StatementKind::Delete => &[RequestField::Table, RequestField::Where],
            StatementKind::Insert => &[
                RequestField::Table,
                RequestField::Columns,
                RequestField::Values,
            ],
            StatementKind::Select => &[RequestField::Table, RequestField::Columns],
            StatementKind::Update => &[RequestField::Table, RequestField::Params],
        }
    }

    /// Whether the statement changes data and therefore commits
    pub fn is_mutating(&self) -> bool {
        !matches!(self, StatementKind::Select)
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatementKind {
    type Err = RequestError;

    /// Case-insensitive; compared upper-cased
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SELECT" => Ok(StatementKind::Select),
            "INSERT" => Ok(StatementKind::Insert),
            "UPDATE" => Ok(StatementKind::Update),
            "DELETE" => Ok(StatementKind::Delete),
            _ => Err(RequestError::invalid_kind(s)),
        }
    }
}
