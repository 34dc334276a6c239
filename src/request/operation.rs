//! Validated operations
//!
//! One variant per statement kind, holding exactly the fields that kind
//! needs. Built only from [`RequestParams`] that passed validation.

use serde::{Deserialize, Serialize};

use super::args::RequestParams;
use super::errors::{RequestError, RequestResult};
use super::kind::StatementKind;
use super::validator::RequestValidator;

/// One `column = 'value'` assignment of an UPDATE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateParam {
    pub column: String,
    pub value: String,
}

impl UpdateParam {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOp {
    pub table: String,
    pub columns: Vec<String>,
    #[serde(default)]
    pub where_clause: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOp {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

/// UPDATE without a WHERE clause applies to every row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOp {
    pub table: String,
    pub params: Vec<UpdateParam>,
    #[serde(default)]
    pub where_clause: Option<String>,
}

/// DELETE always carries a WHERE clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOp {
    pub table: String,
    pub where_clause: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    Select(SelectOp),
    Insert(InsertOp),
    Update(UpdateOp),
    Delete(DeleteOp),
}

impl Operation {
    /// Build the operation for `kind` from decoded params
    pub fn from_params(kind: StatementKind, params: RequestParams) -> RequestResult<Self> {
        let missing = || RequestError::MissingFields(RequestValidator::missing_message(kind, &params));

        let op = match kind {
            StatementKind::Select => match (&params.table, &params.columns) {
                (Some(table), Some(columns)) => Operation::Select(SelectOp {
                    table: table.clone(),
                    columns: columns.clone(),
                    where_clause: params.where_clause.clone(),
                }),
                _ => return Err(missing()),
            },
            StatementKind::Insert => match (&params.table, &params.columns, &params.values) {
                (Some(table), Some(columns), Some(values)) => Operation::Insert(InsertOp {
                    table: table.clone(),
                    columns: columns.clone(),
                    values: values.clone(),
                }),
                _ => return Err(missing()),
            },
            StatementKind::Update => match (&params.table, &params.update_params) {
                (Some(table), Some(update_params)) => Operation::Update(UpdateOp {
                    table: table.clone(),
                    params: update_params.clone(),
                    where_clause: params.where_clause.clone(),
                }),
                _ => return Err(missing()),
            },
            StatementKind::Delete => match (&params.table, &params.where_clause) {
                (Some(table), Some(where_clause)) => Operation::Delete(DeleteOp {
                    table: table.clone(),
                    where_clause: where_clause.clone(),
                }),
                _ => return Err(missing()),
            },
        };

        Ok(op)
    }

    pub fn kind(&self) -> StatementKind {
        match self {
            Operation::Select(_) => StatementKind::Select,
            Operation::Insert(_) => StatementKind::Insert,
            Operation::Update(_) => StatementKind::Update,
            Operation::Delete(_) => StatementKind::Delete,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            Operation::Select(op) => &op.table,
            Operation::Insert(op) => &op.table,
            Operation::Update(op) => &op.table,
            Operation::Delete(op) => &op.table,
        }
    }
}
