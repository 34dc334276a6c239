//! Request validation
//!
//! | Kind   | Required                  |
//! |--------|---------------------------|
//! | DELETE | table, where              |
//! | INSERT | table, columns, values    |
//! | SELECT | table, columns            |
//! | UPDATE | table, params             |

use std::fmt;

use super::args::RequestParams;
use super::kind::StatementKind;

/// A named inbound field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestField {
    Table,
    Columns,
    Values,
    Params,
    Where,
}

impl RequestField {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestField::Table => "table",
            RequestField::Columns => "columns",
            RequestField::Values => "values",
            RequestField::Params => "params",
            RequestField::Where => "where",
        }
    }

    fn is_present(&self, params: &RequestParams) -> bool {
        match self {
            RequestField::Table => params.table.is_some(),
            RequestField::Columns => params.columns.is_some(),
            RequestField::Values => params.values.is_some(),
            RequestField::Params => params.update_params.is_some(),
            RequestField::Where => params.where_clause.is_some(),
        }
    }
}

impl fmt::Display for RequestField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Either valid or the reason it is not; never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid,
    Invalid(String),
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid)
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ValidationOutcome::Valid => None,
            ValidationOutcome::Invalid(reason) => Some(reason),
        }
    }
}

pub struct RequestValidator;

impl RequestValidator {
    /// Validate a statement type string against decoded params
    pub fn validate(statement_type: &str, params: &RequestParams) -> ValidationOutcome {
        let kind = match statement_type.parse::<StatementKind>() {
            Ok(kind) => kind,
            Err(e) => return ValidationOutcome::Invalid(e.to_string()),
        };
        Self::validate_kind(kind, params)
    }

    /// Validate params for an already-parsed kind
    pub fn validate_kind(kind: StatementKind, params: &RequestParams) -> ValidationOutcome {
        if Self::missing_fields(kind, params).is_empty() {
            ValidationOutcome::Valid
        } else {
            ValidationOutcome::Invalid(Self::missing_message(kind, params))
        }
    }

    /// Required fields of `kind` absent from `params`, in declaration order
    pub fn missing_fields(kind: StatementKind, params: &RequestParams) -> Vec<RequestField> {
        kind.required_fields()
            .iter()
            .copied()
            .filter(|field| !field.is_present(params))
            .collect()
    }

    pub(crate) fn missing_message(kind: StatementKind, params: &RequestParams) -> String {
        let missing: Vec<&str> = Self::missing_fields(kind, params)
            .iter()
            .map(RequestField::as_str)
            .collect();
        let required: Vec<String> = kind
            .required_fields()
            .iter()
            .map(|f| format!("'{}'", f))
            .collect();

        format!(
            "Missing required parameter(s) for {} statement: {}. Provide values for {}.",
            kind,
            missing.join(", "),
            required.join(", ")
        )
    }
}
