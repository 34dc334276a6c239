//! Inbound argument decoding
//!
//! The caller hands over plain strings: comma-separated column and value
//! lists, a `params[key]=value&...` update string and a raw WHERE
//! fragment. Empty strings count as absent.

use serde::{Deserialize, Serialize};

use super::errors::{RequestError, RequestResult};
use super::kind::StatementKind;
use super::operation::UpdateParam;

/// Raw parameter bundle, exactly as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestArgs {
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub columns: Option<String>,
    #[serde(default)]
    pub values: Option<String>,
    #[serde(default)]
    pub params: Option<String>,
    #[serde(default, rename = "where")]
    pub where_clause: Option<String>,
}

impl RequestArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn values(mut self, values: impl Into<String>) -> Self {
        self.values = Some(values.into());
        self
    }

    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = Some(params.into());
        self
    }

    pub fn where_clause(mut self, where_clause: impl Into<String>) -> Self {
        self.where_clause = Some(where_clause.into());
        self
    }
}

/// Decoded parameters, prior to kind-specific validation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    pub table: Option<String>,
    pub columns: Option<Vec<String>>,
    pub values: Option<Vec<String>>,
    pub update_params: Option<Vec<UpdateParam>>,
    pub where_clause: Option<String>,
}

impl RequestParams {
    /// Decode a raw bundle
    ///
    /// Only the update params string can fail to decode.
    pub fn decode(args: RequestArgs) -> RequestResult<Self> {
        let update_params = match non_empty(args.params) {
            Some(raw) => Some(decode_update_params(&raw)?),
            None => None,
        };

        Ok(Self {
            table: non_empty(args.table),
            columns: non_empty(args.columns).map(|c| comma_split(&c)),
            values: non_empty(args.values).map(|v| comma_split(&v)),
            update_params,
            where_clause: non_empty(args.where_clause),
        })
    }
}

impl RequestParams {
    /// Decode only what `kind` reads; a params string is ignored unless
    /// the kind is UPDATE
    pub fn decode_for(kind: StatementKind, mut args: RequestArgs) -> RequestResult<Self> {
        if kind != StatementKind::Update {
            args.params = None;
        }
        Self::decode(args)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Split on `,` with no trimming and no quote awareness
pub fn comma_split(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

/// Decode `params[key1]=value1&params[key2]=value2` into ordered pairs
///
/// A bare `key=value` segment is accepted too. Values are kept verbatim
/// (no percent-decoding); only the first `=` of a segment splits it.
pub fn decode_update_params(raw: &str) -> RequestResult<Vec<UpdateParam>> {
    raw.split('&')
        .map(|segment| {
            let (lhs, value) = segment.split_once('=').ok_or_else(|| {
                RequestError::MalformedParams(format!(
                    "segment '{}' is not of the form params[key]=value",
                    segment
                ))
            })?;

            let column = lhs
                .strip_prefix("params[")
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(lhs);

            if column.is_empty() {
                return Err(RequestError::MalformedParams(format!(
                    "segment '{}' has an empty key",
                    segment
                )));
            }

            Ok(UpdateParam::new(column, value))
        })
        .collect()
}
