//! Statement formatter
//!
//! Produces literal SQL text. Values are substituted verbatim: nothing is
//! escaped, quoted per type or bound as a parameter. A value containing a
//! single quote breaks the statement, and a crafted WHERE fragment can
//! change what the statement does. Callers that accept untrusted input
//! must not use this layer as-is.

use crate::request::{
    DeleteOp, InsertOp, Operation, SelectOp, StatementKind, UpdateOp, UpdateParam,
};

use super::errors::TemplateResult;
use super::template::TemplateSource;

/// `a,b` → `'a','b'`; purely textual
pub fn listify_values(values: &[String]) -> String {
    format!("'{}'", values.join("','"))
}

/// `[{a: 1}, {b: 2}]` → `a = '1', b = '2'`
pub fn set_clause(params: &[UpdateParam]) -> String {
    params
        .iter()
        .map(|p| format!("{} = '{}'", p.column, p.value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `Some("id = '1'")` → `WHERE id = '1'`, `None` → empty
pub fn where_fragment(where_clause: Option<&str>) -> String {
    match where_clause {
        Some(clause) => format!("WHERE {}", clause),
        None => String::new(),
    }
}

/// Columns inlined as a comma-joined list
pub fn join_columns(columns: &[String]) -> String {
    columns.join(",")
}

#[derive(Debug, Clone, Default)]
pub struct StatementFormatter {
    source: TemplateSource,
}

impl StatementFormatter {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Form the SQL text for any operation
    pub fn form(&self, operation: &Operation) -> TemplateResult<String> {
        match operation {
            Operation::Select(op) => self.form_select(op),
            Operation::Insert(op) => self.form_insert(op),
            Operation::Update(op) => self.form_update(op),
            Operation::Delete(op) => self.form_delete(op),
        }
    }

    /// Slots: columns, table, where fragment
    pub fn form_select(&self, op: &SelectOp) -> TemplateResult<String> {
        let template = self.source.load(StatementKind::Select)?;
        let columns = join_columns(&op.columns);
        let where_sql = where_fragment(op.where_clause.as_deref());
        template.render(&[columns.as_str(), op.table.as_str(), where_sql.as_str()])
    }

    /// Slots: table, columns, value list
    pub fn form_insert(&self, op: &InsertOp) -> TemplateResult<String> {
        let template = self.source.load(StatementKind::Insert)?;
        let columns = join_columns(&op.columns);
        let values = listify_values(&op.values);
        template.render(&[op.table.as_str(), columns.as_str(), values.as_str()])
    }

    /// Slots: table, set clause, where fragment
    pub fn form_update(&self, op: &UpdateOp) -> TemplateResult<String> {
        let template = self.source.load(StatementKind::Update)?;
        let assignments = set_clause(&op.params);
        let where_sql = where_fragment(op.where_clause.as_deref());
        template.render(&[op.table.as_str(), assignments.as_str(), where_sql.as_str()])
    }

    /// Slots: table, raw where clause
    pub fn form_delete(&self, op: &DeleteOp) -> TemplateResult<String> {
        let template = self.source.load(StatementKind::Delete)?;
        template.render(&[op.table.as_str(), op.where_clause.as_str()])
    }
}
