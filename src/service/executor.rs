//! Statement execution paths
//!
//! Mutating paths (INSERT / UPDATE / DELETE):
//!
//! ```text
//! form -> execute -> commit -> Affected
//!           |          |
//!           +----------+--> rollback (once, with retry) -> error
//! ```
//!
//! SELECT:
//!
//! ```text
//! form -> execute -> fetch columns -> fetch rows -> pair -> Rows
//!           |
//!           +--> rollback (once, with retry) -> error
//! ```
//!
//! Formation failures never roll back: nothing has run yet. Fetch and
//! pairing failures on SELECT do not roll back either. Closing the cursor
//! is the caller's job.

use crate::driver::{Failure, OperationResult};
use crate::observability::{Event, Logger, ObservationScope};
use crate::request::{DeleteOp, InsertOp, Operation, SelectOp, StatementKind, UpdateOp};
use crate::statement::{StatementFormatter, TemplateResult};

use super::adapter::DriverAdapter;
use super::errors::{ServiceError, ServiceErrorCode, ServiceResult};
use super::response::StatementResponse;

pub struct StatementExecutor<'a> {
    formatter: &'a StatementFormatter,
    logger: &'a Logger,
}

impl<'a> StatementExecutor<'a> {
    pub fn new(formatter: &'a StatementFormatter, logger: &'a Logger) -> Self {
        Self { formatter, logger }
    }

    /// Dispatch on the operation kind
    pub fn run(
        &self,
        adapter: &mut DriverAdapter,
        operation: &Operation,
    ) -> ServiceResult<StatementResponse> {
        match operation {
            Operation::Select(op) => self.select(adapter, op),
            Operation::Insert(op) => self.insert(adapter, op),
            Operation::Update(op) => self.update(adapter, op),
            Operation::Delete(op) => self.delete(adapter, op),
        }
    }

    /// Form the SQL for an operation without running it
    pub fn form(&self, operation: &Operation) -> ServiceResult<String> {
        self.observe_formation(operation.kind(), || self.formatter.form(operation))
    }

    pub fn delete(
        &self,
        adapter: &mut DriverAdapter,
        op: &DeleteOp,
    ) -> ServiceResult<StatementResponse> {
        let sql = self.observe_formation(StatementKind::Delete, || self.formatter.form_delete(op))?;
        self.mutate(adapter, StatementKind::Delete, &sql)
    }

    pub fn insert(
        &self,
        adapter: &mut DriverAdapter,
        op: &InsertOp,
    ) -> ServiceResult<StatementResponse> {
        let sql = self.observe_formation(StatementKind::Insert, || self.formatter.form_insert(op))?;
        self.mutate(adapter, StatementKind::Insert, &sql)
    }

    pub fn update(
        &self,
        adapter: &mut DriverAdapter,
        op: &UpdateOp,
    ) -> ServiceResult<StatementResponse> {
        let sql = self.observe_formation(StatementKind::Update, || self.formatter.form_update(op))?;
        self.mutate(adapter, StatementKind::Update, &sql)
    }

    pub fn select(
        &self,
        adapter: &mut DriverAdapter,
        op: &SelectOp,
    ) -> ServiceResult<StatementResponse> {
        let sql = self.observe_formation(StatementKind::Select, || self.formatter.form_select(op))?;

        adapter
            .execute(StatementKind::Select, &sql)
            .into_result()
            .map_err(|f| self.roll_back_after(adapter, ServiceErrorCode::SqlExecutionFailed, f))?;

        let columns = adapter.fetch_columns().into_result().map_err(fetch_failed)?;
        let rows = adapter.fetch_rows().into_result().map_err(fetch_failed)?;
        let records = adapter
            .pair_columns_with_rows(&columns, rows)
            .into_result()
            .map_err(fetch_failed)?;

        Ok(StatementResponse::Rows(records))
    }

    fn mutate(
        &self,
        adapter: &mut DriverAdapter,
        kind: StatementKind,
        sql: &str,
    ) -> ServiceResult<StatementResponse> {
        let row_count = adapter
            .execute(kind, sql)
            .into_result()
            .map_err(|f| self.roll_back_after(adapter, ServiceErrorCode::SqlExecutionFailed, f))?;

        let message = adapter
            .commit(row_count)
            .into_result()
            .map_err(|f| self.roll_back_after(adapter, ServiceErrorCode::SqlCommitFailed, f))?;

        Ok(StatementResponse::Affected { message, row_count })
    }

    /// One rollback (with its own single retry), then the failure that caused it
    fn roll_back_after(
        &self,
        adapter: &mut DriverAdapter,
        code: ServiceErrorCode,
        failure: Failure,
    ) -> ServiceError {
        if let OperationResult::Failure { message, .. } = adapter.rollback() {
            self.logger.error(
                format!("{}_ABANDONED", Event::Rollback),
                &[("reason", message.as_str()), ("after", code.code())],
            );
        }
        ServiceError::from_failure(code, failure)
    }

    fn observe_formation(
        &self,
        kind: StatementKind,
        form: impl FnOnce() -> TemplateResult<String>,
    ) -> ServiceResult<String> {
        let scope =
            ObservationScope::with_fields(self.logger, Event::StatementForm, &[("kind", kind.as_str())]);
        match form() {
            Ok(sql) => {
                scope.complete_with_fields(&[("sql", sql.as_str())]);
                Ok(sql)
            }
            Err(err) => {
                scope.fail(&err.to_string());
                Err(ServiceError::statement_formation(err))
            }
        }
    }
}

fn fetch_failed(failure: Failure) -> ServiceError {
    ServiceError::from_failure(ServiceErrorCode::SqlFetchFailed, failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{Call, ScriptedDriver};
    use crate::driver::Credentials;
    use crate::request::UpdateParam;
    use crate::statement::TemplateSource;
    use serde_json::json;

    fn adapter(driver: &ScriptedDriver, logger: &Logger) -> DriverAdapter {
        let creds = Credentials::new("D", "S", "DB", "U", "P");
        DriverAdapter::connect(driver, &creds, logger).unwrap()
    }

    fn executed(driver: &ScriptedDriver) -> Vec<String> {
        driver
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Execute(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    fn delete_op() -> DeleteOp {
        DeleteOp {
            table: "tbl".to_string(),
            where_clause: "id = '1'".to_string(),
        }
    }

    #[test]
    fn test_delete_commits() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new().with_row_count(1);
        let mut adapter = adapter(&driver, &logger);

        let response = StatementExecutor::new(&formatter, &logger)
            .delete(&mut adapter, &delete_op())
            .unwrap();

        assert_eq!(
            response,
            StatementResponse::Affected {
                message: "1 row(s) affected".to_string(),
                row_count: Some(1),
            }
        );
        assert_eq!(executed(&driver), vec!["DELETE FROM tbl WHERE id = '1'"]);
        assert_eq!(driver.count(&Call::Commit), 1);
        assert_eq!(driver.count(&Call::Rollback), 0);
    }

    #[test]
    fn test_insert_sql() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new();
        let mut adapter = adapter(&driver, &logger);

        let op = InsertOp {
            table: "tbl".to_string(),
            columns: vec!["attr1".to_string(), "attr2".to_string()],
            values: vec!["value1".to_string(), "value2".to_string()],
        };
        StatementExecutor::new(&formatter, &logger)
            .insert(&mut adapter, &op)
            .unwrap();

        assert_eq!(
            executed(&driver),
            vec!["INSERT INTO tbl (attr1,attr2) VALUES ('value1','value2')"]
        );
    }

    #[test]
    fn test_update_without_where_touches_every_row() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new();
        let mut adapter = adapter(&driver, &logger);

        let op = UpdateOp {
            table: "tbl".to_string(),
            params: vec![UpdateParam::new("attr1", "value1"), UpdateParam::new("attr2", "value2")],
            where_clause: None,
        };
        StatementExecutor::new(&formatter, &logger)
            .update(&mut adapter, &op)
            .unwrap();

        assert_eq!(
            executed(&driver),
            vec!["UPDATE tbl SET attr1 = 'value1', attr2 = 'value2'"]
        );
    }

    #[test]
    fn test_execute_failure_rolls_back_once() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new().fail_execute("syntax error");
        let mut adapter = adapter(&driver, &logger);

        let err = StatementExecutor::new(&formatter, &logger)
            .delete(&mut adapter, &delete_op())
            .unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlExecutionFailed);
        assert!(err.message().contains("syntax error"));
        assert_eq!(driver.count(&Call::Rollback), 1);
        assert_eq!(driver.count(&Call::Commit), 0);
    }

    #[test]
    fn test_commit_failure_rolls_back_once() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new().fail_commit("deadlock");
        let mut adapter = adapter(&driver, &logger);

        let err = StatementExecutor::new(&formatter, &logger)
            .delete(&mut adapter, &delete_op())
            .unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlCommitFailed);
        assert_eq!(driver.count(&Call::Rollback), 1);
    }

    #[test]
    fn test_failed_rollback_keeps_execute_error() {
        let (logger, log) = Logger::memory();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new().fail_commit("deadlock").fail_rollbacks(2);
        let mut adapter = adapter(&driver, &logger);

        let err = StatementExecutor::new(&formatter, &logger)
            .delete(&mut adapter, &delete_op())
            .unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlCommitFailed);
        assert_eq!(driver.count(&Call::Rollback), 2);
        assert!(log.events().contains(&"ROLLBACK_ABANDONED".to_string()));
    }

    #[test]
    fn test_select_pairs_records() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new()
            .returning_rows(["attr1", "attr2"], vec![vec![json!("value1"), json!("value2")]]);
        let mut adapter = adapter(&driver, &logger);

        let op = SelectOp {
            table: "tbl".to_string(),
            columns: vec!["attr1".to_string(), "attr2".to_string()],
            where_clause: Some("id = '1'".to_string()),
        };
        let response = StatementExecutor::new(&formatter, &logger)
            .select(&mut adapter, &op)
            .unwrap();

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!([{"attr1": "value1", "attr2": "value2"}])
        );
        assert_eq!(executed(&driver), vec!["SELECT attr1,attr2 FROM tbl WHERE id = '1'"]);
        assert_eq!(driver.count(&Call::Commit), 0);
    }

    #[test]
    fn test_select_fetch_failure_does_not_roll_back() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new().fail_fetch("connection reset");
        let mut adapter = adapter(&driver, &logger);

        let op = SelectOp {
            table: "tbl".to_string(),
            columns: vec!["a".to_string()],
            where_clause: None,
        };
        let err = StatementExecutor::new(&formatter, &logger)
            .select(&mut adapter, &op)
            .unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlFetchFailed);
        assert_eq!(driver.count(&Call::Rollback), 0);
    }

    #[test]
    fn test_select_columns_failure_is_fetch_failure() {
        let logger = Logger::null();
        let formatter = StatementFormatter::default();
        let driver = ScriptedDriver::new()
            .returning_rows(["a"], vec![])
            .fail_columns("invalid descriptor index");
        let mut adapter = adapter(&driver, &logger);

        let op = SelectOp {
            table: "tbl".to_string(),
            columns: vec!["a".to_string()],
            where_clause: None,
        };
        let err = StatementExecutor::new(&formatter, &logger)
            .select(&mut adapter, &op)
            .unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlFetchFailed);
        assert!(err.message().ends_with("invalid descriptor index"));
        assert_eq!(driver.count(&Call::FetchAll), 0);
        assert_eq!(driver.count(&Call::Rollback), 0);
    }

    #[test]
    fn test_formation_failure_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let logger = Logger::null();
        let formatter = StatementFormatter::new(TemplateSource::directory(dir.path()));
        let driver = ScriptedDriver::new();
        let mut adapter = adapter(&driver, &logger);

        let err = StatementExecutor::new(&formatter, &logger)
            .delete(&mut adapter, &delete_op())
            .unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlStatementFormationFailed);
        assert!(executed(&driver).is_empty());
        assert_eq!(driver.count(&Call::Rollback), 0);
    }
}
