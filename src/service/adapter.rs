//! Driver adapter
//!
//! Owns one cursor (and through it one connection) for the lifetime of a
//! request. Most calls pass straight through to the primitives. Two add
//! a retry policy:
//!
//! - rollback: retried once; the second outcome is returned as-is and
//!   never raised
//! - close: retried once; a second failure is raised as
//!   `SQL_CLOSE_FAILED` (FATAL)
//!
//! The cursor is closed at most once. An adapter dropped without an
//! explicit close closes itself and logs the outcome.

use crate::driver::primitives;
use crate::driver::{Credentials, Cursor, Driver, Failure, OperationResult, Record, Row};
use crate::observability::{Event, Logger};
use crate::request::StatementKind;

use super::errors::{ServiceError, ServiceErrorCode, ServiceResult};

pub struct DriverAdapter {
    cursor: Box<dyn Cursor>,
    logger: Logger,
    closed: bool,
}

impl DriverAdapter {
    /// Form the connection string, connect and create the cursor
    ///
    /// Each stage fails with its own code so configuration problems can be
    /// told apart from connectivity problems.
    pub fn connect(
        driver: &dyn Driver,
        credentials: &Credentials,
        logger: &Logger,
    ) -> ServiceResult<Self> {
        let connection_string = primitives::form_connection_string(logger, credentials)
            .into_result()
            .map_err(|f| ServiceError::from_failure(ServiceErrorCode::SqlConnectionStringFailed, f))?;

        let connection = primitives::connect(logger, driver, &connection_string)
            .into_result()
            .map_err(|f| ServiceError::from_failure(ServiceErrorCode::SqlConnectionFailed, f))?;

        let cursor = primitives::create_cursor(logger, connection)
            .into_result()
            .map_err(|f| ServiceError::from_failure(ServiceErrorCode::SqlCursorFailed, f))?;

        Ok(Self::from_cursor(cursor, logger.clone()))
    }

    /// Adopt an already-open cursor
    pub fn from_cursor(cursor: Box<dyn Cursor>, logger: Logger) -> Self {
        Self {
            cursor,
            logger,
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn execute(&mut self, kind: StatementKind, sql: &str) -> OperationResult<Option<u64>> {
        primitives::execute(&self.logger, self.cursor.as_mut(), kind, sql)
    }

    pub fn fetch_columns(&self) -> OperationResult<Vec<String>> {
        primitives::fetch_columns(&self.logger, self.cursor.as_ref())
    }

    pub fn fetch_rows(&mut self) -> OperationResult<Vec<Row>> {
        primitives::fetch_rows(&self.logger, self.cursor.as_mut())
    }

    pub fn pair_columns_with_rows(
        &self,
        columns: &[String],
        rows: Vec<Row>,
    ) -> OperationResult<Vec<Record>> {
        primitives::pair_columns_with_rows(&self.logger, columns, rows)
    }

    pub fn commit(&mut self, row_count: Option<u64>) -> OperationResult<String> {
        primitives::commit(&self.logger, self.cursor.as_mut(), row_count)
    }

    /// Roll back, retrying once; never raises
    pub fn rollback(&mut self) -> OperationResult<()> {
        let first = primitives::rollback(&self.logger, self.cursor.as_mut());
        if first.is_success() {
            return first;
        }

        self.logger
            .warn(Event::RollbackRetry, &[("reason", first.message())]);
        primitives::rollback(&self.logger, self.cursor.as_mut())
    }

    /// Close the cursor, retrying once; a second failure is FATAL
    pub fn close(&mut self) -> ServiceResult<String> {
        if self.closed {
            return Ok("Cursor object already closed".to_string());
        }

        let first = primitives::close_cursor(&self.logger, self.cursor.as_mut());
        let outcome = if first.is_success() {
            first
        } else {
            self.logger
                .warn(Event::CursorCloseRetry, &[("reason", first.message())]);
            primitives::close_cursor(&self.logger, self.cursor.as_mut())
        };

        // No third attempt, whatever the outcome
        self.closed = true;
        match outcome {
            OperationResult::Success { message, .. } => Ok(message),
            OperationResult::Failure { message, error } => {
                self.logger.fatal(
                    format!("{}_FAILED", Event::CursorClose),
                    &[("reason", message.as_str()), ("attempts", "2")],
                );
                Err(ServiceError::from_failure(
                    ServiceErrorCode::SqlCloseFailed,
                    Failure { message, error },
                ))
            }
        }
    }
}

impl Drop for DriverAdapter {
    fn drop(&mut self) {
        if !self.closed {
            // A failed close has already been logged at FATAL
            let _ = self.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::testing::{Call, ScriptedDriver};
    use crate::driver::DriverError;

    fn credentials() -> Credentials {
        Credentials::new("D", "S", "DB", "U", "P")
    }

    fn adapter(driver: &ScriptedDriver, logger: &Logger) -> DriverAdapter {
        DriverAdapter::connect(driver, &credentials(), logger).unwrap()
    }

    #[test]
    fn test_connect_stage_codes() {
        let logger = Logger::null();

        let bad_creds = Credentials::new("D", "", "DB", "U", "P");
        let err = DriverAdapter::connect(&ScriptedDriver::new(), &bad_creds, &logger)
            .err()
            .unwrap();
        assert_eq!(err.code(), ServiceErrorCode::SqlConnectionStringFailed);

        let driver = ScriptedDriver::new().fail_connect("login timeout");
        let err = DriverAdapter::connect(&driver, &credentials(), &logger).err().unwrap();
        assert_eq!(err.code(), ServiceErrorCode::SqlConnectionFailed);

        let driver = ScriptedDriver::new().fail_cursor("out of handles");
        let err = DriverAdapter::connect(&driver, &credentials(), &logger).err().unwrap();
        assert_eq!(err.code(), ServiceErrorCode::SqlCursorFailed);
    }

    #[test]
    fn test_connect_passes_connection_string() {
        let driver = ScriptedDriver::new();
        let _adapter = adapter(&driver, &Logger::null());
        assert_eq!(
            driver.calls()[0],
            Call::Connect("DRIVER={D};SERVER=S;DATABASE=DB;UID=U;PWD=P".to_string())
        );
    }

    #[test]
    fn test_rollback_retries_once_then_succeeds() {
        let (logger, log) = Logger::memory();
        let driver = ScriptedDriver::new().fail_rollbacks(1);
        let mut adapter = adapter(&driver, &logger);

        let result = adapter.rollback();
        assert!(result.is_success());
        assert_eq!(result.message(), "Successfully rolled back cursor changes");
        assert_eq!(driver.count(&Call::Rollback), 2);
        assert!(log.events().contains(&"ROLLBACK_RETRY".to_string()));
    }

    #[test]
    fn test_rollback_second_failure_is_returned_not_raised() {
        let driver = ScriptedDriver::new().fail_rollbacks(5);
        let mut adapter = adapter(&driver, &Logger::null());

        let result = adapter.rollback();
        assert!(!result.is_success());
        assert_eq!(
            result.message(),
            "An error occurred when trying to rollback cursor changes, rollback failed (attempt 2)"
        );
        assert_eq!(driver.count(&Call::Rollback), 2);
    }

    #[test]
    fn test_close_retries_once_then_succeeds() {
        let driver = ScriptedDriver::new().fail_closes(1);
        let mut adapter = adapter(&driver, &Logger::null());

        assert_eq!(adapter.close().unwrap(), "Successfully closed cursor object");
        assert!(adapter.is_closed());
        assert_eq!(driver.count(&Call::Close), 2);
    }

    #[test]
    fn test_close_second_failure_is_fatal() {
        let (logger, log) = Logger::memory();
        let driver = ScriptedDriver::new().fail_closes(2);
        let mut adapter = adapter(&driver, &logger);

        let err = adapter.close().unwrap_err();
        assert_eq!(err.code(), ServiceErrorCode::SqlCloseFailed);
        assert!(err.is_fatal());
        assert!(err.message().ends_with("close failed (attempt 2)"));
        assert_eq!(
            err.driver_error(),
            Some(&DriverError::driver("close failed (attempt 2)"))
        );
        assert_eq!(driver.count(&Call::Close), 2);
        assert!(log.lines().iter().any(|l| l.contains("\"severity\":\"FATAL\"")));
    }

    #[test]
    fn test_close_runs_at_most_once() {
        let driver = ScriptedDriver::new();
        let mut adapter = adapter(&driver, &Logger::null());

        adapter.close().unwrap();
        adapter.close().unwrap();
        drop(adapter);
        assert_eq!(driver.count(&Call::Close), 1);
    }

    #[test]
    fn test_drop_closes_unclosed_cursor() {
        let driver = ScriptedDriver::new();
        {
            let _adapter = adapter(&driver, &Logger::null());
        }
        assert_eq!(driver.calls().last(), Some(&Call::Close));
    }
}
