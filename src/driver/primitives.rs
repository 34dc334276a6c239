//! Driver primitives
//!
//! One function per driver call. Each logs `{EVENT}_BEGIN` and then
//! `{EVENT}_COMPLETE` or `{EVENT}_FAILED`, and returns an
//! [`OperationResult`] instead of an error. Nothing here retries.

use crate::observability::{Event, Logger, ObservationScope};
use crate::request::StatementKind;

use super::credentials::Credentials;
use super::errors::{DriverError, DriverResult};
use super::outcome::OperationResult;
use super::{Connection, Cursor, Driver, Record, Row};

fn observe<'a, T>(
    logger: &'a Logger,
    event: Event,
    fields: &[(&'a str, &str)],
    attempt: &str,
    done: &str,
    call: impl FnOnce() -> DriverResult<T>,
) -> OperationResult<T> {
    let scope = ObservationScope::with_fields(logger, event, fields);
    match call() {
        Ok(payload) => {
            scope.complete();
            OperationResult::success(format!("Successfully {}", done), payload)
        }
        Err(error) => {
            let message = format!("An error occurred when trying to {}, {}", attempt, error);
            scope.fail(&message);
            OperationResult::failure(message, error)
        }
    }
}

/// `"<N> row(s) affected"`
pub fn rows_affected_message(row_count: Option<u64>) -> String {
    match row_count {
        Some(n) => format!("{} row(s) affected", n),
        None => "unknown number of row(s) affected".to_string(),
    }
}

pub fn form_connection_string(logger: &Logger, credentials: &Credentials) -> OperationResult<String> {
    let masked = credentials.masked_connection_string();
    observe(
        logger,
        Event::ConnectionStringForm,
        &[("connection", masked.as_str())],
        "form connection string",
        "formed connection string",
        || credentials.connection_string(),
    )
}

pub fn connect(
    logger: &Logger,
    driver: &dyn Driver,
    connection_string: &str,
) -> OperationResult<Box<dyn Connection>> {
    observe(
        logger,
        Event::Connect,
        &[("driver", driver.name())],
        "connect to database",
        "connected to database",
        || driver.connect(connection_string),
    )
}

pub fn create_cursor(
    logger: &Logger,
    connection: Box<dyn Connection>,
) -> OperationResult<Box<dyn Cursor>> {
    observe(
        logger,
        Event::CursorCreate,
        &[],
        "create cursor object",
        "created cursor object",
        || connection.cursor(),
    )
}

pub fn close_cursor(logger: &Logger, cursor: &mut dyn Cursor) -> OperationResult<()> {
    observe(
        logger,
        Event::CursorClose,
        &[],
        "close cursor object",
        "closed cursor object",
        || cursor.close(),
    )
}

/// Execute formed SQL; the payload is the affected row count, if known
pub fn execute(
    logger: &Logger,
    cursor: &mut dyn Cursor,
    kind: StatementKind,
    sql: &str,
) -> OperationResult<Option<u64>> {
    let noun = if kind.is_mutating() { "statement" } else { "query" };
    observe(
        logger,
        Event::StatementExecute,
        &[("kind", kind.as_str()), ("sql", sql)],
        &format!("execute formed {}", noun),
        &format!("executed formed {} {}", noun, sql),
        || cursor.execute(sql),
    )
}

/// Column names of the executed result set; none at all is an error
pub fn fetch_columns(logger: &Logger, cursor: &dyn Cursor) -> OperationResult<Vec<String>> {
    observe(
        logger,
        Event::ColumnsFetch,
        &[],
        "get columns from cursor description",
        "got columns from cursor description",
        || {
            let columns = cursor.columns()?;
            if columns.is_empty() {
                return Err(DriverError::IndexOutOfRange(
                    "cursor description has no columns".to_string(),
                ));
            }
            Ok(columns)
        },
    )
}

pub fn fetch_rows(logger: &Logger, cursor: &mut dyn Cursor) -> OperationResult<Vec<Row>> {
    observe(
        logger,
        Event::RowsFetch,
        &[],
        "get results from cursor",
        "got results from cursor",
        || cursor.fetch_all(),
    )
}

/// Zip each row against the column list, preserving row order
///
/// Width mismatches keep the shorter side: extra columns or extra cells
/// are dropped, and a `ROWS_PAIR_MISMATCH` warning is logged once.
/// A repeated column name keeps the last cell.
pub fn pair_columns_with_rows(
    logger: &Logger,
    columns: &[String],
    rows: Vec<Row>,
) -> OperationResult<Vec<Record>> {
    if let Some(row) = rows.iter().find(|row| row.len() != columns.len()) {
        let column_count = columns.len().to_string();
        let cell_count = row.len().to_string();
        logger.warn(
            Event::RowsPairMismatch,
            &[("columns", column_count.as_str()), ("cells", cell_count.as_str())],
        );
    }

    observe(
        logger,
        Event::RowsPair,
        &[],
        "zip columns with results",
        "zipped columns with results",
        || {
            Ok(rows
                .into_iter()
                .map(|row| columns.iter().cloned().zip(row).collect::<Record>())
                .collect())
        },
    )
}

/// Commit; the payload is the `"<N> row(s) affected"` message
pub fn commit(
    logger: &Logger,
    cursor: &mut dyn Cursor,
    row_count: Option<u64>,
) -> OperationResult<String> {
    observe(
        logger,
        Event::Commit,
        &[],
        "commit changes",
        "committed changes",
        || cursor.commit(),
    )
    .map(|()| rows_affected_message(row_count))
}

pub fn rollback(logger: &Logger, cursor: &mut dyn Cursor) -> OperationResult<()> {
    observe(
        logger,
        Event::Rollback,
        &[],
        "rollback cursor changes",
        "rolled back cursor changes",
        || cursor.rollback(),
    )
}
