//! ODBC backend on top of `odbc-api`
//!
//! One process-wide ODBC environment, created on first connect. Each
//! connection runs with autocommit off. Result sets are read eagerly as
//! text on execute, so a cursor holds no open statement handle between
//! calls. NULL cells become JSON `null`.

use std::sync::OnceLock;

use odbc_api::{
    Connection as OdbcConnection, ConnectionOptions, Cursor as _, Environment, ResultSetMetadata,
};
use serde_json::Value;

use super::errors::{DriverError, DriverResult};
use super::{Connection, Cursor, Driver, Row};

static ENVIRONMENT: OnceLock<Environment> = OnceLock::new();

fn environment() -> DriverResult<&'static Environment> {
    if let Some(env) = ENVIRONMENT.get() {
        return Ok(env);
    }
    let env = Environment::new()?;
    // A concurrent first call may have won; either environment is fine
    let _ = ENVIRONMENT.set(env);
    ENVIRONMENT
        .get()
        .ok_or_else(|| DriverError::driver("ODBC environment unavailable"))
}

/// Driver backed by the system ODBC driver manager
#[derive(Debug, Clone, Copy, Default)]
pub struct OdbcDriver;

impl OdbcDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Driver for OdbcDriver {
    fn name(&self) -> &str {
        "odbc"
    }

    fn connect(&self, connection_string: &str) -> DriverResult<Box<dyn Connection>> {
        let connection = environment()?
            .connect_with_connection_string(connection_string, ConnectionOptions::default())?;
        Ok(Box::new(PendingConnection { connection }))
    }
}

struct PendingConnection {
    connection: OdbcConnection<'static>,
}

impl Connection for PendingConnection {
    fn cursor(self: Box<Self>) -> DriverResult<Box<dyn Cursor>> {
        self.connection.set_autocommit(false)?;
        Ok(Box::new(OdbcCursor {
            connection: Some(self.connection),
            columns: Vec::new(),
            rows: None,
        }))
    }
}

struct OdbcCursor {
    connection: Option<OdbcConnection<'static>>,
    columns: Vec<String>,
    /// `None` until a statement produced a result set
    rows: Option<Vec<Row>>,
}

impl OdbcCursor {
    fn connection(&self) -> DriverResult<&OdbcConnection<'static>> {
        self.connection.as_ref().ok_or(DriverError::CursorClosed)
    }
}

impl Cursor for OdbcCursor {
    fn execute(&mut self, sql: &str) -> DriverResult<Option<u64>> {
        self.columns.clear();
        self.rows = None;

        let connection = self.connection()?;
        let mut statement = connection.preallocate()?;
        let mut columns = Vec::new();
        let mut rows = None;

        if let Some(mut cursor) = statement.execute(sql, ())? {
            columns = cursor.column_names()?.collect::<Result<Vec<String>, _>>()?;

            let mut buffer = Vec::new();
            let mut fetched = Vec::new();
            while let Some(mut row) = cursor.next_row()? {
                let mut cells = Vec::with_capacity(columns.len());
                for index in 1..=columns.len() {
                    let column = u16::try_from(index).map_err(|_| {
                        DriverError::IndexOutOfRange(format!("column {}", index))
                    })?;
                    let present = row.get_text(column, &mut buffer)?;
                    cells.push(if present {
                        Value::String(String::from_utf8_lossy(&buffer).into_owned())
                    } else {
                        Value::Null
                    });
                }
                fetched.push(cells);
            }
            rows = Some(fetched);
        }

        let row_count = statement
            .row_count()?
            .and_then(|n| u64::try_from(n).ok());

        self.columns = columns;
        self.rows = rows;
        Ok(row_count)
    }

    fn columns(&self) -> DriverResult<Vec<String>> {
        self.connection()?;
        Ok(self.columns.clone())
    }

    fn fetch_all(&mut self) -> DriverResult<Vec<Row>> {
        self.connection()?;
        self.rows
            .take()
            .ok_or_else(|| DriverError::driver("No results. Previous SQL was not a query."))
    }

    fn commit(&mut self) -> DriverResult<()> {
        Ok(self.connection()?.commit()?)
    }

    fn rollback(&mut self) -> DriverResult<()> {
        Ok(self.connection()?.rollback()?)
    }

    fn close(&mut self) -> DriverResult<()> {
        // Dropping the connection rolls back open work and disconnects
        let connection = self.connection.take().ok_or(DriverError::CursorClosed)?;
        drop(connection);
        self.columns.clear();
        self.rows = None;
        Ok(())
    }
}
