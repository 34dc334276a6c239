//! Scripted in-memory driver
//!
//! Stands in for a real database in tests and dry runs. Every cursor
//! call is recorded in order, and any call can be made to fail. The
//! rollback and close failures are counted, so "fail once, then succeed"
//! can be scripted. Their messages carry the attempt number, e.g.
//! `rollback failed (attempt 2)`.

use std::sync::{Arc, Mutex, MutexGuard};

use super::errors::{DriverError, DriverResult};
use super::{Connection, Cursor, Driver, Row};

/// A recorded driver call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect(String),
    Cursor,
    Execute(String),
    Columns,
    FetchAll,
    Commit,
    Rollback,
    Close,
}

#[derive(Debug, Default)]
struct Script {
    connect_error: Option<String>,
    cursor_error: Option<String>,
    execute_error: Option<String>,
    columns_error: Option<String>,
    fetch_error: Option<String>,
    commit_error: Option<String>,
    rollback_failures: usize,
    close_failures: usize,
    columns: Vec<String>,
    rows: Vec<Row>,
    row_count: Option<u64>,
    calls: Vec<Call>,
}

impl Script {
    fn attempts(&self, call: &Call) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }
}

/// Driver whose behavior is set up front
#[derive(Debug, Clone, Default)]
pub struct ScriptedDriver {
    script: Arc<Mutex<Script>>,
}

impl ScriptedDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A poisoned script only happens after a test already panicked
        match self.script.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn edit(self, f: impl FnOnce(&mut Script)) -> Self {
        f(&mut self.script());
        self
    }

    /// Result set returned after any execute
    pub fn returning_rows<S: Into<String>>(
        self,
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Row>,
    ) -> Self {
        let columns = columns.into_iter().map(Into::into).collect();
        self.edit(|s| {
            s.columns = columns;
            s.rows = rows;
        })
    }

    pub fn with_row_count(self, row_count: u64) -> Self {
        self.edit(|s| s.row_count = Some(row_count))
    }

    pub fn fail_connect(self, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| s.connect_error = Some(message))
    }

    pub fn fail_cursor(self, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| s.cursor_error = Some(message))
    }

    pub fn fail_execute(self, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| s.execute_error = Some(message))
    }

    pub fn fail_columns(self, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| s.columns_error = Some(message))
    }

    pub fn fail_fetch(self, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| s.fetch_error = Some(message))
    }

    pub fn fail_commit(self, message: &str) -> Self {
        let message = message.to_string();
        self.edit(|s| s.commit_error = Some(message))
    }

    /// The next `n` rollback calls fail
    pub fn fail_rollbacks(self, n: usize) -> Self {
        self.edit(|s| s.rollback_failures = n)
    }

    /// The next `n` close calls fail
    pub fn fail_closes(self, n: usize) -> Self {
        self.edit(|s| s.close_failures = n)
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    /// How many recorded calls match `call` (ignoring SQL text for executes)
    pub fn count(&self, call: &Call) -> usize {
        self.script()
            .calls
            .iter()
            .filter(|c| match (c, call) {
                (Call::Execute(_), Call::Execute(_)) => true,
                (Call::Connect(_), Call::Connect(_)) => true,
                (a, b) => *a == b,
            })
            .count()
    }
}

fn scripted_failure(error: &Option<String>) -> DriverResult<()> {
    match error {
        Some(message) => Err(DriverError::driver(message.clone())),
        None => Ok(()),
    }
}

impl Driver for ScriptedDriver {
    fn name(&self) -> &str {
        "scripted"
    }

    fn connect(&self, connection_string: &str) -> DriverResult<Box<dyn Connection>> {
        let mut script = self.script();
        script.calls.push(Call::Connect(connection_string.to_string()));
        scripted_failure(&script.connect_error)?;
        Ok(Box::new(ScriptedConnection {
            driver: self.clone(),
        }))
    }
}

struct ScriptedConnection {
    driver: ScriptedDriver,
}

impl Connection for ScriptedConnection {
    fn cursor(self: Box<Self>) -> DriverResult<Box<dyn Cursor>> {
        {
            let mut script = self.driver.script();
            script.calls.push(Call::Cursor);
            scripted_failure(&script.cursor_error)?;
        }
        Ok(Box::new(ScriptedCursor {
            driver: self.driver,
            executed: false,
            closed: false,
        }))
    }
}

struct ScriptedCursor {
    driver: ScriptedDriver,
    executed: bool,
    closed: bool,
}

impl ScriptedCursor {
    fn ensure_open(&self) -> DriverResult<()> {
        if self.closed {
            Err(DriverError::CursorClosed)
        } else {
            Ok(())
        }
    }
}

impl Cursor for ScriptedCursor {
    fn execute(&mut self, sql: &str) -> DriverResult<Option<u64>> {
        self.ensure_open()?;
        let mut script = self.driver.script();
        script.calls.push(Call::Execute(sql.to_string()));
        scripted_failure(&script.execute_error)?;
        self.executed = true;
        Ok(script.row_count)
    }

    fn columns(&self) -> DriverResult<Vec<String>> {
        self.ensure_open()?;
        let mut script = self.driver.script();
        script.calls.push(Call::Columns);
        scripted_failure(&script.columns_error)?;
        if self.executed {
            Ok(script.columns.clone())
        } else {
            Ok(Vec::new())
        }
    }

    fn fetch_all(&mut self) -> DriverResult<Vec<Row>> {
        self.ensure_open()?;
        let mut script = self.driver.script();
        script.calls.push(Call::FetchAll);
        scripted_failure(&script.fetch_error)?;
        if !self.executed {
            return Err(DriverError::driver("No results. Previous SQL was not a query."));
        }
        self.executed = false;
        Ok(script.rows.clone())
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.ensure_open()?;
        let mut script = self.driver.script();
        script.calls.push(Call::Commit);
        scripted_failure(&script.commit_error)
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.ensure_open()?;
        let mut script = self.driver.script();
        script.calls.push(Call::Rollback);
        if script.rollback_failures > 0 {
            script.rollback_failures -= 1;
            let attempt = script.attempts(&Call::Rollback);
            return Err(DriverError::driver(format!("rollback failed (attempt {})", attempt)));
        }
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        let mut script = self.driver.script();
        script.calls.push(Call::Close);
        if script.close_failures > 0 {
            script.close_failures -= 1;
            let attempt = script.attempts(&Call::Close);
            return Err(DriverError::driver(format!("close failed (attempt {})", attempt)));
        }
        self.closed = true;
        Ok(())
    }
}
