//! Driver layer
//!
//! A [`Driver`] opens a [`Connection`]; a connection yields exactly one
//! [`Cursor`], which owns the connection from then on. All calls block.
//!
//! The [`primitives`] wrap each driver call with logging and turn its
//! outcome into an [`OperationResult`]. Backends:
//!
//! - [`testing::ScriptedDriver`]: in-memory, records calls, injects failures
//! - `odbc::OdbcDriver` (feature `odbc`): the system ODBC driver manager

mod credentials;
mod errors;
mod outcome;
pub mod primitives;
pub mod testing;

#[cfg(feature = "odbc")]
pub mod odbc;

pub use credentials::Credentials;
pub use errors::{DriverError, DriverResult};
pub use outcome::{Failure, OperationResult};

use serde_json::{Map, Value};

/// One row as returned by the driver, cells in column order
pub type Row = Vec<Value>;

/// One row keyed by column name, in column order
pub type Record = Map<String, Value>;

/// Entry point of a backend
pub trait Driver {
    /// Short backend name for logs
    fn name(&self) -> &str;

    fn connect(&self, connection_string: &str) -> DriverResult<Box<dyn Connection>>;
}

/// An open connection that has not produced its cursor yet
pub trait Connection {
    /// Consume the connection; the cursor owns it afterwards
    fn cursor(self: Box<Self>) -> DriverResult<Box<dyn Cursor>>;
}

/// A cursor with its connection; statements are not auto-committed
pub trait Cursor {
    /// Run SQL text; returns the affected row count when the driver knows it
    fn execute(&mut self, sql: &str) -> DriverResult<Option<u64>>;

    /// Column names of the current result set (empty when there is none)
    fn columns(&self) -> DriverResult<Vec<String>>;

    /// All remaining rows of the current result set
    fn fetch_all(&mut self) -> DriverResult<Vec<Row>>;

    fn commit(&mut self) -> DriverResult<()>;

    fn rollback(&mut self) -> DriverResult<()>;

    fn close(&mut self) -> DriverResult<()>;
}
