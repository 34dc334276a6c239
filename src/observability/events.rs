//! Observable events
//!
//! Every driver primitive and every request stage has a typed event.
//! Scoped events are logged with `_BEGIN`, `_COMPLETE` and `_FAILED`
//! suffixes (see [`super::ObservationScope`]).

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Request lifecycle
    RequestReceived,
    RequestRejected,
    RequestComplete,
    RequestFailed,

    // Connection
    ConnectionStringForm,
    Connect,
    CursorCreate,
    CursorClose,
    /// First close attempt failed, retrying once
    CursorCloseRetry,

    // Statements
    StatementForm,
    StatementExecute,
    ColumnsFetch,
    RowsFetch,
    RowsPair,
    /// Column count and row width differ; the shorter side wins
    RowsPairMismatch,

    // Transaction
    Commit,
    Rollback,
    /// First rollback attempt failed, retrying once
    RollbackRetry,
}

impl Event {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::RequestReceived => "REQUEST_RECEIVED",
            Event::RequestRejected => "REQUEST_REJECTED",
            Event::RequestComplete => "REQUEST_COMPLETE",
            Event::RequestFailed => "REQUEST_FAILED",
            Event::ConnectionStringForm => "CONNECTION_STRING_FORM",
            Event::Connect => "CONNECT",
            Event::CursorCreate => "CURSOR_CREATE",
            Event::CursorClose => "CURSOR_CLOSE",
            Event::CursorCloseRetry => "CURSOR_CLOSE_RETRY",
            Event::StatementForm => "STATEMENT_FORM",
            Event::StatementExecute => "STATEMENT_EXECUTE",
            Event::ColumnsFetch => "COLUMNS_FETCH",
            Event::RowsFetch => "ROWS_FETCH",
            Event::RowsPair => "ROWS_PAIR",
            Event::RowsPairMismatch => "ROWS_PAIR_MISMATCH",
            Event::Commit => "COMMIT",
            Event::Rollback => "ROLLBACK",
            Event::RollbackRetry => "ROLLBACK_RETRY",
        }
    }
}

impl AsRef<str> for Event {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_display() {
        assert_eq!(Event::Connect.to_string(), "CONNECT");
        assert_eq!(Event::CursorCloseRetry.as_str(), "CURSOR_CLOSE_RETRY");
    }
}
