//! Statement Path Tests
//!
//! End-to-end runs through `SqlService` against the scripted driver:
//! - Generated SQL for each statement kind
//! - Exactly one rollback after an execute or commit failure
//! - Exactly one close per request, on every path
//! - Rollback failures are swallowed, close failures are not

use serde_json::json;
use sqlcrud::driver::testing::{Call, ScriptedDriver};
use sqlcrud::driver::Credentials;
use sqlcrud::request::RequestArgs;
use sqlcrud::service::{ServiceErrorCode, SqlService, StatementResponse};

// =============================================================================
// Helper Functions
// =============================================================================

fn credentials() -> Credentials {
    Credentials::new("ODBC Driver 18 for SQL Server", "localhost", "testdb", "user", "123")
}

fn executed(driver: &ScriptedDriver) -> Vec<String> {
    driver
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::Execute(sql) => Some(sql),
            _ => None,
        })
        .collect()
}

fn delete_args() -> RequestArgs {
    RequestArgs::new().table("tbl").where_clause("id = '1'")
}

fn insert_args() -> RequestArgs {
    RequestArgs::new()
        .table("tbl")
        .columns("attr1,attr2")
        .values("value1,value2")
}

fn update_args() -> RequestArgs {
    RequestArgs::new()
        .table("tbl")
        .params("params[attr1]=value1&params[attr2]=value2")
        .where_clause("id = '1'")
}

fn select_args() -> RequestArgs {
    RequestArgs::new().table("tbl").columns("attr1,attr2")
}

// =============================================================================
// Generated SQL
// =============================================================================

#[test]
fn test_generated_sql_per_kind() {
    let cases = [
        ("delete", delete_args(), "DELETE FROM tbl WHERE id = '1'"),
        (
            "insert",
            insert_args(),
            "INSERT INTO tbl (attr1,attr2) VALUES ('value1','value2')",
        ),
        (
            "update",
            update_args(),
            "UPDATE tbl SET attr1 = 'value1', attr2 = 'value2' WHERE id = '1'",
        ),
        ("select", select_args(), "SELECT attr1,attr2 FROM tbl"),
    ];

    for (kind, args, expected) in cases {
        let driver = ScriptedDriver::new().returning_rows(["attr1", "attr2"], vec![]);
        let service = SqlService::new(&driver, credentials());

        service.handle(kind, args).unwrap();
        assert_eq!(executed(&driver), vec![expected], "kind {}", kind);
    }
}

#[test]
fn test_statement_type_is_case_insensitive() {
    let driver = ScriptedDriver::new();
    let service = SqlService::new(&driver, credentials());

    service.handle("DeLeTe", delete_args()).unwrap();
    assert_eq!(executed(&driver), vec!["DELETE FROM tbl WHERE id = '1'"]);
}

// =============================================================================
// SELECT
// =============================================================================

#[test]
fn test_select_returns_records() {
    let driver = ScriptedDriver::new()
        .returning_rows(["attr1", "attr2"], vec![vec![json!("value1"), json!("value2")]]);
    let service = SqlService::new(&driver, credentials());

    let response = service.handle("select", select_args()).unwrap();

    assert_eq!(
        serde_json::to_value(&response.data).unwrap(),
        json!([{"attr1": "value1", "attr2": "value2"}])
    );
    assert_eq!(driver.count(&Call::Commit), 0);
    assert_eq!(driver.count(&Call::Close), 1);
}

#[test]
fn test_select_with_no_columns_is_fetch_failure() {
    let driver = ScriptedDriver::new();
    let service = SqlService::new(&driver, credentials());

    let err = service.handle("select", select_args()).unwrap_err();

    assert_eq!(err.code(), ServiceErrorCode::SqlFetchFailed);
    assert_eq!(driver.count(&Call::Rollback), 0);
    assert_eq!(driver.count(&Call::Close), 1);
}

#[test]
fn test_select_execute_failure_rolls_back() {
    let driver = ScriptedDriver::new().fail_execute("invalid object name 'tbl'");
    let service = SqlService::new(&driver, credentials());

    let err = service.handle("select", select_args()).unwrap_err();

    assert_eq!(err.code(), ServiceErrorCode::SqlExecutionFailed);
    assert_eq!(driver.count(&Call::Rollback), 1);
    assert_eq!(driver.count(&Call::Close), 1);
}

// =============================================================================
// Mutating paths
// =============================================================================

#[test]
fn test_mutating_success_commits_and_closes() {
    for (kind, args) in [
        ("delete", delete_args()),
        ("insert", insert_args()),
        ("update", update_args()),
    ] {
        let driver = ScriptedDriver::new().with_row_count(4);
        let service = SqlService::new(&driver, credentials());

        let response = service.handle(kind, args).unwrap();

        assert_eq!(
            response.data,
            StatementResponse::Affected {
                message: "4 row(s) affected".to_string(),
                row_count: Some(4),
            }
        );
        assert_eq!(driver.count(&Call::Commit), 1);
        assert_eq!(driver.count(&Call::Rollback), 0);
        assert_eq!(driver.count(&Call::Close), 1);
        assert_eq!(driver.calls().last(), Some(&Call::Close));
    }
}

#[test]
fn test_execute_failure_rolls_back_exactly_once() {
    for (kind, args) in [
        ("delete", delete_args()),
        ("insert", insert_args()),
        ("update", update_args()),
    ] {
        let driver = ScriptedDriver::new().fail_execute("constraint violation");
        let service = SqlService::new(&driver, credentials());

        let err = service.handle(kind, args).unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlExecutionFailed);
        assert!(err.message().contains("constraint violation"));
        assert_eq!(driver.count(&Call::Rollback), 1);
        assert_eq!(driver.count(&Call::Commit), 0);
        assert_eq!(driver.count(&Call::Close), 1);
    }
}

#[test]
fn test_commit_failure_rolls_back_exactly_once() {
    let driver = ScriptedDriver::new().fail_commit("transaction aborted");
    let service = SqlService::new(&driver, credentials());

    let err = service.handle("update", update_args()).unwrap_err();

    assert_eq!(err.code(), ServiceErrorCode::SqlCommitFailed);
    assert_eq!(driver.count(&Call::Rollback), 1);
    assert_eq!(driver.count(&Call::Close), 1);
}

#[test]
fn test_rollback_failure_does_not_replace_execute_error() {
    let driver = ScriptedDriver::new()
        .fail_execute("constraint violation")
        .fail_rollbacks(2);
    let service = SqlService::new(&driver, credentials());

    let err = service.handle("insert", insert_args()).unwrap_err();

    assert_eq!(err.code(), ServiceErrorCode::SqlExecutionFailed);
    // The single rollback is retried once internally
    assert_eq!(driver.count(&Call::Rollback), 2);
    assert_eq!(driver.count(&Call::Close), 1);
}

// =============================================================================
// Close guarantees
// =============================================================================

#[test]
fn test_close_retry_recovers() {
    let driver = ScriptedDriver::new().fail_closes(1);
    let service = SqlService::new(&driver, credentials());

    service.handle("delete", delete_args()).unwrap();
    assert_eq!(driver.count(&Call::Close), 2);
}

#[test]
fn test_close_failing_twice_is_fatal() {
    let driver = ScriptedDriver::new().fail_closes(2);
    let service = SqlService::new(&driver, credentials());

    let err = service.handle("delete", delete_args()).unwrap_err();

    assert_eq!(err.code(), ServiceErrorCode::SqlCloseFailed);
    assert!(err.is_fatal());
    assert_eq!(driver.count(&Call::Close), 2);
}

#[test]
fn test_close_failure_after_statement_failure_is_raised() {
    for driver in [
        ScriptedDriver::new().fail_execute("constraint violation").fail_closes(2),
        ScriptedDriver::new().fail_commit("transaction aborted").fail_closes(2),
    ] {
        let service = SqlService::new(&driver, credentials());

        let err = service.handle("update", update_args()).unwrap_err();

        assert_eq!(err.code(), ServiceErrorCode::SqlCloseFailed);
        assert!(err.is_fatal());
        let masked = err.masked().expect("statement error kept");
        assert!(matches!(
            masked.code(),
            ServiceErrorCode::SqlExecutionFailed | ServiceErrorCode::SqlCommitFailed
        ));
        assert_eq!(driver.count(&Call::Rollback), 1);
        assert_eq!(driver.count(&Call::Close), 2);
    }
}

#[test]
fn test_connection_failure_runs_nothing() {
    let driver = ScriptedDriver::new().fail_connect("server not found");
    let service = SqlService::new(&driver, credentials());

    let err = service.handle("delete", delete_args()).unwrap_err();

    assert_eq!(err.code(), ServiceErrorCode::SqlConnectionFailed);
    assert!(err.is_fatal());
    assert!(executed(&driver).is_empty());
    assert_eq!(driver.count(&Call::Close), 0);
}

#[test]
fn test_each_request_gets_its_own_connection() {
    let driver = ScriptedDriver::new();
    let service = SqlService::new(&driver, credentials());

    service.handle("delete", delete_args()).unwrap();
    service.handle("delete", delete_args()).unwrap();

    assert_eq!(driver.count(&Call::Connect(String::new())), 2);
    assert_eq!(driver.count(&Call::Close), 2);
}

#[test]
fn test_transaction_ids_differ_per_request() {
    let driver = ScriptedDriver::new();
    let service = SqlService::new(&driver, credentials());

    let first = service.handle("delete", delete_args()).unwrap();
    let second = service.handle("delete", delete_args()).unwrap();
    assert_ne!(first.transaction_id, second.transaction_id);
}
