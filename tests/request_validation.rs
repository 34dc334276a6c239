//! Request Validation Tests
//!
//! - Every kind accepts its full required field set
//! - Removing any single required field is rejected and named
//! - Unknown statement kinds are rejected with the valid options
//! - Nothing connects for a rejected request

use sqlcrud::driver::testing::ScriptedDriver;
use sqlcrud::driver::Credentials;
use sqlcrud::request::{
    RequestArgs, RequestError, RequestField, RequestParams, RequestValidator, StatementKind,
    ValidationOutcome,
};
use sqlcrud::service::{ServiceErrorCode, SqlService};

// =============================================================================
// Helper Functions
// =============================================================================

fn full_args() -> RequestArgs {
    RequestArgs::new()
        .table("tbl")
        .columns("attr1,attr2")
        .values("value1,value2")
        .params("params[attr1]=value1")
        .where_clause("id = '1'")
}

fn without(field: RequestField) -> RequestArgs {
    let mut args = full_args();
    match field {
        RequestField::Table => args.table = None,
        RequestField::Columns => args.columns = None,
        RequestField::Values => args.values = None,
        RequestField::Params => args.params = None,
        RequestField::Where => args.where_clause = None,
    }
    args
}

fn params(args: RequestArgs) -> RequestParams {
    RequestParams::decode(args).unwrap()
}

// =============================================================================
// Required fields
// =============================================================================

#[test]
fn test_full_args_are_valid_for_every_kind() {
    for kind in StatementKind::ALL {
        let outcome = RequestValidator::validate_kind(kind, &params(full_args()));
        assert_eq!(outcome, ValidationOutcome::Valid, "kind {}", kind);
    }
}

#[test]
fn test_each_missing_required_field_is_named() {
    for kind in StatementKind::ALL {
        for field in kind.required_fields() {
            let outcome = RequestValidator::validate_kind(kind, &params(without(*field)));
            let reason = outcome.reason().unwrap_or_else(|| {
                panic!("{} without {} should be invalid", kind, field)
            });
            assert!(reason.contains(field.as_str()), "{}: {}", kind, reason);
            assert!(reason.contains(kind.as_str()), "{}: {}", kind, reason);
        }
    }
}

#[test]
fn test_fields_outside_the_kind_are_ignored() {
    let args = RequestArgs::new().table("tbl").where_clause("id = '1'");
    assert!(RequestValidator::validate("delete", &params(args)).is_valid());
}

#[test]
fn test_empty_string_counts_as_missing() {
    let decoded = params(RequestArgs::new().table("tbl").where_clause(""));

    assert!(!RequestValidator::validate("delete", &decoded).is_valid());
    assert_eq!(
        RequestValidator::missing_fields(StatementKind::Delete, &decoded),
        vec![RequestField::Where]
    );
}

#[test]
fn test_malformed_params_only_matter_for_update() {
    let driver = ScriptedDriver::new();
    let service = SqlService::new(&driver, Credentials::new("D", "S", "DB", "U", "P"));

    let delete = RequestArgs::new().table("tbl").where_clause("id = '1'").params("garbage");
    service.handle("delete", delete).unwrap();

    let update = RequestArgs::new().table("tbl").where_clause("id = '1'").params("garbage");
    let err = service.handle("update", update).unwrap_err();
    assert_eq!(err.code(), ServiceErrorCode::SqlInvalidRequest);
}

// =============================================================================
// Statement kind
// =============================================================================

#[test]
fn test_unknown_kind_names_value_and_options() {
    let outcome = RequestValidator::validate("MERGE", &params(full_args()));
    let reason = outcome.reason().unwrap();

    assert!(reason.contains("'merge'"));
    for option in ["select", "insert", "update", "delete"] {
        assert!(reason.contains(option), "missing option {}", option);
    }
}

#[test]
fn test_kind_parsing_is_case_insensitive() {
    assert_eq!("Select".parse::<StatementKind>().unwrap(), StatementKind::Select);
    assert_eq!("UPDATE".parse::<StatementKind>().unwrap(), StatementKind::Update);
    assert!(matches!(
        "upsert".parse::<StatementKind>(),
        Err(RequestError::InvalidKind(ref k)) if k == "upsert"
    ));
}

// =============================================================================
// Rejection happens before connecting
// =============================================================================

#[test]
fn test_rejected_requests_never_connect() {
    let driver = ScriptedDriver::new();
    let service = SqlService::new(&driver, Credentials::new("D", "S", "DB", "U", "P"));

    let rejected = [
        ("merge", full_args()),
        ("delete", without(RequestField::Where)),
        ("insert", without(RequestField::Values)),
        ("select", without(RequestField::Columns)),
        ("update", without(RequestField::Params)),
        ("update", RequestArgs::new().table("tbl").params("params[attr1]")),
    ];

    for (kind, args) in rejected {
        let err = service.handle(kind, args).unwrap_err();
        assert_eq!(err.code(), ServiceErrorCode::SqlInvalidRequest, "{}", kind);
    }
    assert!(driver.calls().is_empty());
}
