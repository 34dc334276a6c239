//! JSON I/O handling for CLI
//!
//! - Input (batch): one JSON request object per stdin line
//! - Output: one JSON envelope per line on stdout
//! - UTF-8 only

use std::io::{self, BufRead, Write};

use serde::Deserialize;
use serde_json::{json, Value};

use crate::request::RequestArgs;
use crate::service::{ServiceError, ServiceResponse};

use super::errors::{CliError, CliResult};

/// One batch line: `{"statement_type": "select", "table": "t", ...}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchRequest {
    pub statement_type: String,
    #[serde(flatten)]
    pub args: RequestArgs,
}

/// Parse one batch line
pub fn parse_request(line: &str) -> CliResult<BatchRequest> {
    if line.trim().is_empty() {
        return Err(CliError::io_error("Empty line"));
    }
    Ok(serde_json::from_str(line)?)
}

/// Read batch requests until end of input; blank lines are skipped
pub fn read_requests(input: impl BufRead) -> impl Iterator<Item = CliResult<BatchRequest>> {
    input
        .lines()
        .filter(|line| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|line| parse_request(&line?))
}

pub fn response_envelope(response: &ServiceResponse) -> CliResult<Value> {
    Ok(json!({
        "status": "ok",
        "transaction_id": response.transaction_id,
        "statement_type": response.kind,
        "data": serde_json::to_value(&response.data)?,
    }))
}

pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message,
    })
}

pub fn service_error_envelope(err: &ServiceError) -> Value {
    let mut envelope = error_envelope(err.code().code(), err.message());
    envelope["severity"] = json!(err.severity().to_string());
    if let Some(masked) = err.masked() {
        envelope["masked"] = json!({
            "code": masked.code().code(),
            "message": masked.message(),
        });
    }
    envelope
}

/// Write one envelope as a line
pub fn write_line(out: &mut impl Write, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Write a raw SQL string to stdout
pub fn write_sql(sql: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", sql)?;
    stdout.flush()?;
    Ok(())
}
