//! CLI command implementations
//!
//! `execute` and `batch` need a real backend and are only available with
//! the `odbc` feature. `render` never connects.

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::config::Config;
use crate::driver::Driver;
use crate::observability::Logger;
use crate::service::{render_statement, SqlService};
use crate::statement::{StatementFormatter, TemplateSource};

use super::args::{Command, StatementArgs};
use super::errors::{CliError, CliResult};
use super::io::{
    error_envelope, read_requests, response_envelope, service_error_envelope, write_line, write_sql,
};

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Execute { config, statement } => execute(&config, statement),
        Command::Render {
            templates,
            statement,
        } => render(templates.as_deref(), statement),
        Command::Batch { config } => batch(&config),
    }
}

#[cfg(feature = "odbc")]
fn driver() -> CliResult<Box<dyn Driver>> {
    Ok(Box::new(crate::driver::odbc::OdbcDriver::new()))
}

#[cfg(not(feature = "odbc"))]
fn driver() -> CliResult<Box<dyn Driver>> {
    Err(CliError::unsupported(
        "This build has no database backend. Rebuild with --features odbc.",
    ))
}

/// Run one statement and print its envelope
pub fn execute(config_path: &Path, statement: StatementArgs) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let driver = driver()?;
    execute_with(&config, driver.as_ref(), statement, &mut io::stdout())
}

/// `execute` against any driver, writing to `out`
pub fn execute_with(
    config: &Config,
    driver: &dyn Driver,
    statement: StatementArgs,
    out: &mut impl Write,
) -> CliResult<()> {
    let service = service(config, driver)?;
    let (statement_type, args) = statement.into_request();

    match service.handle(&statement_type, args) {
        Ok(response) => write_line(out, &response_envelope(&response)?),
        Err(err) => {
            write_line(out, &service_error_envelope(&err))?;
            Err(CliError::statement_failed(err.to_string()))
        }
    }
}

/// Print the SQL a statement would run
pub fn render(templates: Option<&Path>, statement: StatementArgs) -> CliResult<()> {
    let source = match templates {
        Some(dir) => TemplateSource::directory(dir),
        None => TemplateSource::Builtin,
    };
    let (statement_type, args) = statement.into_request();

    let formatter = StatementFormatter::new(source);

    match render_statement(&formatter, &Logger::null(), &statement_type, args) {
        Ok(sql) => write_sql(&sql),
        Err(err) => {
            write_line(&mut io::stdout(), &service_error_envelope(&err))?;
            Err(CliError::statement_failed(err.to_string()))
        }
    }
}

/// Run every stdin line as its own request
pub fn batch(config_path: &Path) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let driver = driver()?;
    let stdin = io::stdin();
    batch_with(&config, driver.as_ref(), stdin.lock(), &mut io::stdout())
}

/// `batch` against any driver and streams; returns after the last line
///
/// A failing request does not stop the batch. Unparseable lines are
/// answered with an `SQL_CLI_IO_ERROR` envelope.
pub fn batch_with(
    config: &Config,
    driver: &dyn Driver,
    input: impl BufRead,
    out: &mut impl Write,
) -> CliResult<()> {
    let service = service(config, driver)?;

    for request in read_requests(input) {
        let envelope = match request {
            Ok(request) => match service.handle(&request.statement_type, request.args) {
                Ok(response) => response_envelope(&response)?,
                Err(err) => service_error_envelope(&err),
            },
            Err(err) => error_envelope(err.code_str(), err.message()),
        };
        write_line(out, &envelope)?;
    }

    Ok(())
}

fn service<'d>(config: &Config, driver: &'d dyn Driver) -> CliResult<SqlService<'d>> {
    Ok(SqlService::new(driver, config.credentials.clone())
        .with_formatter(config.formatter())
        .with_logger(config.logger()?))
}
