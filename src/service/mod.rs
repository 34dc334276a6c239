//! Request service
//!
//! Per request:
//!
//! ```text
//! validate -> connect -> execute -> {commit | fetch} -> close -> done
//!                           \-> rollback -> close -> failed
//! ```
//!
//! - An invalid request is rejected before any connection is attempted
//! - Each request gets its own connection and cursor, never reused
//! - Once a cursor exists it is closed exactly once, on every path
//! - Every log line of a request carries its `transaction_id`

mod adapter;
mod errors;
mod executor;
mod response;

pub use adapter::DriverAdapter;
pub use errors::{Cause, ServiceError, ServiceErrorCode, ServiceResult, Severity};
pub use executor::StatementExecutor;
pub use response::{ServiceResponse, StatementResponse};

use uuid::Uuid;

use crate::driver::{Credentials, Driver};
use crate::observability::{Event, Logger, Severity as LogSeverity};
use crate::request::{Request, RequestArgs};
use crate::statement::StatementFormatter;

/// Validate a request and form its SQL; no driver involved
pub fn render_statement(
    formatter: &StatementFormatter,
    logger: &Logger,
    statement_type: &str,
    args: RequestArgs,
) -> ServiceResult<String> {
    let request = Request::new(statement_type, args)?;
    StatementExecutor::new(formatter, logger).form(request.operation())
}

/// Validates, executes and closes, one request at a time
pub struct SqlService<'d> {
    driver: &'d dyn Driver,
    credentials: Credentials,
    formatter: StatementFormatter,
    logger: Logger,
}

impl<'d> SqlService<'d> {
    /// Built-in templates, no logging
    pub fn new(driver: &'d dyn Driver, credentials: Credentials) -> Self {
        Self {
            driver,
            credentials,
            formatter: StatementFormatter::default(),
            logger: Logger::null(),
        }
    }

    pub fn with_formatter(mut self, formatter: StatementFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Validate and form the SQL without connecting
    pub fn render(&self, statement_type: &str, args: RequestArgs) -> ServiceResult<String> {
        render_statement(&self.formatter, &self.logger, statement_type, args)
    }

    fn run(
        &self,
        logger: &Logger,
        transaction_id: Uuid,
        request: &Request,
    ) -> ServiceResult<ServiceResponse> {
        let kind = request.kind();
        let result = self.execute(logger, request);

        match &result {
            Ok(_) => logger.info(
                Event::RequestComplete,
                &[("statement_type", kind.as_str()), ("table", request.operation().table())],
            ),
            Err(err) => {
                let severity = if err.is_fatal() {
                    LogSeverity::Fatal
                } else {
                    LogSeverity::Error
                };
                let mut fields = vec![
                    ("statement_type", kind.as_str()),
                    ("code", err.code().code()),
                    ("reason", err.message()),
                ];
                if let Some(masked) = err.masked() {
                    fields.push(("masked", masked.code().code()));
                }
                logger.log(severity, Event::RequestFailed, &fields);
            }
        }

        result.map(|data| ServiceResponse {
            transaction_id,
            kind,
            data,
        })
    }

    fn execute(&self, logger: &Logger, request: &Request) -> ServiceResult<StatementResponse> {
        let mut adapter = DriverAdapter::connect(self.driver, &self.credentials, logger)?;

        let outcome =
            StatementExecutor::new(&self.formatter, logger).run(&mut adapter, request.operation());
        let closed = adapter.close();

        match (outcome, closed) {
            (Ok(data), Ok(_)) => Ok(data),
            (Ok(_), Err(close_err)) => Err(close_err),
            (Err(err), Ok(_)) => Err(err),
            // A leaked cursor outranks the statement failure
            (Err(err), Err(close_err)) => Err(close_err.masking(err)),
        }
    }
}
