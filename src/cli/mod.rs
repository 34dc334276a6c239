//! CLI module for sqlcrud
//!
//! Provides command-line interface for:
//! - execute: run one statement against the configured database
//! - render: print the SQL a statement would run
//! - batch: run one JSON request per stdin line

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, StatementArgs};
pub use commands::{batch, batch_with, execute, execute_with, render, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{parse_request, read_requests, BatchRequest};

/// Parse the process arguments and run the command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
