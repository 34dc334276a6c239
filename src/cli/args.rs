//! CLI argument definitions using clap
//!
//! Commands:
//! - sqlcrud execute --config <path> --statement <kind> [--table ..] [--columns ..]
//!   [--values ..] [--params ..] [--where ..]
//! - sqlcrud render --statement <kind> [...] [--templates <dir>]
//! - sqlcrud batch --config <path>

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::request::RequestArgs;

/// sqlcrud - CRUD statements over ODBC
#[derive(Parser, Debug)]
#[command(name = "sqlcrud")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one statement against the configured database
    Execute {
        /// Path to configuration file
        #[arg(long, default_value = "./sqlcrud.json")]
        config: PathBuf,

        #[command(flatten)]
        statement: StatementArgs,
    },

    /// Print the SQL a statement would run, without connecting
    Render {
        /// Template directory (built-in templates when omitted)
        #[arg(long)]
        templates: Option<PathBuf>,

        #[command(flatten)]
        statement: StatementArgs,
    },

    /// Run one JSON request per stdin line
    Batch {
        /// Path to configuration file
        #[arg(long, default_value = "./sqlcrud.json")]
        config: PathBuf,
    },
}

/// One statement as given on the command line
#[derive(Args, Debug, Clone)]
pub struct StatementArgs {
    /// select, insert, update or delete
    #[arg(long)]
    pub statement: String,

    #[arg(long)]
    pub table: Option<String>,

    /// Comma-separated column list
    #[arg(long)]
    pub columns: Option<String>,

    /// Comma-separated value list (INSERT)
    #[arg(long)]
    pub values: Option<String>,

    /// `params[col]=value&...` (UPDATE)
    #[arg(long)]
    pub params: Option<String>,

    /// Raw WHERE fragment, used verbatim
    #[arg(long = "where")]
    pub where_clause: Option<String>,
}

impl StatementArgs {
    /// Split into the statement type and the raw argument bundle
    pub fn into_request(self) -> (String, RequestArgs) {
        let args = RequestArgs {
            table: self.table,
            columns: self.columns,
            values: self.values,
            params: self.params,
            where_clause: self.where_clause,
        };
        (self.statement, args)
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
