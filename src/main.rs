//! sqlcrud CLI entry point
//!
//! Parses arguments, dispatches to the CLI module, prints command errors
//! to stderr and exits non-zero on failure. Statement results and
//! statement errors go to stdout as JSON.

use sqlcrud::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
