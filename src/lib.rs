//! sqlcrud - CRUD statements over ODBC connections
//!
//! A request names a statement kind (SELECT, INSERT, UPDATE or DELETE)
//! and carries plain-string arguments. The crate validates it, forms
//! literal SQL from a per-kind template, runs it on a fresh connection
//! and closes the cursor on every path.
//!
//! ```ignore
//! use sqlcrud::driver::Credentials;
//! use sqlcrud::request::RequestArgs;
//! use sqlcrud::service::SqlService;
//!
//! let service = SqlService::new(&driver, Credentials::new("D", "S", "DB", "U", "P"));
//! let response = service.handle("select", RequestArgs::new().table("t").columns("a,b"))?;
//! ```
//!
//! Generated SQL is not parameterized. See [`statement`].

pub mod cli;
pub mod config;
pub mod driver;
pub mod observability;
pub mod request;
pub mod service;
pub mod statement;
