//! Statement formation
//!
//! One literal template per statement kind, filled positionally:
//!
//! | Kind   | Template                          | Slots                      |
//! |--------|-----------------------------------|----------------------------|
//! | SELECT | `SELECT {} FROM {} {}`            | columns, table, where      |
//! | INSERT | `INSERT INTO {} ({}) VALUES ({})` | table, columns, values     |
//! | UPDATE | `UPDATE {} SET {} {}`             | table, set clause, where   |
//! | DELETE | `DELETE FROM {} WHERE {}`         | table, where clause        |

mod errors;
mod formatter;
mod template;

pub use errors::{TemplateError, TemplateResult};
pub use formatter::{join_columns, listify_values, set_clause, where_fragment, StatementFormatter};
pub use template::{Template, TemplateSource};
