//! Statement formation errors

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for template loading and rendering
pub type TemplateResult<T> = Result<T, TemplateError>;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file could not be read
    #[error("Failed to read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A lone `{` or `}` that is neither a slot nor an escape
    #[error("Malformed template '{template}' at byte {position}: {reason}")]
    Malformed {
        template: String,
        position: usize,
        reason: &'static str,
    },

    /// Wrong number of substitution arguments
    #[error("Template '{template}' has {expected} slot(s) but {given} value(s) were supplied")]
    SlotMismatch {
        template: String,
        expected: usize,
        given: usize,
    },
}
