//! Library error type.

use thiserror::Error;

/// Failures surfaced by statement processing. Extraction itself degrades
/// field-by-field instead of erroring; these cover the hard stops.
#[derive(Debug, Error)]
pub enum Error {
    /// No known bank signature was found in the document text.
    #[error("unrecognized statement format")]
    UnrecognizedFormat,

    /// A value or document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
