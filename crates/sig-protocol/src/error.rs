//! Error types for decoder line parsing

use thiserror::Error;

/// Errors that can occur while parsing a decoded text line
///
/// None of these are fatal: the decoder loop logs them and moves on to
/// the next line.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Line was expected to carry a JSON document
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A field required by the grammar is missing
    #[error("missing field: {0}")]
    MissingField(&'static str),

    /// Epoch seconds that cannot be represented as a clock time
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}
