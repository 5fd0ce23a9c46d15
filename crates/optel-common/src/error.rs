//! Error types for the telemetry normalization engine.
//!
//! Errors carry a category for grouping and a recoverability hint so
//! callers can tell a dead document from a degraded cycle. Non-fatal
//! conditions (a missing mapped field, a failed metadata join, a counter
//! reset) are not errors at all: they are logged signals and null fields,
//! because downstream consumers must be able to tell "zero" from
//! "unknown".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Document cannot be interpreted as a tree at all.
    Parse,
    /// Field-mapping extraction errors.
    Extract,
    /// Metadata merge errors.
    Merge,
    /// Counter state persistence errors.
    State,
    /// Output serialization errors.
    Output,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Parse => "parse",
            ErrorCategory::Extract => "extract",
            ErrorCategory::Merge => "merge",
            ErrorCategory::State => "state",
            ErrorCategory::Output => "output",
            ErrorCategory::Io => "io",
        };
        write!(f, "{s}")
    }
}

/// Unified error type for the normalization engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Input document is not a parseable tree. Fatal for that one
    /// document only; other documents in the same run are unaffected.
    #[error("document parse error: {0}")]
    Parse(String),

    /// A mapping table is structurally invalid (duplicate targets,
    /// empty source paths). Raised at load time, never mid-extraction.
    #[error("invalid field mapping: {0}")]
    InvalidMapping(String),

    /// Counter state could not be read or written. The current cycle's
    /// computed deltas are still valid; the affected key degrades to a
    /// cold start on the next cycle.
    #[error("counter state persistence error: {0}")]
    Persistence(String),

    /// Output sink error (Parquet write, exposition sink).
    #[error("output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    /// Category for grouping and log routing.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Parse(_) => ErrorCategory::Parse,
            Error::InvalidMapping(_) => ErrorCategory::Extract,
            Error::Persistence(_) => ErrorCategory::State,
            Error::Output(_) => ErrorCategory::Output,
            Error::Io(_) | Error::Serde(_) => ErrorCategory::Io,
        }
    }

    /// Whether the enclosing cycle can continue after this error.
    ///
    /// A parse error kills one document; a persistence error degrades
    /// one counter key. Neither cascades across devices.
    pub fn recoverable(&self) -> bool {
        !matches!(self, Error::InvalidMapping(_))
    }
}
