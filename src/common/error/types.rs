//! Unified error type for the crate.
//!
//! Each layer keeps its own error enum; this one wraps them so callers that
//! only want "did the document open" can use a single `?`.
use thiserror::Error;

use crate::ole::OleError;
use crate::ole::doc::DocError;

/// Main error type for wordbin operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Compound file container error
    #[error("Compound file error: {0}")]
    Ole(#[from] OleError),

    /// Word binary structure error
    #[error("Document error: {0}")]
    Doc(#[from] DocError),
}

/// Result type for wordbin operations.
pub type Result<T> = std::result::Result<T, Error>;
