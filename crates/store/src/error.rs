//! Error types for store access.

use crate::types::MovieId;
use thiserror::Error;

/// Errors raised by store implementations.
///
/// Any of these is a "store unavailable" condition for the pipeline: the core
/// never retries or recovers a store failure, it propagates to the entry
/// point which reports and aborts the run.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A store file could not be opened.
    #[error("failed to open store file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    /// I/O error while reading or writing store data.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted record could not be decoded.
    ///
    /// Carries the file and line so the operator can find the bad row.
    #[error("corrupt record at line {line} in {file}: {source}")]
    Corrupt {
        file: String,
        line: usize,
        source: serde_json::Error,
    },

    /// A record could not be encoded for persistence.
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),

    /// Insert of an already-stored unordered pair with duplicate checking on.
    #[error("duplicate similarity pair ({movie1_id}, {movie2_id})")]
    DuplicatePair {
        movie1_id: MovieId,
        movie2_id: MovieId,
    },
}

/// Convenience alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
