//! Error types for the similarity pipeline.

use store::StoreError;
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Per-field parse failures and per-pair scoring failures never surface
/// here; those are recovered locally (the field degrades, the pair is
/// dropped). What remains is the store becoming unavailable, which the core
/// does not retry.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Store read or write failed outside the batched write loop.
    #[error("record store unavailable: {0}")]
    Store(#[from] StoreError),

    /// A batch write failed part-way through persisting.
    ///
    /// Carries how much was already durably written so an operator can judge
    /// how much of the record cap was consumed. Batches written before the
    /// failure stay written; no rollback is attempted.
    #[error(
        "similarity write failed after {written} records ({batches} full batches): {source}"
    )]
    WriteFailed {
        written: u64,
        batches: u32,
        source: StoreError,
    },
}

/// Convenience alias for pipeline results.
pub type Result<T> = std::result::Result<T, PipelineError>;
