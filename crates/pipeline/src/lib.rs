//! # Pipeline Crate
//!
//! The content-based movie similarity pipeline.
//!
//! ## Main Components
//!
//! - **parser**: Normalize loose source metadata into scoreable movies
//! - **scorer**: Weighted genre/director/actor/tag overlap between two movies
//! - **selector**: Candidate query (ratings cutoff, hottest-first, limit)
//! - **engine**: Parallel all-pairs scoring with threshold filtering
//! - **writer**: Confirmation-gated clearing and capped, batched persistence
//! - **runner**: Sequential coordination of a full run
//! - **error**: Error types for the pipeline
//!
//! ## Example Usage
//!
//! ```ignore
//! use pipeline::{run_similarity_update, AutoConfirm, CancelToken, RunConfig};
//! use store::JsonlStore;
//!
//! let mut store = JsonlStore::open("data")?;
//! let config = RunConfig { limit: Some(500), ..RunConfig::default() };
//! let report = run_similarity_update(
//!     &mut store,
//!     &config,
//!     &mut AutoConfirm,
//!     &CancelToken::new(),
//! )?;
//! println!("{} pairs written", report.pairs_written);
//! ```
//!
//! ## Operational Note
//!
//! The pairwise stage is quadratic in the candidate count. Size runs with
//! `RunConfig::limit`; 2 000 candidates already mean ~2 million scored pairs.

// Public modules
pub mod engine;
pub mod error;
pub mod parser;
pub mod runner;
pub mod scorer;
pub mod selector;
pub mod writer;

// Re-export commonly used types for convenience
pub use engine::{ComputeReport, PairwiseEngine};
pub use error::{PipelineError, Result};
pub use parser::{NormalizedMovie, normalize_records, parse_movie};
pub use runner::{CancelToken, RunConfig, RunReport, run_catalog_import, run_similarity_update};
pub use scorer::PairScorer;
pub use selector::select_candidates;
pub use writer::{AutoConfirm, Confirm, SimilarityWriter, WriteReport};
