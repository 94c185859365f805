//! # Store Crate
//!
//! Record storage for the similarity pipeline.
//!
//! ## Main Components
//!
//! - **types**: Core record types (RawMovieRecord, CatalogMovie, SimilarityPair)
//! - **traits**: The `MovieStore` contract the pipeline is written against
//! - **memory**: In-memory implementation for tests and embedding
//! - **jsonl**: File-backed implementation (one JSON record per line)
//! - **error**: Error types for store access
//!
//! ## Example Usage
//!
//! ```ignore
//! use store::{JsonlStore, MovieStore};
//!
//! let mut store = JsonlStore::open("data")?;
//! let candidates = store.read_candidates(10, Some(500))?;
//! println!("{} candidate movies", candidates.len());
//! ```

// Public modules
pub mod error;
pub mod jsonl;
pub mod memory;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{Result, StoreError};
pub use jsonl::JsonlStore;
pub use memory::InMemoryStore;
pub use traits::MovieStore;
pub use types::{CatalogMovie, MovieId, RawMovieRecord, SimilarityPair};
