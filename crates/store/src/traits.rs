//! The record-store contract consumed by the similarity pipeline.

use std::cmp::Reverse;

use crate::error::Result;
use crate::types::{CatalogMovie, MovieId, RawMovieRecord, SimilarityPair};

/// Minimal read/write contract over the three record sets.
///
/// The pipeline is written against this trait only, so the backing technology
/// (JSONL files here, a relational database elsewhere) is swappable without
/// touching the core.
///
/// ## Design Note
/// - Reads take `&self`, writes take `&mut self`: the pipeline is the sole
///   writer during a run and concurrent runs against one store are not
///   supported.
/// - `read_candidates` owns ordering AND limiting: results are sorted by
///   descending `ratings_count` *before* the limit is applied, so a capped
///   run keeps the most-rated (statistically reliable) movies rather than an
///   arbitrary sample.
pub trait MovieStore {
    /// Source movies with `ratings_count >= min_ratings`, ordered by
    /// descending `ratings_count` (ties by ascending id), truncated to
    /// `limit` after ordering.
    fn read_candidates(
        &self,
        min_ratings: u32,
        limit: Option<usize>,
    ) -> Result<Vec<RawMovieRecord>>;

    /// Number of stored similarity pairs.
    fn count_similarity_pairs(&self) -> Result<u64>;

    /// Remove every stored similarity pair.
    fn delete_all_similarity_pairs(&mut self) -> Result<()>;

    /// Fetch the catalog entity for `movie_id`, creating it from `defaults`
    /// if missing. Returns the entity and whether it was created. Idempotent:
    /// an existing entity is returned untouched, `defaults` ignored.
    fn get_or_create_catalog_movie(
        &mut self,
        movie_id: MovieId,
        defaults: CatalogMovie,
    ) -> Result<(CatalogMovie, bool)>;

    /// Insert a batch of similarity pairs.
    ///
    /// Pairs are keyed by their normalized `(low, high)` id tuple. With
    /// `ignore_duplicates` an already-present pair (from either ordering
    /// direction) is a no-op; without it, it is a `DuplicatePair` error.
    fn bulk_insert_similarity_pairs(
        &mut self,
        pairs: &[SimilarityPair],
        ignore_duplicates: bool,
    ) -> Result<()>;
}

/// The candidate ordering every implementation must apply: hottest first,
/// ties by ascending id so runs are deterministic, limit after ordering.
pub(crate) fn order_candidates(records: &mut Vec<RawMovieRecord>, limit: Option<usize>) {
    records.sort_by_key(|r| (Reverse(r.ratings_count), r.movie_id));
    if let Some(limit) = limit {
        records.truncate(limit);
    }
}
