//! Similarity persistence: clearing, batched writes, and the record cap.
//!
//! A run always recomputes from scratch (there is no incremental merge), so
//! writing goes through a fixed sequence: clear the prior pairs (gated by an
//! operator confirmation when any exist), then batch-insert accepted pairs
//! until either the pairs run out or the record cap is hit. Both referenced
//! catalog entities are get-or-created before a pair is buffered, so the
//! store never sees a dangling reference.

use std::collections::HashMap;

use store::{CatalogMovie, MovieId, MovieStore, SimilarityPair};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::parser::NormalizedMovie;
use crate::runner::CancelToken;

/// Default number of pairs per bulk insert.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Operator confirmation for destructive operations.
///
/// The interactive prompt is a process-boundary concern; the core only sees
/// this capability. The entry point supplies a stdin-backed implementation,
/// or [`AutoConfirm`] when running unattended.
pub trait Confirm {
    /// Whether `existing_pairs` stored records may be deleted.
    fn confirm_delete(&mut self, existing_pairs: u64) -> bool;
}

/// Always-yes confirmation for automation.
pub struct AutoConfirm;

impl Confirm for AutoConfirm {
    fn confirm_delete(&mut self, _existing_pairs: u64) -> bool {
        true
    }
}

/// Counters for one write pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteReport {
    /// Records handed to the store, post-cap.
    pub written: u64,
    /// Batches flushed.
    pub batches: u32,
    /// Whether the record cap cut the write short.
    pub capped: bool,
    /// Whether a cancellation request cut the write short.
    pub cancelled: bool,
}

/// Persists accepted pairs in batches, honoring the record cap.
pub struct SimilarityWriter {
    batch_size: usize,
    max_records: Option<u64>,
}

impl SimilarityWriter {
    /// `max_records` of `None` or `Some(0)` both mean unlimited.
    pub fn new(batch_size: usize, max_records: Option<u64>) -> Self {
        Self {
            batch_size: batch_size.max(1),
            max_records,
        }
    }

    /// The effective cap. Zero is normalized to "no cap" here, in one place.
    fn cap(&self) -> Option<u64> {
        self.max_records.filter(|&max| max > 0)
    }

    /// Clearing phase: delete all prior similarity pairs.
    ///
    /// When prior data exists the deletion is gated on `confirm`; a decline
    /// returns `Ok(false)`: a normal termination with the store untouched,
    /// not an error. An empty store is cleared without asking.
    pub fn clear_existing<S: MovieStore + ?Sized>(
        &self,
        store: &mut S,
        confirm: &mut dyn Confirm,
    ) -> Result<bool> {
        let existing = store.count_similarity_pairs()?;
        if existing > 0 && !confirm.confirm_delete(existing) {
            info!(
                "Operator declined deletion, {} existing pairs left untouched",
                existing
            );
            return Ok(false);
        }
        store.delete_all_similarity_pairs()?;
        if existing > 0 {
            info!("Cleared {} prior similarity pairs", existing);
        }
        Ok(true)
    }

    /// Writing phase: batch-insert `pairs` until exhausted or capped.
    ///
    /// Inserts ignore duplicate unordered pairs, so a rerun over a partially
    /// written store is a no-op for records already present. The cancel
    /// token is checked between batches; cancellation ends the pass cleanly
    /// with the counts written so far.
    pub fn write<S: MovieStore + ?Sized>(
        &self,
        store: &mut S,
        pairs: &[SimilarityPair],
        movies_by_id: &HashMap<MovieId, &NormalizedMovie>,
        cancel: &CancelToken,
    ) -> Result<WriteReport> {
        let cap = self.cap();
        let mut written: u64 = 0;
        let mut batches: u32 = 0;
        let mut capped = false;
        let mut cancelled = false;
        let mut batch: Vec<SimilarityPair> = Vec::with_capacity(self.batch_size);

        for pair in pairs {
            if let Some(cap) = cap {
                if written + batch.len() as u64 >= cap {
                    capped = true;
                    break;
                }
            }

            for id in [pair.movie1_id, pair.movie2_id] {
                let defaults = movies_by_id
                    .get(&id)
                    .map(|movie| movie.catalog_defaults())
                    .unwrap_or_else(|| CatalogMovie::placeholder(id));
                store.get_or_create_catalog_movie(id, defaults)?;
            }

            batch.push(pair.clone());
            if batch.len() >= self.batch_size {
                self.flush(store, &mut batch, &mut written, &mut batches)?;
                if cancel.is_cancelled() {
                    warn!("Cancellation requested, stopping after {} records", written);
                    cancelled = true;
                    break;
                }
            }
        }

        if !batch.is_empty() && !cancelled {
            if let Some(cap) = cap {
                let remaining = cap.saturating_sub(written) as usize;
                if remaining < batch.len() {
                    info!("Truncating final batch to {} records to honor the cap", remaining);
                    batch.truncate(remaining);
                    capped = true;
                }
            }
            if !batch.is_empty() {
                self.flush(store, &mut batch, &mut written, &mut batches)?;
            }
        }

        if cap.is_some_and(|cap| written >= cap) {
            capped = true;
        }
        info!("Persisted {} similarity pairs in {} batches", written, batches);
        Ok(WriteReport {
            written,
            batches,
            capped,
            cancelled,
        })
    }

    fn flush<S: MovieStore + ?Sized>(
        &self,
        store: &mut S,
        batch: &mut Vec<SimilarityPair>,
        written: &mut u64,
        batches: &mut u32,
    ) -> Result<()> {
        store
            .bulk_insert_similarity_pairs(batch, true)
            .map_err(|source| PipelineError::WriteFailed {
                written: *written,
                batches: *batches,
                source,
            })?;
        *written += batch.len() as u64;
        *batches += 1;
        match self.cap() {
            Some(cap) => info!("Saved {}/{} similarity records", written, cap),
            None => info!("Saved {} similarity records (no cap)", written),
        }
        batch.clear();
        Ok(())
    }
}

/// Index movies by id, first occurrence winning, for catalog defaults.
pub fn index_movies(movies: &[NormalizedMovie]) -> HashMap<MovieId, &NormalizedMovie> {
    let mut by_id: HashMap<MovieId, &NormalizedMovie> = HashMap::with_capacity(movies.len());
    for movie in movies {
        by_id.entry(movie.movie_id).or_insert(movie);
    }
    by_id
}

#[cfg(test)]
mod tests {
    use super::*;
    use store::InMemoryStore;

    /// Confirmation double that records whether it was consulted.
    struct ScriptedConfirm {
        answer: bool,
        asked: bool,
    }

    impl ScriptedConfirm {
        fn answering(answer: bool) -> Self {
            Self {
                answer,
                asked: false,
            }
        }
    }

    impl Confirm for ScriptedConfirm {
        fn confirm_delete(&mut self, _existing_pairs: u64) -> bool {
            self.asked = true;
            self.answer
        }
    }

    fn movie(movie_id: MovieId) -> NormalizedMovie {
        NormalizedMovie {
            movie_id,
            title: format!("Movie {movie_id}"),
            original_title: String::new(),
            directors: vec![format!("Director {movie_id}")],
            actors: Vec::new(),
            genres: vec!["Drama".to_string()],
            tags: Vec::new(),
            rating: 7.0,
            year: None,
            ratings_count: 50,
        }
    }

    fn pairs_between(n: MovieId) -> Vec<SimilarityPair> {
        let mut pairs = Vec::new();
        for a in 1..=n {
            for b in (a + 1)..=n {
                pairs.push(SimilarityPair::new(a, b, 0.5));
            }
        }
        pairs
    }

    #[test]
    fn test_cap_respected_with_truncated_final_batch() {
        let mut store = InMemoryStore::new();
        let movies: Vec<NormalizedMovie> = (1..=4).map(movie).collect();
        let pairs = pairs_between(4); // 6 pairs

        let writer = SimilarityWriter::new(4, Some(5));
        let report = writer
            .write(&mut store, &pairs, &index_movies(&movies), &CancelToken::new())
            .unwrap();

        assert_eq!(report.written, 5);
        assert!(report.capped);
        assert_eq!(store.count_similarity_pairs().unwrap(), 5);
    }

    #[test]
    fn test_zero_cap_means_unlimited() {
        let mut store = InMemoryStore::new();
        let movies: Vec<NormalizedMovie> = (1..=4).map(movie).collect();
        let pairs = pairs_between(4);

        let writer = SimilarityWriter::new(2, Some(0));
        let report = writer
            .write(&mut store, &pairs, &index_movies(&movies), &CancelToken::new())
            .unwrap();

        assert_eq!(report.written, 6);
        assert!(!report.capped);
        assert_eq!(store.count_similarity_pairs().unwrap(), 6);
    }

    #[test]
    fn test_catalog_entities_created_before_pairs() {
        let mut store = InMemoryStore::new();
        let movies: Vec<NormalizedMovie> = (1..=3).map(movie).collect();
        let pairs = pairs_between(3);

        let writer = SimilarityWriter::new(DEFAULT_BATCH_SIZE, None);
        writer
            .write(&mut store, &pairs, &index_movies(&movies), &CancelToken::new())
            .unwrap();

        assert_eq!(store.catalog_len(), 3);
        let entity = store.get_catalog_movie(2).unwrap();
        assert_eq!(entity.title, "Movie 2");
        assert_eq!(entity.director, "Director 2");
    }

    #[test]
    fn test_decline_leaves_existing_data_untouched() {
        let mut store = InMemoryStore::new();
        store
            .bulk_insert_similarity_pairs(&[SimilarityPair::new(1, 2, 0.9)], true)
            .unwrap();

        let writer = SimilarityWriter::new(DEFAULT_BATCH_SIZE, None);
        let mut confirm = ScriptedConfirm::answering(false);
        let proceed = writer.clear_existing(&mut store, &mut confirm).unwrap();

        assert!(!proceed);
        assert!(confirm.asked);
        assert_eq!(store.count_similarity_pairs().unwrap(), 1);
    }

    #[test]
    fn test_empty_store_clears_without_asking() {
        let mut store = InMemoryStore::new();
        let writer = SimilarityWriter::new(DEFAULT_BATCH_SIZE, None);
        let mut confirm = ScriptedConfirm::answering(false);

        let proceed = writer.clear_existing(&mut store, &mut confirm).unwrap();
        assert!(proceed);
        assert!(!confirm.asked, "no prior data, nothing to confirm");
    }

    #[test]
    fn test_cancellation_stops_between_batches() {
        let mut store = InMemoryStore::new();
        let movies: Vec<NormalizedMovie> = (1..=4).map(movie).collect();
        let pairs = pairs_between(4); // 6 pairs

        let cancel = CancelToken::new();
        cancel.cancel();

        let writer = SimilarityWriter::new(2, None);
        let report = writer
            .write(&mut store, &pairs, &index_movies(&movies), &cancel)
            .unwrap();

        // First batch lands, then the token is seen.
        assert_eq!(report.written, 2);
        assert!(report.cancelled);
        assert_eq!(store.count_similarity_pairs().unwrap(), 2);
    }

    #[test]
    fn test_first_match_wins_for_defaults() {
        let first = movie(1);
        let mut second = movie(1);
        second.title = "Shadowed duplicate".to_string();

        let movies = [first, second];
        let by_id = index_movies(&movies);
        assert_eq!(by_id[&1].title, "Movie 1");
    }
}
