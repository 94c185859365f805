//! Run coordination: the sequential phases of a similarity update.
//!
//! A run is: clear prior pairs (confirmation-gated) → load candidates →
//! normalize → optional catalog import → pairwise compute → batched write.
//! Only the compute phase is parallel; phases never overlap. The store is
//! the single shared mutable resource and this coordinator is its only
//! writer during a run; concurrent runs against one store must be
//! serialized by the operator.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use store::{MovieStore, RawMovieRecord};
use tracing::info;

use crate::engine::PairwiseEngine;
use crate::error::Result;
use crate::writer::{Confirm, DEFAULT_BATCH_SIZE, SimilarityWriter, index_movies};
use crate::{parser, selector};

/// Cooperative cancellation flag, checked between write batches.
///
/// Clone-able and shareable with a signal handler; cancellation ends the run
/// cleanly with the counts written so far.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Parameters of one similarity update run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Candidate cap, applied after hottest-first ordering.
    pub limit: Option<usize>,
    /// Acceptance threshold for scored pairs.
    pub min_similarity: f32,
    /// Minimum ratings count for a movie to enter the pairwise stage.
    pub min_ratings: u32,
    /// Stored-record cap; `None` and `Some(0)` both mean unlimited.
    pub max_records: Option<u64>,
    /// Pairs per bulk insert.
    pub batch_size: usize,
    /// Upsert all selected movies into the catalog before computing.
    pub force_import: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            limit: None,
            min_similarity: 0.15,
            min_ratings: 10,
            max_records: Some(10_000),
            batch_size: DEFAULT_BATCH_SIZE,
            force_import: true,
        }
    }
}

/// What happened during a run. Produced on every termination path short of
/// a store failure, including operator abort and cancellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunReport {
    pub candidates_loaded: usize,
    /// Candidates surviving normalization (the signal filter).
    pub movies_kept: usize,
    /// Catalog entities newly created by the import step.
    pub imported: u64,
    pub pairs_considered: u64,
    pub pairs_accepted: u64,
    pub pairs_dropped: u64,
    pub pairs_written: u64,
    pub batches: u32,
    /// Operator declined the destructive-delete confirmation.
    pub aborted: bool,
    pub capped: bool,
    pub cancelled: bool,
    pub elapsed: Duration,
}

/// Full similarity update against `store`.
///
/// Returns `Ok` with `aborted = true` (and nothing deleted or written) when
/// the operator declines the destructive-delete confirmation.
pub fn run_similarity_update<S: MovieStore + ?Sized>(
    store: &mut S,
    config: &RunConfig,
    confirm: &mut dyn Confirm,
    cancel: &CancelToken,
) -> Result<RunReport> {
    let start = Instant::now();
    info!(
        "Starting similarity update (min_similarity {}, min_ratings {}, limit {:?}, max_records {:?})",
        config.min_similarity, config.min_ratings, config.limit, config.max_records
    );

    let writer = SimilarityWriter::new(config.batch_size, config.max_records);
    if !writer.clear_existing(store, confirm)? {
        return Ok(RunReport {
            aborted: true,
            elapsed: start.elapsed(),
            ..RunReport::default()
        });
    }

    let candidates = selector::select_candidates(store, config.min_ratings, config.limit)?;

    let imported = if config.force_import {
        import_catalog(store, &candidates)?
    } else {
        0
    };

    let movies = parser::normalize_records(&candidates);

    let engine = PairwiseEngine::new(config.min_similarity);
    let (pairs, compute) = engine.compute(&movies);

    let by_id = index_movies(&movies);
    let write = writer.write(store, &pairs, &by_id, cancel)?;

    let report = RunReport {
        candidates_loaded: candidates.len(),
        movies_kept: movies.len(),
        imported,
        pairs_considered: compute.pairs_considered,
        pairs_accepted: compute.pairs_accepted,
        pairs_dropped: compute.pairs_dropped,
        pairs_written: write.written,
        batches: write.batches,
        aborted: false,
        capped: write.capped,
        cancelled: write.cancelled,
        elapsed: start.elapsed(),
    };
    info!(
        "Similarity update finished: {} candidates, {} pairs considered, {} accepted, {} written in {:?}",
        report.candidates_loaded,
        report.pairs_considered,
        report.pairs_accepted,
        report.pairs_written,
        report.elapsed
    );
    Ok(report)
}

/// Catalog-import only: upsert selected source movies as catalog entities.
///
/// Returns the number of entities newly created. `min_ratings` of 0 imports
/// the whole source table (subject to `limit`).
pub fn run_catalog_import<S: MovieStore + ?Sized>(
    store: &mut S,
    min_ratings: u32,
    limit: Option<usize>,
) -> Result<u64> {
    let candidates = selector::select_candidates(store, min_ratings, limit)?;
    import_catalog(store, &candidates)
}

/// Get-or-create a catalog entity for every record, pre-signal-filter: a
/// movie without genres or tags is still a legitimate catalog entry even
/// though it never enters the pairwise stage.
fn import_catalog<S: MovieStore + ?Sized>(
    store: &mut S,
    records: &[RawMovieRecord],
) -> Result<u64> {
    let mut created = 0u64;
    for raw in records {
        let movie = parser::parse_movie(raw);
        let (_, was_created) =
            store.get_or_create_catalog_movie(movie.movie_id, movie.catalog_defaults())?;
        if was_created {
            created += 1;
        }
    }
    info!(
        "Catalog import: {} of {} movies newly created",
        created,
        records.len()
    );
    Ok(created)
}
