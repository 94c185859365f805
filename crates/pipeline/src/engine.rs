//! Pairwise compute engine: all-pairs similarity over the candidate set.
//!
//! This is the dominant cost of a run. For `n` candidates the engine scores
//! every unordered pair, `n*(n-1)/2` of them, so doubling the candidate
//! set quadruples the work. Operators size runs through the candidate
//! `limit`; the engine itself never subsamples.
//!
//! Scoring is stateless and independent per pair, so the pair list is
//! sharded across the rayon thread pool with the movie list shared as a
//! read-only slice. Output order is unspecified and nothing downstream
//! relies on it.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use store::SimilarityPair;
use tracing::{info, warn};

use crate::parser::NormalizedMovie;
use crate::scorer::PairScorer;

/// Aggregate counters for one compute pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputeReport {
    /// Unordered pairs enumerated: exactly `n·(n−1)/2`.
    pub pairs_considered: u64,
    /// Pairs at or above the similarity threshold.
    pub pairs_accepted: u64,
    /// Pairs discarded because scoring panicked.
    pub pairs_dropped: u64,
    pub elapsed: Duration,
}

/// Enumerates and scores every unordered candidate pair in parallel.
pub struct PairwiseEngine {
    scorer: PairScorer,
    min_similarity: f32,
}

impl PairwiseEngine {
    pub fn new(min_similarity: f32) -> Self {
        Self {
            scorer: PairScorer::new(min_similarity),
            min_similarity,
        }
    }

    /// Score all pairs, returning those passing the threshold.
    ///
    /// A panic while scoring one pair drops that pair and the run continues;
    /// only the aggregate drop count is reported.
    pub fn compute(&self, movies: &[NormalizedMovie]) -> (Vec<SimilarityPair>, ComputeReport) {
        let start = Instant::now();
        let n = movies.len();
        if n < 2 {
            info!("Fewer than two candidates, nothing to score");
            return (
                Vec::new(),
                ComputeReport {
                    elapsed: start.elapsed(),
                    ..ComputeReport::default()
                },
            );
        }

        let pairs_considered = (n as u64) * (n as u64 - 1) / 2;
        info!(
            "Scoring {} movies pairwise: {} pairs, threshold {}",
            n, pairs_considered, self.min_similarity
        );

        let dropped = AtomicU64::new(0);
        let accepted: Vec<SimilarityPair> = (0..n)
            .into_par_iter()
            .flat_map_iter(|i| ((i + 1)..n).map(move |j| (i, j)))
            .filter_map(|(i, j)| {
                let a = &movies[i];
                let b = &movies[j];
                let score = match catch_unwind(AssertUnwindSafe(|| self.scorer.score(a, b))) {
                    Ok(score) => score,
                    Err(_) => {
                        dropped.fetch_add(1, Ordering::Relaxed);
                        return None;
                    }
                };
                (score >= self.min_similarity)
                    .then(|| SimilarityPair::new(a.movie_id, b.movie_id, score))
            })
            .collect();

        let report = ComputeReport {
            pairs_considered,
            pairs_accepted: accepted.len() as u64,
            pairs_dropped: dropped.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };
        if report.pairs_dropped > 0 {
            warn!("{} pairs dropped due to scoring failures", report.pairs_dropped);
        }
        info!(
            "Pairwise scoring done: {}/{} pairs accepted in {:?}",
            report.pairs_accepted, report.pairs_considered, report.elapsed
        );
        (accepted, report)
    }
}
