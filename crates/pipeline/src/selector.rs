//! Candidate selection: which source movies enter the pairwise stage.

use crate::error::Result;
use store::{MovieStore, RawMovieRecord};
use tracing::info;

/// Load eligible source movies from the store.
///
/// Eligibility is a hard `ratings_count >= min_ratings` cutoff; cold movies
/// carry too little signal to be worth a slot in the quadratic stage. The
/// store orders by descending `ratings_count` and applies `limit` only after
/// ordering, so a capped run keeps the most-rated movies instead of a biased
/// arbitrary sample.
pub fn select_candidates<S: MovieStore + ?Sized>(
    store: &S,
    min_ratings: u32,
    limit: Option<usize>,
) -> Result<Vec<RawMovieRecord>> {
    let candidates = store.read_candidates(min_ratings, limit)?;
    info!(
        "Loaded {} candidate movies (ratings_count >= {}{})",
        candidates.len(),
        min_ratings,
        limit.map(|l| format!(", limit {l}")).unwrap_or_default()
    );
    Ok(candidates)
}
