//! Pair similarity scoring.
//!
//! Content-based similarity between two movies: weighted overlap across
//! genres, directors, actors and tags. No user-behavior signal is involved.

use crate::parser::NormalizedMovie;

/// Factor weights. Genres and tags carry the score; people overlap is a
/// weak corroborating signal.
pub const GENRE_WEIGHT: f32 = 0.4;
pub const DIRECTOR_WEIGHT: f32 = 0.1;
pub const ACTOR_WEIGHT: f32 = 0.1;
pub const TAG_WEIGHT: f32 = 0.4;

/// Minimum score granted to any pair with genre overlap (the genre floor).
pub const GENRE_FLOOR: f32 = 0.05;

/// Computes the weighted similarity score for a movie pair.
///
/// ## Algorithm
/// Each factor is the overlap ratio `|a ∩ b| / max(|a|, |b|)`, zero when
/// either side is empty. The weighted sum is then subject to the genre
/// floor: any genre overlap guarantees at least [`GENRE_FLOOR`] whenever the
/// raw score falls below the configured threshold. The floor is a
/// recall-boosting rule and applies as-is even for thresholds below the
/// floor itself.
///
/// Scoring is pure and symmetric; results are always in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct PairScorer {
    min_similarity: f32,
}

impl PairScorer {
    pub fn new(min_similarity: f32) -> Self {
        Self { min_similarity }
    }

    pub fn score(&self, a: &NormalizedMovie, b: &NormalizedMovie) -> f32 {
        let genre_sim = overlap(&a.genres, &b.genres);
        let director_sim = overlap(&a.directors, &b.directors);
        let actor_sim = overlap(&a.actors, &b.actors);
        let tag_sim = overlap(&a.tags, &b.tags);

        let mut similarity = genre_sim * GENRE_WEIGHT
            + director_sim * DIRECTOR_WEIGHT
            + actor_sim * ACTOR_WEIGHT
            + tag_sim * TAG_WEIGHT;

        if genre_sim > 0.0 && similarity < self.min_similarity {
            similarity = similarity.max(GENRE_FLOOR);
        }

        similarity
    }
}

/// Overlap ratio between two deduplicated term lists.
///
/// Zero when either side is empty; the non-empty guard also makes the
/// denominator non-zero.
fn overlap(a: &[String], b: &[String]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.iter().filter(|term| b.contains(term)).count();
    common as f32 / a.len().max(b.len()) as f32
}
