//! Core record types shared by every store implementation.
//!
//! Three kinds of records live in the store:
//! - `RawMovieRecord`: a source-catalog row as collected, loose text fields
//!   and all. Read-only from this system's point of view.
//! - `CatalogMovie`: the lightweight known-movie entity that similarity pairs
//!   reference. Created lazily via get-or-create.
//! - `SimilarityPair`: a scored, unordered relationship between two movies.

use serde::{Deserialize, Serialize};

/// Unique identifier for a movie across all three record sets.
pub type MovieId = u32;

/// A movie row as it sits in the source collection table.
///
/// The `directors`, `actors` and `rating` fields hold JSON-ish text captured
/// from upstream scrapers and are frequently malformed (single-quoted,
/// truncated, or plain garbage); `genres` and `tags` are either
/// bracket-wrapped pseudo-lists (`"['Drama', 'Comedy']"`) or comma-separated
/// strings. Interpretation of these fields is the pipeline's job, not the
/// store's; the store hands them over verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMovieRecord {
    pub movie_id: MovieId,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    /// JSON-ish array of `{name: ...}` objects, or malformed text.
    #[serde(default)]
    pub directors: String,
    /// Same shape as `directors`.
    #[serde(default)]
    pub actors: String,
    /// Bracket-delimited pseudo-list or comma-separated string.
    #[serde(default)]
    pub genres: String,
    /// Same shape as `genres`.
    #[serde(default)]
    pub tags: String,
    /// JSON-ish object with an `average` key, or malformed text.
    #[serde(default)]
    pub rating: String,
    pub year: Option<u16>,
    #[serde(default)]
    pub ratings_count: u32,
}

/// The known-movie entity referenced by both ends of a similarity pair.
///
/// Fields are best-effort copies scraped from the source record at creation
/// time: `director` is the first credited director, `actors` the first five
/// comma-joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogMovie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub actors: String,
    #[serde(default)]
    pub rating: f32,
}

impl CatalogMovie {
    /// Placeholder entity for an id with no surviving source record.
    pub fn placeholder(id: MovieId) -> Self {
        Self {
            id,
            title: String::new(),
            original_title: String::new(),
            director: String::new(),
            actors: String::new(),
            rating: 0.0,
        }
    }
}

/// A scored relationship between two distinct movies.
///
/// The pair is unordered; `movie1_id < movie2_id` always holds so the same
/// combination cannot be stored twice under swapped ids. `new` enforces the
/// convention no matter which order the caller supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityPair {
    pub movie1_id: MovieId,
    pub movie2_id: MovieId,
    /// Similarity score in `[0, 1]`.
    pub similarity: f32,
}

impl SimilarityPair {
    pub fn new(a: MovieId, b: MovieId, similarity: f32) -> Self {
        let (movie1_id, movie2_id) = if a <= b { (a, b) } else { (b, a) };
        Self {
            movie1_id,
            movie2_id,
            similarity,
        }
    }

    /// Normalized `(low, high)` id tuple used as the uniqueness key.
    pub fn key(&self) -> (MovieId, MovieId) {
        (self.movie1_id, self.movie2_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_orders_ids() {
        let pair = SimilarityPair::new(42, 7, 0.5);
        assert_eq!(pair.movie1_id, 7);
        assert_eq!(pair.movie2_id, 42);
        assert_eq!(pair.key(), (7, 42));
    }

    #[test]
    fn test_pair_key_is_direction_independent() {
        let a = SimilarityPair::new(1, 2, 0.3);
        let b = SimilarityPair::new(2, 1, 0.9);
        assert_eq!(a.key(), b.key());
    }
}
