//! Metadata parsing: raw source rows into normalized, scoreable movies.
//!
//! Source rows come from scrapers and the structured-looking fields are
//! unreliable: `directors`/`actors`/`rating` may be valid JSON, single-quoted
//! literal text, or garbage; `genres`/`tags` may be bracket-wrapped
//! pseudo-lists or plain comma-separated strings. Each field is parsed
//! through a short fallback chain and degrades to an empty/default value on
//! its own: one malformed field never costs the movie, and one malformed
//! movie never costs the batch.

use serde_json::Value;
use store::{CatalogMovie, MovieId, RawMovieRecord};
use tracing::{debug, info};

/// A source movie with every attribute field normalized, ready for scoring.
///
/// The four attribute collections behave as sets (deduplicated, membership
/// is what matters for scoring) but preserve source order, because catalog
/// defaults take the leading entries: billing order is meaningful for
/// directors and actors.
#[derive(Debug, Clone)]
pub struct NormalizedMovie {
    pub movie_id: MovieId,
    pub title: String,
    pub original_title: String,
    pub directors: Vec<String>,
    pub actors: Vec<String>,
    pub genres: Vec<String>,
    pub tags: Vec<String>,
    pub rating: f32,
    pub year: Option<u16>,
    pub ratings_count: u32,
}

impl NormalizedMovie {
    /// Whether this movie carries any content signal worth scoring.
    ///
    /// Movies with neither genres nor tags match almost nothing and pollute
    /// the pairwise stage; they are excluded from the candidate set entirely.
    pub fn has_signal(&self) -> bool {
        !self.genres.is_empty() || !self.tags.is_empty()
    }

    /// Best-effort catalog entity for this movie: first credited director,
    /// first five actors comma-joined.
    pub fn catalog_defaults(&self) -> CatalogMovie {
        CatalogMovie {
            id: self.movie_id,
            title: self.title.clone(),
            original_title: self.original_title.clone(),
            director: self.directors.first().cloned().unwrap_or_default(),
            actors: self
                .actors
                .iter()
                .take(5)
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            rating: self.rating,
        }
    }
}

/// Normalize one raw record. Total: every field degrades independently.
pub fn parse_movie(raw: &RawMovieRecord) -> NormalizedMovie {
    NormalizedMovie {
        movie_id: raw.movie_id,
        title: raw.title.clone(),
        original_title: raw.original_title.clone(),
        directors: parse_name_list(&raw.directors, "directors", raw.movie_id),
        actors: parse_name_list(&raw.actors, "actors", raw.movie_id),
        genres: parse_term_list(&raw.genres),
        tags: parse_term_list(&raw.tags),
        rating: parse_rating(&raw.rating, raw.movie_id),
        year: raw.year,
        ratings_count: raw.ratings_count,
    }
}

/// Normalize a candidate batch, dropping movies without any content signal.
pub fn normalize_records(records: &[RawMovieRecord]) -> Vec<NormalizedMovie> {
    let mut movies = Vec::with_capacity(records.len());
    let mut dropped = 0usize;
    for raw in records {
        let movie = parse_movie(raw);
        if !movie.has_signal() {
            debug!(
                "Dropping movie {} ({:?}): no genres and no tags",
                movie.movie_id, movie.title
            );
            dropped += 1;
            continue;
        }
        movies.push(movie);
    }
    info!(
        "Normalized {} of {} candidates ({} without genres or tags dropped)",
        movies.len(),
        records.len(),
        dropped
    );
    movies
}

/// Fallback chain for JSON-ish payloads: strict parse first, then a
/// single-quote-relaxed reparse (scraper output often arrives single-quoted),
/// then nothing.
fn parse_loose_json(field: &str) -> Option<Value> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }
    serde_json::from_str(&trimmed.replace('\'', "\"")).ok()
}

/// Extract person names from a `directors`/`actors` payload.
///
/// The payload is expected to be an array of `{name: ...}` objects; only the
/// `name` values are kept. Non-object entries and entries without a usable
/// name are ignored.
fn parse_name_list(field: &str, field_name: &str, movie_id: MovieId) -> Vec<String> {
    let Some(value) = parse_loose_json(field) else {
        if !field.trim().is_empty() {
            debug!(
                "Movie {}: unparseable {} payload, treating as empty",
                movie_id, field_name
            );
        }
        return Vec::new();
    };

    let Some(entries) = value.as_array() else {
        debug!(
            "Movie {}: {} payload is not an array, treating as empty",
            movie_id, field_name
        );
        return Vec::new();
    };

    let mut names: Vec<String> = Vec::with_capacity(entries.len());
    for entry in entries {
        // `get` on a non-object yields None, which skips the entry.
        let Some(name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        let name = name.trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Split a `genres`/`tags` field into trimmed, deduplicated terms.
///
/// Handles both `"['Drama', 'Comedy']"` and `"Drama, Comedy"`.
fn parse_term_list(field: &str) -> Vec<String> {
    let inner = field.trim().trim_matches(['[', ']']);
    let mut terms: Vec<String> = Vec::new();
    for part in inner.split(',') {
        let term = part.trim().trim_matches(['\'', '"']).trim();
        if term.is_empty() {
            continue;
        }
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// Extract the average rating from a `rating` payload.
///
/// The payload is a JSON-ish object with an `average` key; anything else
/// defaults to 0.0.
fn parse_rating(field: &str, movie_id: MovieId) -> f32 {
    let Some(value) = parse_loose_json(field) else {
        if !field.trim().is_empty() {
            debug!("Movie {}: unparseable rating payload, defaulting to 0", movie_id);
        }
        return 0.0;
    };
    value
        .get("average")
        .and_then(Value::as_f64)
        .map(|avg| avg as f32)
        .unwrap_or(0.0)
}
