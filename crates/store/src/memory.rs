//! In-memory store, used by tests and embeddable callers.

use std::collections::HashMap;

use crate::error::{Result, StoreError};
use crate::traits::{MovieStore, order_candidates};
use crate::types::{CatalogMovie, MovieId, RawMovieRecord, SimilarityPair};

/// A `MovieStore` backed by plain maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    source: Vec<RawMovieRecord>,
    catalog: HashMap<MovieId, CatalogMovie>,
    pairs: HashMap<(MovieId, MovieId), SimilarityPair>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-seeded with source records.
    pub fn with_source(records: Vec<RawMovieRecord>) -> Self {
        Self {
            source: records,
            ..Self::default()
        }
    }

    /// Add a source record.
    pub fn insert_source(&mut self, record: RawMovieRecord) {
        self.source.push(record);
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    pub fn get_catalog_movie(&self, id: MovieId) -> Option<&CatalogMovie> {
        self.catalog.get(&id)
    }

    /// Stored pairs in unspecified order.
    pub fn similarity_pairs(&self) -> Vec<SimilarityPair> {
        self.pairs.values().cloned().collect()
    }
}

impl MovieStore for InMemoryStore {
    fn read_candidates(
        &self,
        min_ratings: u32,
        limit: Option<usize>,
    ) -> Result<Vec<RawMovieRecord>> {
        let mut records: Vec<RawMovieRecord> = self
            .source
            .iter()
            .filter(|r| r.ratings_count >= min_ratings)
            .cloned()
            .collect();
        order_candidates(&mut records, limit);
        Ok(records)
    }

    fn count_similarity_pairs(&self) -> Result<u64> {
        Ok(self.pairs.len() as u64)
    }

    fn delete_all_similarity_pairs(&mut self) -> Result<()> {
        self.pairs.clear();
        Ok(())
    }

    fn get_or_create_catalog_movie(
        &mut self,
        movie_id: MovieId,
        defaults: CatalogMovie,
    ) -> Result<(CatalogMovie, bool)> {
        match self.catalog.get(&movie_id) {
            Some(existing) => Ok((existing.clone(), false)),
            None => {
                self.catalog.insert(movie_id, defaults.clone());
                Ok((defaults, true))
            }
        }
    }

    fn bulk_insert_similarity_pairs(
        &mut self,
        pairs: &[SimilarityPair],
        ignore_duplicates: bool,
    ) -> Result<()> {
        for pair in pairs {
            let key = pair.key();
            if self.pairs.contains_key(&key) {
                if ignore_duplicates {
                    continue;
                }
                return Err(StoreError::DuplicatePair {
                    movie1_id: key.0,
                    movie2_id: key.1,
                });
            }
            self.pairs.insert(key, pair.clone());
        }
        Ok(())
    }
}
