//! File-backed store: one JSON record per line, one file per record set.
//!
//! Layout inside the store directory:
//! - `movies.jsonl`: the source collection table (required at open,
//!   never written by this system)
//! - `catalog.jsonl`: known-movie entities (created on demand)
//! - `similarities.jsonl`: scored pairs (created on demand)
//!
//! The whole store is loaded eagerly at `open`; mutations update the
//! in-memory state and are flushed to disk per operation (append on insert,
//! truncate-rewrite on delete-all). That keeps writes cheap at the batch
//! cadence the pipeline uses while the loaded state stays authoritative.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::traits::{MovieStore, order_candidates};
use crate::types::{CatalogMovie, MovieId, RawMovieRecord, SimilarityPair};

const MOVIES_FILE: &str = "movies.jsonl";
const CATALOG_FILE: &str = "catalog.jsonl";
const SIMILARITIES_FILE: &str = "similarities.jsonl";

/// A `MovieStore` persisted as JSONL files in a directory.
#[derive(Debug)]
pub struct JsonlStore {
    dir: PathBuf,
    source: Vec<RawMovieRecord>,
    catalog: HashMap<MovieId, CatalogMovie>,
    pairs: HashMap<(MovieId, MovieId), SimilarityPair>,
}

impl JsonlStore {
    /// Open a store directory, loading all three record sets.
    ///
    /// `movies.jsonl` must exist; the writable sets start empty when their
    /// files are absent. A corrupt line anywhere fails the open with its
    /// file and line number rather than silently skipping rows.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();

        let movies_path = dir.join(MOVIES_FILE);
        let file = File::open(&movies_path).map_err(|source| StoreError::Open {
            path: movies_path.display().to_string(),
            source,
        })?;
        let source: Vec<RawMovieRecord> = read_records(file, MOVIES_FILE)?;

        let catalog_records: Vec<CatalogMovie> = read_optional(&dir.join(CATALOG_FILE), CATALOG_FILE)?;
        let catalog = catalog_records.into_iter().map(|m| (m.id, m)).collect();

        let pair_records: Vec<SimilarityPair> =
            read_optional(&dir.join(SIMILARITIES_FILE), SIMILARITIES_FILE)?;
        let pairs = pair_records.into_iter().map(|p| (p.key(), p)).collect();

        let store = Self {
            dir,
            source,
            catalog,
            pairs,
        };
        info!(
            "Opened store at {:?}: {} source movies, {} catalog entries, {} similarity pairs",
            store.dir,
            store.source.len(),
            store.catalog.len(),
            store.pairs.len()
        );
        Ok(store)
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn catalog_len(&self) -> usize {
        self.catalog.len()
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn append<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(name))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            let line = serde_json::to_string(record)?;
            writeln!(writer, "{line}")?;
        }
        writer.flush()?;
        Ok(())
    }
}

fn read_records<T: DeserializeOwned>(file: File, name: &str) -> Result<Vec<T>> {
    let reader = BufReader::new(file);
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| StoreError::Corrupt {
            file: name.to_string(),
            line: idx + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Read a record set whose file may not exist yet.
fn read_optional<T: DeserializeOwned>(path: &Path, name: &str) -> Result<Vec<T>> {
    match File::open(path) {
        Ok(file) => read_records(file, name),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!("{} not present, starting empty", name);
            Ok(Vec::new())
        }
        Err(err) => Err(err.into()),
    }
}

impl MovieStore for JsonlStore {
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
        // Truncate on disk as well.
        File::create(self.path(SIMILARITIES_FILE))?;
        Ok(())
    }

    fn get_or_create_catalog_movie(
        &mut self,
        movie_id: MovieId,
        defaults: CatalogMovie,
    ) -> Result<(CatalogMovie, bool)> {
        if let Some(existing) = self.catalog.get(&movie_id) {
            return Ok((existing.clone(), false));
        }
        self.append(CATALOG_FILE, std::slice::from_ref(&defaults))?;
        self.catalog.insert(movie_id, defaults.clone());
        Ok((defaults, true))
    }

    fn bulk_insert_similarity_pairs(
        &mut self,
        pairs: &[SimilarityPair],
        ignore_duplicates: bool,
    ) -> Result<()> {
        let mut fresh = Vec::with_capacity(pairs.len());
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
            fresh.push(pair.clone());
        }
        self.append(SIMILARITIES_FILE, &fresh)
    }
}
