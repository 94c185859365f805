//! Integration tests for the full similarity run.
//!
//! These drive `run_similarity_update` end to end against an in-memory
//! store, with the kind of uneven source data the pipeline sees in practice:
//! malformed metadata fields, cold movies, and movies without any content
//! signal.

use pipeline::{AutoConfirm, CancelToken, Confirm, RunConfig, run_similarity_update};
use store::{InMemoryStore, MovieStore, RawMovieRecord, SimilarityPair};

fn record(
    movie_id: u32,
    ratings_count: u32,
    genres: &str,
    tags: &str,
    directors: &str,
) -> RawMovieRecord {
    RawMovieRecord {
        movie_id,
        title: format!("Movie {movie_id}"),
        original_title: format!("Original {movie_id}"),
        directors: directors.to_string(),
        actors: String::new(),
        genres: genres.to_string(),
        tags: tags.to_string(),
        rating: r#"{"average": 7.9}"#.to_string(),
        year: Some(2010),
        ratings_count,
    }
}

fn seeded_store() -> InMemoryStore {
    InMemoryStore::with_source(vec![
        record(1, 900, "['Drama', 'Crime']", "['classic']", r#"[{"name": "D1"}]"#),
        record(2, 800, "['Drama']", "['classic', 'slow']", "[{'name': 'D1'}]"),
        record(3, 700, "Drama, War", "", r#"[{"name": "D2"}]"#),
        // Malformed directors payload; genres still carry signal.
        record(4, 600, "['Crime']", "['heist']", "{{{ broken"),
        // Cold: below the ratings cutoff, never scored.
        record(5, 3, "['Drama']", "['classic']", ""),
        // No genres, no tags: dropped by the signal filter.
        record(6, 500, "", "", ""),
    ])
}

fn sorted_pairs(store: &InMemoryStore) -> Vec<(u32, u32, f32)> {
    let mut pairs: Vec<(u32, u32, f32)> = store
        .similarity_pairs()
        .iter()
        .map(|p| (p.movie1_id, p.movie2_id, p.similarity))
        .collect();
    pairs.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
    pairs
}

#[test]
fn test_full_run_counts_and_filters() {
    let mut store = seeded_store();
    let config = RunConfig {
        min_ratings: 10,
        ..RunConfig::default()
    };

    let report =
        run_similarity_update(&mut store, &config, &mut AutoConfirm, &CancelToken::new()).unwrap();

    // Movie 5 is cold; of the remaining five, movie 6 has no signal.
    assert_eq!(report.candidates_loaded, 5);
    assert_eq!(report.movies_kept, 4);
    assert_eq!(report.pairs_considered, 6); // 4*3/2
    assert!(!report.aborted);
    assert_eq!(report.pairs_written, report.pairs_accepted);
    assert_eq!(
        store.count_similarity_pairs().unwrap(),
        report.pairs_written
    );

    // Movies 1 and 2 share a genre, a tag and a director: comfortably above
    // the 0.15 threshold.
    assert!(
        sorted_pairs(&store).iter().any(|&(a, b, _)| (a, b) == (1, 2)),
        "strongest pair must be stored"
    );

    // Candidates were imported into the catalog before scoring, including
    // the signal-free movie 6.
    assert_eq!(report.imported, 5);
    assert_eq!(store.catalog_len(), 5);
    assert_eq!(store.get_catalog_movie(1).unwrap().director, "D1");
}

#[test]
fn test_rerun_is_idempotent() {
    let mut store = seeded_store();
    let config = RunConfig::default();

    run_similarity_update(&mut store, &config, &mut AutoConfirm, &CancelToken::new()).unwrap();
    let first = sorted_pairs(&store);
    assert!(!first.is_empty());

    // Second run clears and recomputes; identical inputs, identical output.
    let report =
        run_similarity_update(&mut store, &config, &mut AutoConfirm, &CancelToken::new()).unwrap();
    assert!(!report.aborted);
    assert_eq!(sorted_pairs(&store), first);
}

#[test]
fn test_declined_confirmation_aborts_with_data_intact() {
    struct Deny;
    impl Confirm for Deny {
        fn confirm_delete(&mut self, _existing_pairs: u64) -> bool {
            false
        }
    }

    let mut store = seeded_store();
    store
        .bulk_insert_similarity_pairs(&[SimilarityPair::new(100, 200, 0.7)], true)
        .unwrap();

    let report = run_similarity_update(
        &mut store,
        &RunConfig::default(),
        &mut Deny,
        &CancelToken::new(),
    )
    .unwrap();

    assert!(report.aborted);
    assert_eq!(report.pairs_written, 0);
    let remaining = store.similarity_pairs();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].key(), (100, 200));
}

#[test]
fn test_max_records_caps_the_stored_set() {
    let mut store = seeded_store();
    let config = RunConfig {
        max_records: Some(2),
        min_similarity: 0.0,
        ..RunConfig::default()
    };

    let report =
        run_similarity_update(&mut store, &config, &mut AutoConfirm, &CancelToken::new()).unwrap();

    assert!(report.pairs_accepted > 2);
    assert!(report.capped);
    assert_eq!(report.pairs_written, 2);
    assert_eq!(store.count_similarity_pairs().unwrap(), 2);
}
