//! Benchmarks for the pairwise compute engine.
//!
//! Run with: cargo bench --package pipeline
//!
//! Uses synthetic movies so the bench runs without a dataset on disk; the
//! attribute pools are sized so that pairs overlap about as often as real
//! catalog data does.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pipeline::{NormalizedMovie, PairwiseEngine};

fn synthetic_movies(n: usize) -> Vec<NormalizedMovie> {
    let genres = [
        "Drama", "Comedy", "Action", "Crime", "Romance", "Thriller", "Horror", "SciFi", "War",
        "Animation", "Documentary", "Mystery",
    ];
    let tags = [
        "classic", "oscar", "cult", "indie", "slow", "epic", "noir", "remake", "sequel", "space",
        "heist", "courtroom", "road", "sports", "musical", "zombie", "samurai", "western", "silent",
        "biopic",
    ];

    (0..n)
        .map(|i| NormalizedMovie {
            movie_id: i as u32 + 1,
            title: format!("Synthetic {i}"),
            original_title: String::new(),
            directors: vec![format!("Director {}", i % 40)],
            actors: (0..4).map(|k| format!("Actor {}", (i * 3 + k) % 120)).collect(),
            genres: (0..3).map(|k| genres[(i + k * 5) % genres.len()].to_string()).collect(),
            tags: (0..4).map(|k| tags[(i * 7 + k) % tags.len()].to_string()).collect(),
            rating: 6.5,
            year: Some(1990 + (i % 35) as u16),
            ratings_count: 100,
        })
        .collect()
}

fn bench_pairwise_small(c: &mut Criterion) {
    let movies = synthetic_movies(200);
    let engine = PairwiseEngine::new(0.15);

    c.bench_function("pairwise_compute_200", |b| {
        b.iter(|| {
            let (pairs, report) = engine.compute(black_box(&movies));
            black_box((pairs, report))
        })
    });
}

fn bench_pairwise_medium(c: &mut Criterion) {
    let movies = synthetic_movies(500);
    let engine = PairwiseEngine::new(0.15);

    c.bench_function("pairwise_compute_500", |b| {
        b.iter(|| {
            let (pairs, report) = engine.compute(black_box(&movies));
            black_box((pairs, report))
        })
    });
}

criterion_group!(benches, bench_pairwise_small, bench_pairwise_medium);
criterion_main!(benches);
