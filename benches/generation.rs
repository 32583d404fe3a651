//! Benchmarks for the per-iteration work of the level search.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::{rngs::StdRng, SeedableRng};
use slidegen::{DensityField, GenerationConfig, Level, MovementGraph, Position};

fn sample_level(config: &GenerationConfig) -> Level {
    let mut rng = StdRng::seed_from_u64(42);
    DensityField::walled(config.width, config.height, 0.2).sample_level(&mut rng)
}

fn bench_graph_build(c: &mut Criterion) {
    let config = GenerationConfig::new();
    let level = sample_level(&config);

    c.bench_function("movement_graph_build", |b| {
        b.iter(|| MovementGraph::build(black_box(&level)))
    });
}

fn bench_analysis(c: &mut Criterion) {
    let config = GenerationConfig::new();
    let level = sample_level(&config);
    let graph = MovementGraph::build(&level);
    let start = config.index_of(Position::new(1, 1));
    let exit = graph.best_score(start).exit;

    c.bench_function("best_score", |b| b.iter(|| graph.best_score(black_box(start))));
    c.bench_function("stuck_check", |b| {
        b.iter(|| graph.find_stuck_tile(black_box(start), black_box(exit)))
    });
}

fn bench_pattern_score(c: &mut Criterion) {
    let config = GenerationConfig::new();
    let field = DensityField::walled(config.width, config.height, 0.3);

    c.bench_function("pattern_score", |b| b.iter(|| black_box(&field).pattern_score()));
}

criterion_group!(benches, bench_graph_build, bench_analysis, bench_pattern_score);
criterion_main!(benches);
