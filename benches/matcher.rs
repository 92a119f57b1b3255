//! Benchmarks for fuzzy entity matching.

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use ayurgraph::config::EngineConfig;
use ayurgraph::engine::Engine;
use ayurgraph::retrieve::matcher::partial_ratio;

fn bundled_engine() -> Engine {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/ayurgraph.ttl");
    Engine::load(&path, &EngineConfig::default()).unwrap()
}

fn bench_partial_ratio(c: &mut Criterion) {
    c.bench_function("partial_ratio_short_long", |bench| {
        bench.iter(|| {
            black_box(partial_ratio(
                black_box("ashwaganda"),
                black_box("what does ashwagandha help with"),
            ))
        })
    });
}

fn bench_find_similar(c: &mut Criterion) {
    let engine = bundled_engine();

    c.bench_function("find_similar_entities_45", |bench| {
        bench.iter(|| black_box(engine.find_similar_entities(black_box("turmeric for skin"), None)))
    });
}

fn bench_search(c: &mut Criterion) {
    let engine = bundled_engine();

    c.bench_function("comprehensive_search_cached", |bench| {
        bench.iter(|| black_box(engine.search(black_box("neem"))))
    });
}

criterion_group!(benches, bench_partial_ratio, bench_find_similar, bench_search);
criterion_main!(benches);
