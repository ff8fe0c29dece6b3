//! Benchmarks for single-request prediction and small training runs.

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

use nutripred::data::write_records_csv;
use nutripred::synth::{Synthesizer, SynthesizerConfig};
use nutripred::{Corpus, PredictionEngine, PredictionRequest, TrainerConfig};

const TREE_COUNTS: [u32; 3] = [10, 50, 100];

/// Baseline Criterion configuration; `--bench` flags can override it.
fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(10))
        .sample_size(10)
}

fn bench_corpus(n_records: usize) -> (TempDir, Corpus) {
    let dir = TempDir::new().expect("temp dir");
    let config = SynthesizerConfig::builder()
        .n_records(n_records)
        .build()
        .expect("valid config");
    let records = Synthesizer::new(&config).generate();

    let path = dir.path().join("bench.csv");
    write_records_csv(&path, &records).expect("write corpus");
    let corpus = Corpus::from_csv_path(&path).expect("read corpus");
    (dir, corpus)
}

fn trained_engine(corpus: &Corpus, n_trees: u32) -> PredictionEngine {
    let config = TrainerConfig::builder()
        .n_trees(n_trees)
        .max_depth(8)
        .build()
        .expect("valid config");
    let mut engine = PredictionEngine::new();
    engine.train(corpus, &config).expect("training succeeds");
    engine
}

fn bench_predict_tree_scaling(c: &mut Criterion) {
    let (_dir, corpus) = bench_corpus(1_000);
    let request = PredictionRequest::new("apple", 150.0).with_food_category("fruit");

    let mut group = c.benchmark_group("predict/tree_scaling");
    group.throughput(Throughput::Elements(1));

    for &n_trees in &TREE_COUNTS {
        let engine = trained_engine(&corpus, n_trees);
        group.bench_with_input(BenchmarkId::new("trees", n_trees), &engine, |b, engine| {
            b.iter(|| black_box(engine.predict(black_box(&request))))
        });
    }

    group.finish();
}

fn bench_train_small(c: &mut Criterion) {
    let (_dir, corpus) = bench_corpus(500);
    let config = TrainerConfig::builder()
        .n_trees(10)
        .max_depth(6)
        .build()
        .expect("valid config");

    let mut group = c.benchmark_group("train/synthetic_small");
    group.throughput(Throughput::Elements(corpus.n_records() as u64));
    group.bench_function("train", |b| {
        b.iter(|| {
            let mut engine = PredictionEngine::new();
            black_box(
                engine
                    .train(black_box(&corpus), &config)
                    .expect("training succeeds"),
            )
        })
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_predict_tree_scaling, bench_train_small
}
criterion_main!(benches);
