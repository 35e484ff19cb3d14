//! Throughput of the cycle-level model.
//!
//! Measures:
//! 1. One evaluator pass (four stages)
//! 2. A full session from the origin
//! 3. A 625-point sweep on the rayon pool

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use fxdescent::pipeline::{Evaluator, QuadraticEvaluator};
use fxdescent::sweep::{grid, run_grid};
use fxdescent::{Controller, Quad, SessionConfig, Wide};

fn contractive() -> SessionConfig {
    SessionConfig::default().with_learning_rates(Quad::new(
        Wide::from_raw(128),
        Wide::from_raw(128),
        Wide::from_raw(64),
        Wide::from_raw(32),
    ))
}

fn bench_evaluator(c: &mut Criterion) {
    let config = contractive();
    let params = Quad::<i8>::new(10, -20, 30, -40).to_narrow();
    c.bench_function("evaluator_pass", |b| {
        b.iter(|| {
            let mut eval = QuadraticEvaluator::new(config.learning_rates());
            while !eval.done() {
                eval.tick(true, black_box(params));
            }
            eval.evaluation()
        })
    });
}

fn bench_session(c: &mut Criterion) {
    let config = contractive();
    let mut group = c.benchmark_group("session");
    group.bench_function("origin", |b| {
        b.iter(|| Controller::new(config).run(black_box(Quad::new(0, 0, 0, 0))))
    });
    group.bench_function("far_start_traced", |b| {
        b.iter(|| {
            Controller::new(config)
                .with_trace()
                .run(black_box(Quad::new(10, -20, 30, -40)))
        })
    });
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let config = contractive();
    let points = grid(-2, 2, 1);
    c.bench_function("sweep_625", |b| b.iter(|| run_grid(&config, black_box(&points))));
}

criterion_group!(benches, bench_evaluator, bench_session, bench_sweep);
criterion_main!(benches);
