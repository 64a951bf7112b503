use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use math_linsolve::{ExecutionContext, LinsolveConfig, Solver, StrategyId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn dominant_system(n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(n as u64);
    let mut a: Vec<f64> = (0..n * n).map(|_| rng.random_range(-1.0..1.0)).collect();
    for i in 0..n {
        a[i * n + i] = n as f64;
    }
    let b = (0..n).map(|_| rng.random_range(-1.0..1.0)).collect();
    (a, b)
}

fn bench_strategies(c: &mut Criterion) {
    let solver = Solver::default();
    let mut group = c.benchmark_group("strategy");
    group.sample_size(20);

    for n in [16, 64, 256] {
        let (a, b) = dominant_system(n);
        for id in StrategyId::ALL {
            group.bench_with_input(BenchmarkId::new(id.name(), n), &n, |bench, &n| {
                bench.iter(|| solver.solve_with(id, black_box(&a), black_box(&b), n))
            });
        }
    }
    group.finish();
}

fn bench_threshold(c: &mut Criterion) {
    // Sizes around the default threshold, to check where the crossover sits
    let solver = Solver::default();
    let mut group = c.benchmark_group("threshold");
    group.sample_size(10);

    for n in [200, 300, 400] {
        let (a, b) = dominant_system(n);
        for id in [StrategyId::DirectSmall, StrategyId::DirectLargeDense] {
            group.bench_with_input(BenchmarkId::new(id.name(), n), &n, |bench, &n| {
                bench.iter(|| solver.solve_with(id, black_box(&a), black_box(&b), n))
            });
        }
    }
    group.finish();
}

#[cfg(feature = "rayon")]
fn bench_threads(c: &mut Criterion) {
    let n = 400;
    let (a, b) = dominant_system(n);
    let mut group = c.benchmark_group("dense_workers");
    group.sample_size(10);

    for workers in [1, 2, 4] {
        let ctx = match ExecutionContext::threads(workers) {
            Ok(ctx) => ctx,
            Err(_) => continue,
        };
        let solver = match Solver::with_context(LinsolveConfig::default(), ctx) {
            Ok(solver) => solver,
            Err(_) => continue,
        };
        group.bench_with_input(BenchmarkId::from_parameter(workers), &n, |bench, &n| {
            bench.iter(|| solver.solve_with(StrategyId::DirectLargeDense, black_box(&a), black_box(&b), n))
        });
    }
    group.finish();
}

#[cfg(not(feature = "rayon"))]
fn bench_threads(c: &mut Criterion) {
    let n = 400;
    let (a, b) = dominant_system(n);
    let solver = Solver::with_context(LinsolveConfig::default(), ExecutionContext::serial())
        .expect("default configuration is valid");
    c.bench_function("dense_workers/serial", |bench| {
        bench.iter(|| solver.solve_with(StrategyId::DirectLargeDense, black_box(&a), black_box(&b), n))
    });
}

criterion_group!(benches, bench_strategies, bench_threshold, bench_threads);
criterion_main!(benches);
