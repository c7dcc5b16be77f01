use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tick_scaling::model::tick::Tick;
use tick_scaling::profiler::run_strategy;
use tick_scaling::strategy::StrategyKind;

fn ticks(n: usize) -> Vec<Tick> {
    let t0 = NaiveDate::from_ymd_opt(2026, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 30, 0))
        .unwrap();
    let mut price = 100.0;
    (0..n)
        .map(|i| {
            price += ((i % 7) as f64 - 3.0) * 0.01;
            Tick::new(t0 + Duration::minutes(i as i64), "ABC", price)
        })
        .collect()
}

fn benchmark_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_signals");
    for n in [1_000usize, 10_000] {
        let data = ticks(n);
        for kind in StrategyKind::all(10) {
            group.bench_with_input(BenchmarkId::new(kind.label(), n), &data, |b, data| {
                b.iter(|| {
                    let mut strategy = kind.build().unwrap();
                    run_strategy(&mut strategy, black_box(data))
                })
            });
        }
    }
    group.finish();
}

criterion_group!(benches, benchmark_strategies);
criterion_main!(benches);
