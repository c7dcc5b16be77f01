use chrono::{Duration, NaiveDate};
use tick_scaling::alloc::{self, TrackingAllocator};
use tick_scaling::error::Result;
use tick_scaling::model::tick::Tick;
use tick_scaling::profiler::peak_memory;
use tick_scaling::strategy::cumulative::CumulativeMovingAverage;
use tick_scaling::strategy::naive::NaiveMovingAverage;
use tick_scaling::strategy::windowed::WindowedMovingAverage;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

fn ticks(n: usize) -> Vec<Tick> {
    let t0 = NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    (0..n)
        .map(|i| Tick::new(t0 + Duration::minutes(i as i64), "ABC", 100.0 + (i % 13) as f64))
        .collect()
}

// Counters are process-wide, so everything lives in one test to keep other
// test threads from allocating during a measurement.
#[test]
fn naive_history_dominates_peak_memory() {
    let data = ticks(50_000);
    assert!(alloc::is_active());

    let (_, grown) = alloc::measure(|| std::hint::black_box(vec![0u8; 1 << 20]));
    assert!(grown.unwrap() >= 1 << 20);

    let naive = || -> Result<NaiveMovingAverage> { Ok(NaiveMovingAverage::new()) };
    let windowed = || WindowedMovingAverage::new(10);
    let cumulative = || -> Result<CumulativeMovingAverage> { Ok(CumulativeMovingAverage::new()) };

    let naive_mb = peak_memory(&naive, &data).unwrap().unwrap();
    let windowed_mb = peak_memory(&windowed, &data).unwrap().unwrap();
    let cumulative_mb = peak_memory(&cumulative, &data).unwrap().unwrap();

    // 50k retained f64 prices is at least ~0.38 MB.
    assert!(naive_mb >= 50_000.0 * 8.0 / (1024.0 * 1024.0));
    assert!(naive_mb > windowed_mb * 10.0);
    assert!(naive_mb > cumulative_mb * 10.0);
}
