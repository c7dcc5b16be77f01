//! Runtime and memory measurement for strategies.
//!
//! Every trial builds a fresh strategy from its factory so no state leaks
//! between trials. The time limit is checked after a trial completes; a
//! running trial is never interrupted.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::alloc;
use crate::error::Result;
use crate::model::tick::Tick;
use crate::strategy::{Strategy, StrategyKind, StrategyRuntime};

pub type StrategyFactory = Box<dyn Fn() -> Result<StrategyRuntime>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkResult {
    pub strategy_name: String,
    pub n_ticks: usize,
    /// `None` means the run exceeded the time limit.
    pub seconds: Option<f64>,
    /// `None` means memory was not measured.
    pub peak_memory_mb: Option<f64>,
    pub signal_count: Option<usize>,
}

impl BenchmarkResult {
    pub fn timed_out(&self) -> bool {
        self.seconds.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimingOutcome {
    Completed {
        best: Duration,
        signals: usize,
        /// Symbols tracked by the strategy at the end of the last trial.
        symbols: usize,
        trials: Vec<Duration>,
    },
    Exceeded {
        elapsed: Duration,
        limit: Duration,
    },
}

impl TimingOutcome {
    pub fn seconds(&self) -> Option<f64> {
        match self {
            Self::Completed { best, .. } => Some(best.as_secs_f64()),
            Self::Exceeded { .. } => None,
        }
    }

    pub fn signals(&self) -> Option<usize> {
        match self {
            Self::Completed { signals, .. } => Some(*signals),
            Self::Exceeded { .. } => None,
        }
    }
}

/// Feed every tick to `strategy` in order and return how many signals it emitted.
pub fn run_strategy<'a, S, I>(strategy: &mut S, ticks: I) -> usize
where
    S: Strategy + ?Sized,
    I: IntoIterator<Item = &'a Tick>,
{
    ticks
        .into_iter()
        .map(|tick| strategy.generate_signals(tick).len())
        .sum()
}

/// Best-of-`repeats` wall-clock time. Returns [`TimingOutcome::Exceeded`] as
/// soon as one trial runs longer than `time_limit`.
pub fn time_strategy<F, S>(
    factory: &F,
    ticks: &[Tick],
    repeats: usize,
    time_limit: Option<Duration>,
) -> Result<TimingOutcome>
where
    F: Fn() -> Result<S> + ?Sized,
    S: Strategy,
{
    let mut trials = Vec::with_capacity(repeats.max(1));
    let mut signals = 0;
    let mut symbols = 0;

    for _ in 0..repeats.max(1) {
        let mut strategy = factory()?;
        let started = Instant::now();
        signals = run_strategy(&mut strategy, ticks);
        let elapsed = started.elapsed();
        symbols = strategy.tracked_symbols();
        drop(strategy);

        if let Some(limit) = time_limit {
            if elapsed > limit {
                return Ok(TimingOutcome::Exceeded { elapsed, limit });
            }
        }
        trials.push(elapsed);
    }

    let best = trials.iter().copied().min().unwrap_or_default();
    Ok(TimingOutcome::Completed {
        best,
        signals,
        symbols,
        trials,
    })
}

fn bytes_to_mb(bytes: usize) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

/// Peak heap growth (MB) of one full run, including the strategy's own
/// allocations. `None` when no tracking allocator is installed.
pub fn peak_memory<F, S>(factory: &F, ticks: &[Tick]) -> Result<Option<f64>>
where
    F: Fn() -> Result<S> + ?Sized,
    S: Strategy,
{
    let (run, peak) = alloc::measure(|| -> Result<usize> {
        let mut strategy = factory()?;
        Ok(run_strategy(&mut strategy, ticks))
    });
    run?;
    Ok(peak.map(bytes_to_mb))
}

/// Write a plain-text profile of the given trial timings: elapsed time,
/// throughput and per-tick cost for each.
pub fn write_profile(
    label: &str,
    n_ticks: usize,
    trials: &[Duration],
    signals: usize,
    symbols: usize,
    out_path: &Path,
) -> Result<PathBuf> {
    let mut out = String::new();
    let _ = writeln!(out, "strategy: {}", label);
    let _ = writeln!(out, "ticks:    {}", n_ticks);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:>5} {:>14} {:>16} {:>14} {:>10} {:>8}",
        "trial", "seconds", "ticks/sec", "ns/tick", "signals", "symbols"
    );

    for (i, elapsed) in trials.iter().enumerate() {
        let secs = elapsed.as_secs_f64();
        let per_tick_ns = if n_ticks == 0 {
            0.0
        } else {
            elapsed.as_nanos() as f64 / n_ticks as f64
        };
        let ticks_per_sec = if secs > 0.0 { n_ticks as f64 / secs } else { 0.0 };
        let _ = writeln!(
            out,
            "{:>5} {:>14.6} {:>16.0} {:>14.1} {:>10} {:>8}",
            i + 1,
            secs,
            ticks_per_sec,
            per_tick_ns,
            signals,
            symbols
        );
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out_path, out)?;
    Ok(out_path.to_path_buf())
}

/// Time `repeats` trials without a limit and write their profile.
pub fn profile_trials<F, S>(
    factory: &F,
    ticks: &[Tick],
    repeats: usize,
    out_path: &Path,
) -> Result<PathBuf>
where
    F: Fn() -> Result<S> + ?Sized,
    S: Strategy,
{
    let label = factory()?.label();
    match time_strategy(factory, ticks, repeats, None)? {
        TimingOutcome::Completed {
            signals,
            symbols,
            trials,
            ..
        } => write_profile(&label, ticks.len(), &trials, signals, symbols, out_path),
        TimingOutcome::Exceeded { .. } => unreachable!("timing without a limit always completes"),
    }
}

#[derive(Debug, Clone, Default)]
pub struct BenchOptions {
    pub repeats: usize,
    pub time_limit: Option<Duration>,
    pub measure_memory: bool,
    pub profile_dir: Option<PathBuf>,
}

/// Time each named factory over `ticks`; memory and trial profiles are only
/// collected for runs that finished within the limit.
pub fn benchmark_strategies<F, S>(
    ticks: &[Tick],
    factories: &[(String, F)],
    options: &BenchOptions,
) -> Result<Vec<BenchmarkResult>>
where
    F: Fn() -> Result<S>,
    S: Strategy,
{
    let mut results = Vec::with_capacity(factories.len());

    for (name, factory) in factories {
        let outcome = time_strategy(factory, ticks, options.repeats, options.time_limit)?;
        let finished = matches!(outcome, TimingOutcome::Completed { .. });

        match &outcome {
            TimingOutcome::Completed { best, signals, .. } => tracing::info!(
                strategy = %name,
                n_ticks = ticks.len(),
                elapsed_ms = best.as_secs_f64() * 1000.0,
                signals,
                "Benchmark finished"
            ),
            TimingOutcome::Exceeded { elapsed, limit } => tracing::warn!(
                strategy = %name,
                n_ticks = ticks.len(),
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                limit_ms = limit.as_secs_f64() * 1000.0,
                "Benchmark exceeded time limit"
            ),
        }

        let peak_memory_mb = if options.measure_memory && finished {
            peak_memory(factory, ticks)?
        } else {
            None
        };

        if let (
            Some(dir),
            TimingOutcome::Completed {
                signals,
                symbols,
                trials,
                ..
            },
        ) = (&options.profile_dir, &outcome)
        {
            let path = dir.join(format!("{}_{}.txt", name, ticks.len()));
            write_profile(name, ticks.len(), trials, *signals, *symbols, &path)?;
            tracing::debug!(path = %path.display(), "Wrote trial profile");
        }

        results.push(BenchmarkResult {
            strategy_name: name.clone(),
            n_ticks: ticks.len(),
            seconds: outcome.seconds(),
            peak_memory_mb,
            signal_count: outcome.signals(),
        });
    }

    Ok(results)
}

/// One named factory per strategy kind.
pub fn factories_for(kinds: &[StrategyKind]) -> Vec<(String, StrategyFactory)> {
    kinds
        .iter()
        .map(|kind| {
            let kind = *kind;
            let factory: StrategyFactory = Box::new(move || kind.build());
            (kind.label(), factory)
        })
        .collect()
}

/// Input sizes and repeat policy for a multi-size benchmark run.
#[derive(Debug, Clone)]
pub struct SweepPlan {
    pub sizes: Vec<usize>,
    pub repeats_small: usize,
    pub repeats_large: usize,
    /// Sizes up to and including this use `repeats_small`.
    pub repeat_threshold: usize,
    pub time_limit: Option<Duration>,
    pub measure_memory: bool,
    pub profile_dir: Option<PathBuf>,
}

impl SweepPlan {
    /// Requested sizes that fit in `available` ticks, in request order.
    pub fn sizes_within(&self, available: usize) -> Vec<usize> {
        self.sizes
            .iter()
            .copied()
            .filter(|&n| n <= available)
            .collect()
    }

    pub fn repeats_for(&self, n: usize) -> usize {
        if n <= self.repeat_threshold {
            self.repeats_small
        } else {
            self.repeats_large
        }
    }

    pub fn options_for(&self, n: usize) -> BenchOptions {
        BenchOptions {
            repeats: self.repeats_for(n),
            time_limit: self.time_limit,
            measure_memory: self.measure_memory,
            profile_dir: self.profile_dir.clone(),
        }
    }
}

/// Benchmark every factory on each prefix `ticks[..n]` of the plan's sizes.
pub fn run_sweep<F, S>(
    ticks: &[Tick],
    factories: &[(String, F)],
    plan: &SweepPlan,
) -> Result<Vec<BenchmarkResult>>
where
    F: Fn() -> Result<S>,
    S: Strategy,
{
    let sizes = plan.sizes_within(ticks.len());
    if sizes.is_empty() {
        tracing::warn!(
            available = ticks.len(),
            requested = ?plan.sizes,
            "No benchmark size fits the loaded data"
        );
    }

    let mut all = Vec::new();
    for n in sizes {
        let options = plan.options_for(n);
        tracing::info!(n_ticks = n, repeats = options.repeats, "Benchmarking input size");
        all.extend(benchmark_strategies(&ticks[..n], factories, &options)?);
    }
    Ok(all)
}
