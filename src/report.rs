//! Markdown report, JSON dump and optional scaling plots.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::profiler::BenchmarkResult;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotPaths {
    pub runtime: Option<PathBuf>,
    pub memory: Option<PathBuf>,
}

/// Results grouped per strategy, each group sorted by input size.
pub fn group_by_strategy(results: &[BenchmarkResult]) -> BTreeMap<String, Vec<BenchmarkResult>> {
    let mut by: BTreeMap<String, Vec<BenchmarkResult>> = BTreeMap::new();
    for r in results {
        by.entry(r.strategy_name.clone()).or_default().push(r.clone());
    }
    for rs in by.values_mut() {
        rs.sort_by_key(|r| r.n_ticks);
    }
    by
}

/// `1234567` -> `1,234,567`.
pub fn format_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn fmt_seconds(v: Option<f64>) -> String {
    match v {
        Some(s) => format!("{:.6}", s),
        None => "TIMEOUT".to_string(),
    }
}

fn fmt_mb(v: Option<f64>) -> String {
    match v {
        Some(mb) => format!("{:.3}", mb),
        None => "-".to_string(),
    }
}

fn fmt_signals(v: Option<usize>) -> String {
    v.map(format_thousands).unwrap_or_else(|| "-".to_string())
}

pub fn results_table(results: &[BenchmarkResult]) -> String {
    let mut rows: Vec<&BenchmarkResult> = results.iter().collect();
    rows.sort_by(|a, b| {
        a.strategy_name
            .cmp(&b.strategy_name)
            .then(a.n_ticks.cmp(&b.n_ticks))
    });

    let mut out = String::from(
        "| Strategy | # Ticks | Runtime (s) | Peak Memory (MB) | Signals |\n|---|---:|---:|---:|---:|\n",
    );
    for r in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            r.strategy_name,
            format_thousands(r.n_ticks),
            fmt_seconds(r.seconds),
            fmt_mb(r.peak_memory_mb),
            fmt_signals(r.signal_count)
        );
    }
    out
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plots_section(plots: &PlotPaths) -> String {
    if plots.runtime.is_none() && plots.memory.is_none() {
        return "Plots were not generated (build with `--features plots` to enable them).\n"
            .to_string();
    }
    let mut out = String::new();
    if let Some(p) = &plots.runtime {
        let _ = writeln!(out, "### Runtime vs input size\n![Runtime vs input]({})\n", file_name(p));
    }
    if let Some(p) = &plots.memory {
        let _ = writeln!(out, "### Memory vs input size\n![Memory vs input]({})\n", file_name(p));
    }
    out
}

pub fn render_report(results: &[BenchmarkResult], plots: &PlotPaths, extra_notes: &str) -> String {
    let timeouts: Vec<String> = results
        .iter()
        .filter(|r| r.timed_out())
        .map(|r| format!("{} at {} ticks", r.strategy_name, format_thousands(r.n_ticks)))
        .collect();
    let timeout_line = if timeouts.is_empty() {
        "No run exceeded the time limit.".to_string()
    } else {
        format!("Runs that exceeded the time limit: {}.", timeouts.join("; "))
    };

    format!(
        r#"# Runtime & Space Complexity of Streaming Moving-Average Signals

## Strategies
- **NaiveMovingAverage**: stores every price and re-sums the whole history on each tick
- **WindowedMovingAverage**: bounded buffer of the last k prices plus a running sum
- **CumulativeMovingAverage**: running sum and count; same mean as the naive strategy

All three emit `BUY` when the price is above the average, `SELL` when below,
and nothing on an exact tie.

## Complexity (theoretical)
| Strategy | Time per tick | Time for n ticks | Space per symbol |
|---|---|---|---|
| NaiveMovingAverage | O(n) | O(n^2) | O(n) |
| WindowedMovingAverage (k) | O(1) | O(n) | O(k) |
| CumulativeMovingAverage | O(1) | O(n) | O(1) |

Loading the CSV eagerly is O(n) time and O(n) space.

## Benchmark results
{table}
{timeout_line}

## Scaling plots
{plots}
## Comparison
- The naive strategy grows quadratically because every tick rescans a longer
  history; at large n it is expected to hit the time limit (`TIMEOUT`).
- The windowed strategy does constant work per tick and keeps only the last k
  prices, so both runtime per tick and memory stay flat as n grows.
- The cumulative strategy produces the naive strategy's signals with constant
  time and memory per tick, trading the full history for incremental state.

## Profiling notes
See `profiles/` for per-trial timings (seconds, ticks/sec, ns/tick). Runs
that exceeded the time limit are not profiled and their memory is not measured.

{extra_notes}
"#,
        table = results_table(results),
        timeout_line = timeout_line,
        plots = plots_section(plots),
        extra_notes = extra_notes,
    )
}

pub fn write_report(
    results: &[BenchmarkResult],
    plots: &PlotPaths,
    out_path: &Path,
    extra_notes: &str,
) -> Result<PathBuf> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(out_path, render_report(results, plots, extra_notes))?;
    tracing::info!(path = %out_path.display(), rows = results.len(), "Wrote report");
    Ok(out_path.to_path_buf())
}

pub fn write_results_json(results: &[BenchmarkResult], out_path: &Path) -> Result<PathBuf> {
    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(results)?;
    std::fs::write(out_path, json)?;
    Ok(out_path.to_path_buf())
}

/// (strategy, [(n, y)]) pairs with missing or non-positive values dropped.
pub fn plot_series(
    results: &[BenchmarkResult],
    value: impl Fn(&BenchmarkResult) -> Option<f64>,
) -> Vec<(String, Vec<(f64, f64)>)> {
    group_by_strategy(results)
        .into_iter()
        .map(|(name, rs)| {
            let points: Vec<(f64, f64)> = rs
                .iter()
                .filter_map(|r| value(r).map(|y| (r.n_ticks as f64, y)))
                .filter(|&(_, y)| y > 0.0)
                .collect();
            (name, points)
        })
        .filter(|(_, points)| !points.is_empty())
        .collect()
}

#[cfg(feature = "plots")]
pub fn make_plots(results: &[BenchmarkResult], out_dir: &Path) -> Result<PlotPaths> {
    std::fs::create_dir_all(out_dir)?;

    let runtime = plot_series(results, |r| r.seconds);
    let memory = plot_series(results, |r| r.peak_memory_mb);

    let mut paths = PlotPaths::default();
    if !runtime.is_empty() {
        let path = out_dir.join("runtime_vs_input.png");
        chart::draw_log_log(
            &path,
            "Runtime scaling by strategy (timeouts omitted)",
            "Runtime (seconds, log scale)",
            &runtime,
        )?;
        paths.runtime = Some(path);
    }
    if !memory.is_empty() {
        let path = out_dir.join("memory_vs_input.png");
        chart::draw_log_log(
            &path,
            "Memory scaling by strategy (peak heap)",
            "Peak memory (MB, log scale)",
            &memory,
        )?;
        paths.memory = Some(path);
    }
    Ok(paths)
}

#[cfg(not(feature = "plots"))]
pub fn make_plots(_results: &[BenchmarkResult], _out_dir: &Path) -> Result<PlotPaths> {
    tracing::debug!("Plotting disabled; build with --features plots");
    Ok(PlotPaths::default())
}

#[cfg(feature = "plots")]
mod chart {
    use std::path::Path;

    use plotters::prelude::*;

    use crate::error::{AppError, Result};

    fn plot_err<E: std::fmt::Display>(e: E) -> AppError {
        AppError::Plot(e.to_string())
    }

    fn padded_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
        let (lo, hi) = values.fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v), hi.max(v)));
        (lo * 0.8, hi * 1.25)
    }

    pub(super) fn draw_log_log(
        path: &Path,
        title: &str,
        y_desc: &str,
        series: &[(String, Vec<(f64, f64)>)],
    ) -> Result<()> {
        let (x_min, x_max) = padded_bounds(series.iter().flat_map(|(_, p)| p.iter().map(|&(x, _)| x)));
        let (y_min, y_max) = padded_bounds(series.iter().flat_map(|(_, p)| p.iter().map(|&(_, y)| y)));

        let root = BitMapBackend::new(path, (960, 640)).into_drawing_area();
        root.fill(&WHITE).map_err(plot_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 22))
            .margin(16)
            .x_label_area_size(44)
            .y_label_area_size(72)
            .build_cartesian_2d((x_min..x_max).log_scale(), (y_min..y_max).log_scale())
            .map_err(plot_err)?;

        chart
            .configure_mesh()
            .x_desc("Input size (ticks, log scale)")
            .y_desc(y_desc)
            .draw()
            .map_err(plot_err)?;

        for (idx, (name, points)) in series.iter().enumerate() {
            let color = Palette99::pick(idx).to_rgba();
            chart
                .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                .map_err(plot_err)?
                .label(name.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            chart
                .draw_series(points.iter().map(|&(x, y)| Circle::new((x, y), 3, color.filled())))
                .map_err(plot_err)?;
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(plot_err)?;

        root.present().map_err(plot_err)?;
        tracing::info!(path = %path.display(), "Wrote plot");
        Ok(())
    }
}
