use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use tick_scaling::alloc::TrackingAllocator;
use tick_scaling::config::{parse_sizes, Config};
use tick_scaling::ingest::{generate_synthetic_csv, load_market_data};
use tick_scaling::profiler::{factories_for, run_sweep};
use tick_scaling::report::{make_plots, write_report, write_results_json};
use tick_scaling::strategy::StrategyKind;

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[derive(Parser, Debug)]
#[command(name = "tick-scaling")]
#[command(about = "Compare runtime and memory scaling of moving-average signal strategies", long_about = None)]
struct Cli {
    /// Path to a CSV with timestamp,symbol,price columns
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Window size for the windowed strategy
    #[arg(long)]
    window: Option<usize>,

    /// Output directory for the report, plots and profiles
    #[arg(long)]
    out: Option<PathBuf>,

    /// Per-trial time limit in seconds before a run is reported as TIMEOUT
    #[arg(long)]
    time_limit: Option<f64>,

    /// Comma-separated input sizes, e.g. "1k,10k,100k"
    #[arg(long)]
    sizes: Option<String>,

    /// TOML config file (defaults to config/default.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip peak-memory measurement
    #[arg(long)]
    no_memory: bool,
}

fn apply_overrides(config: &mut Config, cli: &Cli) -> Result<()> {
    if let Some(csv) = &cli.csv {
        config.data.csv_path = csv.clone();
    }
    if let Some(window) = cli.window {
        config.benchmark.window = window;
    }
    if let Some(out) = &cli.out {
        config.output.dir = out.clone();
    }
    if let Some(limit) = cli.time_limit {
        config.benchmark.time_limit_secs = limit;
    }
    if let Some(sizes) = &cli.sizes {
        config.benchmark.sizes = parse_sizes(sizes).context("--sizes is invalid")?;
    }
    if cli.no_memory {
        config.benchmark.measure_memory = false;
    }
    config.validate()
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(&config.logging.level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    apply_overrides(&mut config, &cli)?;
    init_tracing(&config);

    let out_dir = config.output.dir.clone();
    let mut csv_path = config.data.csv_path.clone();
    if !csv_path.exists() {
        csv_path = out_dir.join("market_data_synthetic.csv");
        tracing::warn!(
            requested = %config.data.csv_path.display(),
            synthetic = %csv_path.display(),
            "CSV not found, generating synthetic data"
        );
        generate_synthetic_csv(&csv_path, &config.data.synthetic_spec())
            .context("failed to generate synthetic CSV")?;
    }

    let load_started = Instant::now();
    let ticks = load_market_data(&csv_path)
        .with_context(|| format!("failed to load {}", csv_path.display()))?;
    tracing::info!(
        count = ticks.len(),
        elapsed_ms = load_started.elapsed().as_secs_f64() * 1000.0,
        "Ticks ready"
    );

    let factories = factories_for(&StrategyKind::all(config.benchmark.window));
    let profile_dir = out_dir.join("profiles");
    let plan = config.benchmark.sweep_plan(Some(profile_dir.clone()))?;
    let results = run_sweep(&ticks, &factories, &plan)?;

    let plot_dir = out_dir.join("plots");
    let plots = make_plots(&results, &plot_dir)?;
    let report_path = write_report(&results, &plots, &out_dir.join("complexity_report.md"), "")?;
    let json_path = write_results_json(&results, &out_dir.join("results.json"))?;

    println!("Report written to: {}", report_path.display());
    println!("Results written to: {}", json_path.display());
    if plots.runtime.is_some() || plots.memory.is_some() {
        println!("Plots written to: {}", plot_dir.display());
    }
    if plan.profile_dir.is_some() {
        println!("Trial profiles written to: {}", profile_dir.display());
    }
    Ok(())
}
