use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::ingest::SyntheticSpec;
use crate::profiler::SweepPlan;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub benchmark: BenchmarkConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub csv_path: PathBuf,
    pub synthetic_ticks: usize,
    pub synthetic_seed: u64,
    pub synthetic_symbol: String,
    pub synthetic_start_price: f64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("market_data.csv"),
            synthetic_ticks: 100_000,
            synthetic_seed: 42,
            synthetic_symbol: "ABC".to_string(),
            synthetic_start_price: 100.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub window: usize,
    pub time_limit_secs: f64,
    pub sizes: Vec<usize>,
    pub repeats_small: usize,
    pub repeats_large: usize,
    pub repeat_threshold: usize,
    pub measure_memory: bool,
    pub write_profiles: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            window: 10,
            time_limit_secs: 5.0,
            sizes: vec![1_000, 10_000, 100_000],
            repeats_small: 3,
            repeats_large: 1,
            repeat_threshold: 10_000,
            measure_memory: true,
            write_profiles: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Parse a comma-separated size list such as `"1000,10k,1e5,1m"`.
pub fn parse_sizes(s: &str) -> Result<Vec<usize>> {
    let mut out = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let lower = part.to_ascii_lowercase();
        let (num, mult) = if let Some(n) = lower.strip_suffix('k') {
            (n, 1_000.0)
        } else if let Some(n) = lower.strip_suffix('m') {
            (n, 1_000_000.0)
        } else {
            (lower.as_str(), 1.0)
        };
        let value: f64 = num
            .replace('_', "")
            .parse()
            .with_context(|| format!("invalid size '{}'", part))?;
        let n = value * mult;
        if !n.is_finite() || n < 1.0 || n.fract() != 0.0 {
            bail!("invalid size '{}': must be a positive whole number", part);
        }
        out.push(n as usize);
    }
    if out.is_empty() {
        bail!("size list '{}' is empty", s);
    }
    Ok(out)
}

impl BenchmarkConfig {
    pub fn time_limit(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.time_limit_secs).with_context(|| {
            format!(
                "benchmark.time_limit_secs {} is not a representable duration",
                self.time_limit_secs
            )
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            bail!("benchmark.window must be >= 1");
        }
        if !self.time_limit_secs.is_finite() || self.time_limit_secs <= 0.0 {
            bail!(
                "benchmark.time_limit_secs must be a positive number, got {}",
                self.time_limit_secs
            );
        }
        self.time_limit()?;
        if self.sizes.is_empty() || self.sizes.iter().any(|&n| n == 0) {
            bail!("benchmark.sizes must be a non-empty list of positive sizes");
        }
        if self.repeats_small == 0 || self.repeats_large == 0 {
            bail!("benchmark.repeats_small and benchmark.repeats_large must be >= 1");
        }
        Ok(())
    }

    pub fn sweep_plan(&self, profile_dir: Option<PathBuf>) -> Result<SweepPlan> {
        Ok(SweepPlan {
            sizes: self.sizes.clone(),
            repeats_small: self.repeats_small,
            repeats_large: self.repeats_large,
            repeat_threshold: self.repeat_threshold,
            time_limit: Some(self.time_limit()?),
            measure_memory: self.measure_memory,
            profile_dir: if self.write_profiles { profile_dir } else { None },
        })
    }
}

impl DataConfig {
    pub fn synthetic_spec(&self) -> SyntheticSpec {
        SyntheticSpec {
            n: self.synthetic_ticks,
            symbol: self.synthetic_symbol.clone(),
            start_price: self.synthetic_start_price,
            seed: self.synthetic_seed,
            ..SyntheticSpec::default()
        }
    }
}

impl Config {
    /// Load `.env`, then the TOML file. An explicitly named file must exist;
    /// a missing default file falls back to built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let (config_path, required) = match path {
            Some(p) => (p, true),
            None => (Path::new(DEFAULT_CONFIG_PATH), false),
        };

        let config = if config_path.exists() || required {
            let config_str = std::fs::read_to_string(config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            Self::from_toml(&config_str)
                .with_context(|| format!("failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.benchmark
            .validate()
            .context("benchmark section is invalid")?;
        if self.data.synthetic_ticks == 0 {
            bail!("data.synthetic_ticks must be >= 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[data]
csv_path = "ticks.csv"
synthetic_ticks = 5000
synthetic_seed = 7
synthetic_symbol = "XYZ"
synthetic_start_price = 50.0

[benchmark]
window = 20
time_limit_secs = 2.5
sizes = [100, 1000]
repeats_small = 5
repeats_large = 2
repeat_threshold = 500
measure_memory = false
write_profiles = false

[output]
dir = "out"

[logging]
level = "debug"
json = true
"#;
        let config = Config::from_toml(toml_str).unwrap();
        assert_eq!(config.data.csv_path, PathBuf::from("ticks.csv"));
        assert_eq!(config.data.synthetic_symbol, "XYZ");
        assert_eq!(config.benchmark.window, 20);
        assert_eq!(config.benchmark.sizes, vec![100, 1000]);
        assert!((config.benchmark.time_limit_secs - 2.5).abs() < f64::EPSILON);
        assert!(!config.benchmark.measure_memory);
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert!(config.logging.json);
        config.validate().unwrap();
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = Config::from_toml("[benchmark]\nwindow = 3\n").unwrap();
        assert_eq!(config.benchmark.window, 3);
        assert_eq!(config.benchmark.sizes, vec![1_000, 10_000, 100_000]);
        assert_eq!(config.benchmark.repeats_small, 3);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parse_sizes_valid() {
        assert_eq!(parse_sizes("1000").unwrap(), vec![1000]);
        assert_eq!(
            parse_sizes("1k, 10K,1e5").unwrap(),
            vec![1_000, 10_000, 100_000]
        );
        assert_eq!(parse_sizes("2m").unwrap(), vec![2_000_000]);
        assert_eq!(parse_sizes("100_000").unwrap(), vec![100_000]);
    }

    #[test]
    fn parse_sizes_rejects_invalid_inputs() {
        assert!(parse_sizes("").is_err());
        assert!(parse_sizes("0").is_err());
        assert!(parse_sizes("-5").is_err());
        assert!(parse_sizes("1.5").is_err());
        assert!(parse_sizes("abc").is_err());
    }
}
