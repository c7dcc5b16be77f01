//! CSV tick ingestion and synthetic data generation.
//!
//! Expected columns: `timestamp`, `symbol`, `price` (any order, extra columns
//! ignored). Rows are returned in file order; nothing is sorted.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{AppError, Result};
use crate::model::tick::Tick;

const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

// `%z` also takes `+0200` offsets, which RFC 3339 does not.
const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Parse an ISO-8601 / RFC 3339 timestamp or one of the common
/// `YYYY-MM-DD HH:MM[:SS]` layouts. Offsets are normalized to UTC.
pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.naive_utc());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Ok(dt.naive_utc());
        }
    }
    for fmt in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    Err(AppError::Timestamp(raw.to_string()))
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    timestamp: usize,
    symbol: usize,
    price: usize,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        match (find("timestamp"), find("symbol"), find("price")) {
            (Some(timestamp), Some(symbol), Some(price)) => Ok(Self {
                timestamp,
                symbol,
                price,
            }),
            _ => Err(AppError::MissingColumns {
                found: headers.iter().map(str::to_string).collect(),
            }),
        }
    }

    fn parse(&self, record: &csv::StringRecord, row: usize) -> Result<Tick> {
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let timestamp = parse_timestamp(field(self.timestamp))?;

        let symbol = field(self.symbol).trim();
        if symbol.is_empty() {
            return Err(AppError::EmptySymbol { row });
        }

        let raw_price = field(self.price);
        let price = raw_price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| AppError::Price {
                row,
                raw: raw_price.to_string(),
            })?;

        Ok(Tick::new(timestamp, symbol, price))
    }
}

fn open_reader(path: &Path) -> Result<(csv::Reader<BufReader<File>>, Columns)> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let columns = Columns::from_headers(reader.headers()?)?;
    Ok((reader, columns))
}

/// Load every row into memory. O(n) time and space.
pub fn load_market_data(path: impl AsRef<Path>) -> Result<Vec<Tick>> {
    let path = path.as_ref();
    let (mut reader, columns) = open_reader(path)?;

    let mut ticks = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        ticks.push(columns.parse(&record?, idx + 1)?);
    }

    tracing::info!(path = %path.display(), count = ticks.len(), "Loaded market data");
    Ok(ticks)
}

/// Single-pass streaming reader; O(1) memory beyond the current row.
pub struct TickStream {
    records: csv::StringRecordsIntoIter<BufReader<File>>,
    columns: Columns,
    row: usize,
}

impl Iterator for TickStream {
    type Item = Result<Tick>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        self.row += 1;
        Some(
            record
                .map_err(AppError::from)
                .and_then(|r| self.columns.parse(&r, self.row)),
        )
    }
}

pub fn stream_market_data(path: impl AsRef<Path>) -> Result<TickStream> {
    let (reader, columns) = open_reader(path.as_ref())?;
    Ok(TickStream {
        records: reader.into_records(),
        columns,
        row: 0,
    })
}

/// Parameters for a seeded random-walk tick series.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub n: usize,
    pub symbol: String,
    pub start_price: f64,
    pub seed: u64,
    pub start: NaiveDateTime,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            n: 100_000,
            symbol: "ABC".to_string(),
            start_price: 100.0,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2026, 1, 1)
                .and_then(|d| d.and_hms_opt(9, 30, 0))
                .unwrap_or_default(),
        }
    }
}

/// Write a one-minute random-walk series (steps drawn from U(-0.5, 0.5)).
pub fn generate_synthetic_csv(path: impl AsRef<Path>, spec: &SyntheticSpec) -> Result<PathBuf> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let mut writer = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    writer.write_record(["timestamp", "symbol", "price"])?;

    let mut price = spec.start_price;
    for i in 0..spec.n {
        let ts = spec.start + Duration::minutes(i as i64);
        price += rng.gen_range(-0.5..0.5);
        writer.write_record([
            ts.format("%Y-%m-%dT%H:%M:%S").to_string(),
            spec.symbol.clone(),
            format!("{:.4}", price),
        ])?;
    }
    writer.flush()?;

    tracing::info!(path = %path.display(), n = spec.n, seed = spec.seed, "Generated synthetic market data");
    Ok(path.to_path_buf())
}
