use chrono::NaiveDateTime;
use serde::Serialize;

/// One market observation. Immutable once built; ingestion is responsible for
/// validating the fields before calling [`Tick::new`].
#[derive(Debug, Clone, PartialEq, PartialOrd, Serialize)]
pub struct Tick {
    timestamp: NaiveDateTime,
    symbol: String,
    price: f64,
}

impl Tick {
    pub fn new(timestamp: NaiveDateTime, symbol: impl Into<String>, price: f64) -> Self {
        Self {
            timestamp,
            symbol: symbol.into(),
            price,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn price(&self) -> f64 {
        self.price
    }
}
