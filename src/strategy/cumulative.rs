use std::collections::HashMap;

use crate::indicator::running_mean::RunningMean;
use crate::model::signal::Signal;
use crate::model::tick::Tick;
use crate::strategy::Strategy;

/// Same mean as [`NaiveMovingAverage`](crate::strategy::naive::NaiveMovingAverage)
/// (average of all history) computed incrementally from a running sum and
/// count. This is a cumulative average, not a windowed one.
///
/// Per tick: O(1). Memory: O(1) per symbol.
#[derive(Debug, Default)]
pub struct CumulativeMovingAverage {
    mean_by_symbol: HashMap<String, RunningMean>,
}

impl CumulativeMovingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mean(&self, symbol: &str) -> Option<f64> {
        self.mean_by_symbol.get(symbol).and_then(RunningMean::mean)
    }

    pub fn count(&self, symbol: &str) -> Option<u64> {
        self.mean_by_symbol.get(symbol).map(RunningMean::count)
    }
}

impl Strategy for CumulativeMovingAverage {
    fn generate_signals(&mut self, tick: &Tick) -> Vec<Signal> {
        let avg = self
            .mean_by_symbol
            .entry(tick.symbol().to_string())
            .or_default()
            .push(tick.price());
        Signal::from_price_vs_avg(tick.price(), avg)
    }

    fn tracked_symbols(&self) -> usize {
        self.mean_by_symbol.len()
    }

    fn label(&self) -> String {
        "CumulativeMovingAverage".to_string()
    }
}
