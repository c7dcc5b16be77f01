use std::collections::HashMap;

use crate::model::signal::Signal;
use crate::model::tick::Tick;
use crate::strategy::Strategy;

/// Keeps every price per symbol and rescans the whole history on each tick.
///
/// Per tick: O(n) to re-sum the history. Over n ticks: O(n^2).
/// Memory: O(n) per symbol, never released until the strategy is dropped.
#[derive(Debug, Default)]
pub struct NaiveMovingAverage {
    prices_by_symbol: HashMap<String, Vec<f64>>,
}

impl NaiveMovingAverage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self, symbol: &str) -> Option<&[f64]> {
        self.prices_by_symbol.get(symbol).map(Vec::as_slice)
    }
}

impl Strategy for NaiveMovingAverage {
    fn generate_signals(&mut self, tick: &Tick) -> Vec<Signal> {
        let prices = self
            .prices_by_symbol
            .entry(tick.symbol().to_string())
            .or_default();
        prices.push(tick.price());

        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        Signal::from_price_vs_avg(tick.price(), avg)
    }

    fn tracked_symbols(&self) -> usize {
        self.prices_by_symbol.len()
    }

    fn label(&self) -> String {
        "NaiveMovingAverage".to_string()
    }
}
