use std::collections::HashMap;

use crate::error::{AppError, Result};
use crate::indicator::window::PriceWindow;
use crate::model::signal::Signal;
use crate::model::tick::Tick;
use crate::strategy::Strategy;

/// Sliding-window average over the last `k` prices of each symbol.
///
/// Per tick: O(1). Memory: O(k) per symbol regardless of stream length.
#[derive(Debug)]
pub struct WindowedMovingAverage {
    window_size: usize,
    window_by_symbol: HashMap<String, PriceWindow>,
}

impl WindowedMovingAverage {
    pub fn new(window_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(AppError::Config(
                "window size must be a positive integer".to_string(),
            ));
        }
        Ok(Self {
            window_size,
            window_by_symbol: HashMap::new(),
        })
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn window(&self, symbol: &str) -> Option<&PriceWindow> {
        self.window_by_symbol.get(symbol)
    }
}

impl Strategy for WindowedMovingAverage {
    fn generate_signals(&mut self, tick: &Tick) -> Vec<Signal> {
        let window_size = self.window_size;
        let window = self
            .window_by_symbol
            .entry(tick.symbol().to_string())
            .or_insert_with(|| PriceWindow::new(window_size));

        let avg = window.push(tick.price());
        Signal::from_price_vs_avg(tick.price(), avg)
    }

    fn tracked_symbols(&self) -> usize {
        self.window_by_symbol.len()
    }

    fn label(&self) -> String {
        format!("WindowedMovingAverage_k={}", self.window_size)
    }
}
