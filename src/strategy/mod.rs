pub mod cumulative;
pub mod naive;
pub mod windowed;

use crate::error::Result;
use crate::model::signal::Signal;
use crate::model::tick::Tick;

use cumulative::CumulativeMovingAverage;
use naive::NaiveMovingAverage;
use windowed::WindowedMovingAverage;

/// Stateful, order-dependent signal generation: one tick in, zero or more
/// signals out. State is keyed by symbol and owned by the instance.
pub trait Strategy {
    fn generate_signals(&mut self, tick: &Tick) -> Vec<Signal>;

    /// Number of symbols that have per-symbol state.
    fn tracked_symbols(&self) -> usize;

    fn label(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    Naive,
    Windowed { window: usize },
    Cumulative,
}

impl StrategyKind {
    /// The three variants in report order.
    pub fn all(window: usize) -> [StrategyKind; 3] {
        [
            StrategyKind::Naive,
            StrategyKind::Windowed { window },
            StrategyKind::Cumulative,
        ]
    }

    pub fn label(&self) -> String {
        match self {
            Self::Naive => "NaiveMovingAverage".to_string(),
            Self::Windowed { window } => format!("WindowedMovingAverage_k={}", window),
            Self::Cumulative => "CumulativeMovingAverage".to_string(),
        }
    }

    pub fn build(&self) -> Result<StrategyRuntime> {
        Ok(match self {
            Self::Naive => StrategyRuntime::Naive(NaiveMovingAverage::new()),
            Self::Windowed { window } => {
                StrategyRuntime::Windowed(WindowedMovingAverage::new(*window)?)
            }
            Self::Cumulative => StrategyRuntime::Cumulative(CumulativeMovingAverage::new()),
        })
    }
}

#[derive(Debug)]
pub enum StrategyRuntime {
    Naive(NaiveMovingAverage),
    Windowed(WindowedMovingAverage),
    Cumulative(CumulativeMovingAverage),
}

impl Strategy for StrategyRuntime {
    fn generate_signals(&mut self, tick: &Tick) -> Vec<Signal> {
        match self {
            Self::Naive(s) => s.generate_signals(tick),
            Self::Windowed(s) => s.generate_signals(tick),
            Self::Cumulative(s) => s.generate_signals(tick),
        }
    }

    fn tracked_symbols(&self) -> usize {
        match self {
            Self::Naive(s) => s.tracked_symbols(),
            Self::Windowed(s) => s.tracked_symbols(),
            Self::Cumulative(s) => s.tracked_symbols(),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Naive(s) => s.label(),
            Self::Windowed(s) => s.label(),
            Self::Cumulative(s) => s.label(),
        }
    }
}
