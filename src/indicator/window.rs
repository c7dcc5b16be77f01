use std::collections::VecDeque;

/// Bounded window of the most recent prices with a running sum of exactly the
/// retained values. O(1) push.
#[derive(Debug, Clone)]
pub struct PriceWindow {
    capacity: usize,
    buffer: VecDeque<f64>,
    sum: f64,
}

impl PriceWindow {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be > 0");
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            sum: 0.0,
        }
    }

    /// Push a new value, evicting the oldest when full, and return the mean
    /// of the values now in the window.
    pub fn push(&mut self, value: f64) -> f64 {
        if self.buffer.len() == self.capacity {
            if let Some(oldest) = self.buffer.pop_front() {
                self.sum -= oldest;
            }
        }
        self.buffer.push_back(value);
        self.sum += value;
        self.sum / self.buffer.len() as f64
    }

    pub fn mean(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.sum / self.buffer.len() as f64)
        }
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.buffer.len() == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Retained values, oldest first.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.buffer.iter().copied()
    }
}
