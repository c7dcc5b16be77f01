/// Cumulative mean kept as a running sum and count; no values are retained.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningMean {
    sum: f64,
    count: u64,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold in a value and return the mean of everything seen so far.
    pub fn push(&mut self, value: f64) -> f64 {
        self.sum += value;
        self.count += 1;
        self.sum / self.count as f64
    }

    pub fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }

    pub fn sum(&self) -> f64 {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_mean_of_all_values() {
        let mut m = RunningMean::new();
        assert_eq!(m.mean(), None);
        assert!((m.push(10.0) - 10.0).abs() < f64::EPSILON);
        assert!((m.push(20.0) - 15.0).abs() < f64::EPSILON);
        assert!((m.push(30.0) - 20.0).abs() < f64::EPSILON);
        assert_eq!(m.count(), 3);
        assert!((m.sum() - 60.0).abs() < f64::EPSILON);
    }
}
