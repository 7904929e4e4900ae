use serde::{Deserialize, Serialize};

/// Running aggregates, updated in O(1) per value.
///
/// `min` and `max` are seeded from the first value, so sequences that are
/// entirely positive or entirely negative are handled like any other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningStats {
    count: u64,
    sum: f64,
    /// Incremental mean, used once `sum` has overflowed.
    mean: f64,
    extremes: Option<(f64, f64)>,
    last: Option<f64>,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller guarantees `value` is finite.
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        // Convex combination of two finite values, so it cannot overflow.
        let n = self.count as f64;
        self.mean = self.mean - self.mean / n + value / n;
        self.extremes = Some(match self.extremes {
            Some((min, max)) => (min.min(value), max.max(value)),
            None => (value, value),
        });
        self.last = Some(value);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn min(&self) -> Option<f64> {
        self.extremes.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<f64> {
        self.extremes.map(|(_, max)| max)
    }

    /// `None` until the first value arrives.
    pub fn average(&self) -> Option<f64> {
        let (min, max) = self.extremes?;
        let average = if self.sum.is_finite() {
            self.sum / self.count as f64
        } else {
            self.mean
        };
        Some(average.clamp(min, max))
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    pub fn snapshot(&self) -> AggregateStats {
        AggregateStats {
            count: self.count,
            min: self.min(),
            max: self.max(),
            average: self.average(),
            last: self.last,
        }
    }
}

/// Consistent copy of the aggregates at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub count: u64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub average: Option<f64>,
    pub last: Option<f64>,
}

impl AggregateStats {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
