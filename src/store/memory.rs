use super::{MeasurementStore, SaveFuture, StoreError};
use parking_lot::Mutex;
use rand::Rng;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory store that keeps every saved measurement in arrival order.
///
/// Latency and a failure rate can be injected to stand in for a slow or
/// flaky backend. It also records how many saves overlapped, which the
/// buffer promises is never more than one.
pub struct MemoryStore<M> {
    saved: Mutex<Vec<M>>,
    latency: Duration,
    failure_rate: f64,
    attempts: AtomicU64,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl<M> Default for MemoryStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> MemoryStore<M> {
    pub fn new() -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            latency: Duration::ZERO,
            failure_rate: 0.0,
            attempts: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fraction of saves (0.0 to 1.0) that fail with `StoreError::Unavailable`.
    #[must_use]
    pub fn with_failure_rate(mut self, failure_rate: f64) -> Self {
        self.failure_rate = failure_rate.clamp(0.0, 1.0);
        self
    }

    pub fn len(&self) -> usize {
        self.saved.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Relaxed)
    }
}

impl<M: Clone> MemoryStore<M> {
    pub fn saved(&self) -> Vec<M> {
        self.saved.lock().clone()
    }
}

impl<M> MeasurementStore<M> for MemoryStore<M>
where
    M: Clone + Send + Sync,
{
    fn save<'a>(&'a self, measurement: &'a M) -> SaveFuture<'a> {
        Box::pin(async move {
            self.attempts.fetch_add(1, Ordering::Relaxed);
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

            let fail = self.failure_rate > 0.0 && rand::rng().random_bool(self.failure_rate);

            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }

            let result = if fail {
                Err(StoreError::Unavailable("injected failure".to_string()))
            } else {
                self.saved.lock().push(measurement.clone());
                Ok(())
            };

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reading;

    #[tokio::test]
    async fn test_saves_in_order() {
        let store = MemoryStore::new();
        for value in [1.0, 2.0, 3.0] {
            store.save(&Reading::new(value)).await.unwrap();
        }

        let values: Vec<f64> = store.saved().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(store.attempts(), 3);
        assert_eq!(store.peak_in_flight(), 1);
    }

    #[tokio::test]
    async fn test_full_failure_rate_never_saves() {
        let store = MemoryStore::new().with_failure_rate(1.0);
        let result = store.save(&Reading::new(1.0)).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.is_empty());
        assert_eq!(store.attempts(), 1);
    }

    #[test]
    fn test_failure_rate_is_clamped() {
        let store: MemoryStore<Reading> = MemoryStore::new().with_failure_rate(7.5);
        assert_eq!(store.failure_rate, 1.0);
    }
}
