use super::error::AggregatorError;
use super::observer::{ObserverHandle, ObserverSet};
use super::stats::{AggregateStats, RunningStats};
use crate::domain::error::panic_message;
use parking_lot::{Mutex, RwLock};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::warn;

/// Tracks count, min, max, average and last value of an unbounded sequence
/// and notifies observers after every accepted value.
///
/// One lock guards the aggregates, so readers never see a half-applied
/// append. Observers run synchronously on the appending thread after that
/// lock has been released; a panicking observer is logged and skipped.
#[derive(Default)]
pub struct StreamingAggregator {
    stats: Mutex<RunningStats>,
    observers: RwLock<ObserverSet>,
}

impl StreamingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value and notify every observer.
    ///
    /// NaN and infinities are rejected and leave the aggregates untouched.
    pub fn append(&self, value: impl Into<f64>) -> Result<(), AggregatorError> {
        let value = value.into();
        if !value.is_finite() {
            return Err(AggregatorError::NonFinite { value });
        }

        self.stats.lock().push(value);
        self.notify_observers();
        Ok(())
    }

    /// Reset to the empty state. Observers are not notified.
    pub fn clear(&self) {
        self.stats.lock().reset();
    }

    pub fn count(&self) -> u64 {
        self.stats.lock().count()
    }

    pub fn min(&self) -> Option<f64> {
        self.stats.lock().min()
    }

    pub fn max(&self) -> Option<f64> {
        self.stats.lock().max()
    }

    pub fn average(&self) -> Option<f64> {
        self.stats.lock().average()
    }

    pub fn last(&self) -> Option<f64> {
        self.stats.lock().last()
    }

    /// All aggregates read under one lock acquisition.
    pub fn snapshot(&self) -> AggregateStats {
        self.stats.lock().snapshot()
    }

    pub fn register_observer<F>(&self, callback: F) -> ObserverHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.observers.write().insert(Arc::new(callback))
    }

    /// Returns `false` when the handle was not registered.
    pub fn unregister_observer(&self, handle: ObserverHandle) -> bool {
        self.observers.write().remove(handle)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().len()
    }

    fn notify_observers(&self) {
        let observers = self.observers.read().snapshot();
        for (handle, observer) in observers {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| observer())) {
                warn!(
                    observer = %handle,
                    panic = %panic_message(payload.as_ref()),
                    "Observer panicked during notification"
                );
            }
        }
    }
}
