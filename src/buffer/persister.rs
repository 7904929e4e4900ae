use super::config::BufferConfig;
use super::error::BufferError;
use super::state::{DrainPolicy, PersisterState};
use super::stats::{PersisterStats, PersisterStatsSnapshot};
use super::worker::drain_loop;
use crate::domain::MeasurementData;
use crate::store::MeasurementStore;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{Mutex as AsyncMutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Queue and lifecycle state share one lock so that admission and the
/// shutdown transition can never interleave.
pub(crate) struct Pending<M> {
    pub(crate) queue: VecDeque<M>,
    pub(crate) state: PersisterState,
}

impl<M> Pending<M> {
    fn ensure_running(&self) -> Result<(), BufferError> {
        if self.state.is_running() {
            Ok(())
        } else {
            Err(BufferError::IllegalState { state: self.state })
        }
    }
}

/// State shared between the public handle and the drain worker.
pub(crate) struct Shared<M> {
    pub(crate) name: String,
    pub(crate) pending: Mutex<Pending<M>>,
    /// Wakes an idle worker after admission, clear or shutdown.
    pub(crate) wake: Notify,
    /// Fired only by an abort; closing admission is the state's job.
    pub(crate) abort: CancellationToken,
    pub(crate) stats: PersisterStats,
}

/// Buffers measurements from any number of producers and persists them, in
/// admission order, through a single background worker.
///
/// Teardown is explicit: call [`MeasurementBuffer::shutdown`] and await it.
/// Dropping a buffer that is still running behaves like an abort.
pub struct MeasurementBuffer<M: MeasurementData> {
    shared: Arc<Shared<M>>,
    worker: AsyncMutex<Option<JoinHandle<()>>>,
}

impl<M: MeasurementData> MeasurementBuffer<M> {
    pub fn builder() -> MeasurementBufferBuilder<M> {
        MeasurementBufferBuilder::new()
    }

    /// Start a buffer with default configuration on the current Tokio runtime.
    pub fn new<S>(store: Arc<S>) -> Result<Self, BufferError>
    where
        S: MeasurementStore<M> + 'static,
    {
        Self::builder().store(store).build()
    }

    fn spawn(store: Arc<dyn MeasurementStore<M>>, config: BufferConfig) -> Result<Self, BufferError> {
        let runtime = Handle::try_current().map_err(|_| BufferError::NoRuntime)?;

        let shared = Arc::new(Shared {
            name: config.name,
            pending: Mutex::new(Pending {
                queue: VecDeque::with_capacity(config.initial_capacity),
                state: PersisterState::Running,
            }),
            wake: Notify::new(),
            abort: CancellationToken::new(),
            stats: PersisterStats::new(),
        });

        let worker = runtime.spawn(drain_loop(Arc::clone(&shared), store));
        info!(buffer = %shared.name, "Measurement buffer started");

        Ok(Self {
            shared,
            worker: AsyncMutex::new(Some(worker)),
        })
    }

    /// Append one measurement to the tail of the queue. Never blocks.
    ///
    /// Accepts either a measurement or an `Option`; `None` is rejected with
    /// `InvalidArgument`.
    pub fn add_one(&self, measurement: impl Into<Option<M>>) -> Result<(), BufferError> {
        let measurement = measurement
            .into()
            .ok_or_else(|| BufferError::absent("measurement"))?;

        {
            let mut pending = self.shared.pending.lock();
            pending.ensure_running()?;
            pending.queue.push_back(measurement);
            self.shared.stats.record_admitted(1);
        }

        self.shared.wake.notify_one();
        Ok(())
    }

    /// Append a batch, all or nothing.
    ///
    /// The whole batch is checked before anything is queued: an absent batch
    /// or an absent element fails the call and leaves the queue untouched. A
    /// valid batch is queued under a single lock, so its elements stay
    /// contiguous relative to other producers. Returns the number queued.
    pub fn add_many<I>(&self, measurements: impl Into<Option<I>>) -> Result<usize, BufferError>
    where
        I: IntoIterator,
        I::Item: Into<Option<M>>,
    {
        let measurements = measurements
            .into()
            .ok_or_else(|| BufferError::absent("measurements"))?;

        let batch = measurements
            .into_iter()
            .enumerate()
            .map(|(index, measurement)| {
                measurement
                    .into()
                    .ok_or_else(|| BufferError::InvalidArgument {
                        name: "measurements",
                        reason: format!("element {index} is absent"),
                    })
            })
            .collect::<Result<Vec<M>, _>>()?;

        let count = batch.len();
        {
            let mut pending = self.shared.pending.lock();
            pending.ensure_running()?;
            pending.queue.extend(batch);
            self.shared.stats.record_admitted(count);
        }

        if count > 0 {
            self.shared.wake.notify_one();
        }
        Ok(count)
    }

    /// Drop everything still waiting in the queue and return how many items
    /// were removed. A measurement the worker already took is not recalled.
    pub fn clear_pending(&self) -> Result<usize, BufferError> {
        let removed = {
            let mut pending = self.shared.pending.lock();
            pending.ensure_running()?;
            let removed = pending.queue.len();
            pending.queue.clear();
            self.shared.stats.record_cleared(removed);
            removed
        };

        if removed > 0 {
            debug!(buffer = %self.shared.name, removed, "Cleared pending measurements");
        }
        self.shared.wake.notify_one();
        Ok(removed)
    }

    /// Close admission, drain according to `policy` and wait for the worker.
    ///
    /// There is no timeout: a store call that hangs keeps this future pending.
    /// Calling again after the buffer stopped is a no-op. Concurrent callers
    /// are serialized and only the first caller's policy takes effect. If the
    /// future is dropped before the worker finished, the join handle stays in
    /// place and the next call resumes waiting for it.
    pub async fn shutdown(&self, policy: DrainPolicy) {
        let mut worker = self.worker.lock().await;
        let Some(handle) = worker.as_mut() else {
            debug!(buffer = %self.shared.name, "Shutdown requested on stopped buffer");
            return;
        };

        let (discarded, remaining) = {
            let mut pending = self.shared.pending.lock();
            pending.state = PersisterState::ShuttingDown;
            match policy {
                DrainPolicy::Graceful => (0, pending.queue.len()),
                DrainPolicy::Abort => {
                    let discarded = pending.queue.len();
                    pending.queue.clear();
                    self.shared.stats.record_discarded(discarded);
                    (discarded, 0)
                }
            }
        };

        info!(
            buffer = %self.shared.name,
            %policy,
            remaining,
            discarded,
            "Shutting down measurement buffer"
        );

        if policy == DrainPolicy::Abort {
            self.shared.abort.cancel();
        }
        self.shared.wake.notify_one();

        let joined = handle.await;
        *worker = None;
        if let Err(e) = joined {
            error!(buffer = %self.shared.name, "Drain worker terminated abnormally: {e}");
        }

        self.shared.pending.lock().state = PersisterState::Stopped;
        info!(buffer = %self.shared.name, "Measurement buffer stopped");
    }

    pub fn state(&self) -> PersisterState {
        self.shared.pending.lock().state
    }

    pub fn pending_len(&self) -> usize {
        self.shared.pending.lock().queue.len()
    }

    pub fn stats(&self) -> PersisterStatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }
}

impl<M: MeasurementData> Drop for MeasurementBuffer<M> {
    fn drop(&mut self) {
        if self.worker.get_mut().is_none() {
            return;
        }

        let discarded = {
            let mut pending = self.shared.pending.lock();
            pending.state = PersisterState::Stopped;
            let discarded = pending.queue.len();
            pending.queue.clear();
            discarded
        };
        self.shared.stats.record_discarded(discarded);
        self.shared.abort.cancel();
        self.shared.wake.notify_one();

        warn!(
            buffer = %self.shared.name,
            discarded,
            "Measurement buffer dropped without shutdown, pending measurements discarded"
        );
    }
}

pub struct MeasurementBufferBuilder<M> {
    store: Option<Arc<dyn MeasurementStore<M>>>,
    config: BufferConfig,
}

impl<M: MeasurementData> Default for MeasurementBufferBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: MeasurementData> MeasurementBufferBuilder<M> {
    pub fn new() -> Self {
        Self {
            store: None,
            config: BufferConfig::default(),
        }
    }

    #[must_use]
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: MeasurementStore<M> + 'static,
    {
        let store: Arc<dyn MeasurementStore<M>> = store;
        self.shared_store(store)
    }

    #[must_use]
    pub fn shared_store(mut self, store: Arc<dyn MeasurementStore<M>>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn config(mut self, config: BufferConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Spawn the drain worker. Fails with `InvalidArgument` when no store was
    /// supplied and with `NoRuntime` outside a Tokio runtime.
    pub fn build(self) -> Result<MeasurementBuffer<M>, BufferError> {
        let store = self.store.ok_or_else(|| BufferError::absent("store"))?;
        MeasurementBuffer::spawn(store, self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Reading;
    use crate::store::MemoryStore;
    use std::time::Duration;

    #[tokio::test]
    async fn test_builder_without_store_is_invalid() {
        let result = MeasurementBuffer::<Reading>::builder().name("no-store").build();
        assert!(matches!(
            result,
            Err(BufferError::InvalidArgument { name: "store", .. })
        ));
    }

    #[test]
    fn test_new_outside_runtime_fails() {
        let store = Arc::new(MemoryStore::<Reading>::new());
        let result = MeasurementBuffer::<Reading>::new(store);
        assert!(matches!(result, Err(BufferError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_state_transitions_to_stopped() {
        let store = Arc::new(MemoryStore::<Reading>::new());
        let buffer = MeasurementBuffer::<Reading>::new(store).unwrap();
        assert_eq!(buffer.state(), PersisterState::Running);

        buffer.shutdown(DrainPolicy::Graceful).await;
        assert_eq!(buffer.state(), PersisterState::Stopped);
    }

    #[tokio::test]
    async fn test_drop_without_shutdown_discards_pending() {
        let store = Arc::new(MemoryStore::<Reading>::new().with_latency(Duration::from_millis(200)));
        let buffer = MeasurementBuffer::<Reading>::new(Arc::clone(&store)).unwrap();
        let shared = Arc::clone(&buffer.shared);

        buffer
            .add_many(vec![Reading::new(1.0), Reading::new(2.0), Reading::new(3.0)])
            .unwrap();
        drop(buffer);

        assert!(shared.abort.is_cancelled());
        assert_eq!(shared.pending.lock().state, PersisterState::Stopped);
        assert!(shared.pending.lock().queue.is_empty());
    }

    #[tokio::test]
    async fn test_drop_after_shutdown_is_quiet() {
        let store = Arc::new(MemoryStore::<Reading>::new());
        let buffer = MeasurementBuffer::<Reading>::new(store).unwrap();
        let shared = Arc::clone(&buffer.shared);

        buffer.shutdown(DrainPolicy::Graceful).await;
        drop(buffer);

        assert!(!shared.abort.is_cancelled());
        assert_eq!(shared.stats.snapshot().discarded, 0);
    }
}
