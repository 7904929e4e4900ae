//! The single background task that hands queued measurements to storage.

use super::persister::Shared;
use crate::domain::MeasurementData;
use crate::domain::error::panic_message;
use crate::store::MeasurementStore;
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

enum Next<M> {
    Persist(M),
    Wait,
    Stop,
}

/// Persist queued measurements one at a time until shutdown says stop.
///
/// Graceful shutdown ends the loop once the queue is empty and admission is
/// closed. Abort ends it as soon as the cancellation token is observed; a save
/// already in progress is allowed to finish.
pub(crate) async fn drain_loop<M: MeasurementData>(
    shared: Arc<Shared<M>>,
    store: Arc<dyn MeasurementStore<M>>,
) {
    info!(buffer = %shared.name, "Drain worker started");

    loop {
        if shared.abort.is_cancelled() {
            debug!(buffer = %shared.name, "Abort observed, leaving drain loop");
            break;
        }

        let next = {
            let mut pending = shared.pending.lock();
            match pending.queue.pop_front() {
                Some(measurement) => Next::Persist(measurement),
                None if pending.state.is_running() => Next::Wait,
                None => Next::Stop,
            }
        };

        match next {
            Next::Persist(measurement) => persist_one(&shared, store.as_ref(), measurement).await,
            Next::Wait => {
                tokio::select! {
                    () = shared.wake.notified() => {}
                    () = shared.abort.cancelled() => {
                        debug!(buffer = %shared.name, "Abort observed while idle");
                        break;
                    }
                }
            }
            Next::Stop => break,
        }
    }

    let stats = shared.stats.snapshot();
    info!(
        buffer = %shared.name,
        saved = stats.saved,
        failed = stats.failed,
        panicked = stats.panicked,
        "Drain worker stopped"
    );
}

/// One save attempt. Errors and panics are counted and logged here and go no
/// further: persistence is best effort and never retried.
async fn persist_one<M: MeasurementData>(
    shared: &Shared<M>,
    store: &dyn MeasurementStore<M>,
    measurement: M,
) {
    let outcome = match panic::catch_unwind(AssertUnwindSafe(|| store.save(&measurement))) {
        Ok(save) => AssertUnwindSafe(save).catch_unwind().await,
        Err(payload) => Err(payload),
    };

    match outcome {
        Ok(Ok(())) => shared.stats.record_saved(),
        Ok(Err(e)) => {
            shared.stats.record_failed();
            warn!(
                buffer = %shared.name,
                timestamp = %measurement.timestamp(),
                value = measurement.value(),
                error = %e,
                "Failed to save measurement, dropping it"
            );
        }
        Err(payload) => {
            shared.stats.record_panicked();
            error!(
                buffer = %shared.name,
                timestamp = %measurement.timestamp(),
                value = measurement.value(),
                panic = %panic_message(payload.as_ref()),
                "Store panicked while saving measurement, dropping it"
            );
        }
    }
}
