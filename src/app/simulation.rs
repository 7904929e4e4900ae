use crate::analyzer::StreamingAggregator;
use crate::buffer::MeasurementBuffer;
use crate::domain::{DomainError, Reading};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Baseline around which simulated readings wander.
const BASELINE: f64 = 20.0;
const NOISE: f64 = 5.0;

/// Producer tasks that feed both the buffer and the aggregator on a timer.
pub struct Producers {
    tasks: JoinSet<Result<u64, DomainError>>,
    cancel: CancellationToken,
}

impl Producers {
    pub fn spawn(
        count: usize,
        interval: Duration,
        buffer: Arc<MeasurementBuffer<Reading>>,
        aggregator: Arc<StreamingAggregator>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let mut tasks = JoinSet::new();

        for id in 0..count {
            tasks.spawn(produce(
                format!("sensor-{id}"),
                interval,
                Arc::clone(&buffer),
                Arc::clone(&aggregator),
                cancel.clone(),
            ));
        }

        info!(producers = count, ?interval, "Producers started");
        Self { tasks, cancel }
    }

    /// Stop every producer and return how many readings they emitted.
    pub async fn stop(mut self) -> Result<u64, DomainError> {
        self.cancel.cancel();

        let mut produced = 0;
        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(result) => produced += result?,
                Err(e) => tracing::error!("Producer task failed: {e}"),
            }
        }
        Ok(produced)
    }
}

fn sample() -> f64 {
    BASELINE + rand::rng().random_range(-NOISE..NOISE)
}

async fn produce(
    source: String,
    interval: Duration,
    buffer: Arc<MeasurementBuffer<Reading>>,
    aggregator: Arc<StreamingAggregator>,
    cancel: CancellationToken,
) -> Result<u64, DomainError> {
    let mut ticker = tokio::time::interval(interval);
    let mut produced = 0;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let value = sample();
                aggregator.append(value)?;
                buffer.add_one(Reading::new(value).with_source(source.as_str()))?;
                produced += 1;
            }
        }
    }

    debug!(%source, produced, "Producer stopped");
    Ok(produced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::DrainPolicy;
    use crate::store::MemoryStore;

    #[test]
    fn test_samples_stay_near_baseline() {
        for _ in 0..1000 {
            let value = sample();
            assert!((BASELINE - NOISE..BASELINE + NOISE).contains(&value));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_producers_feed_buffer_and_aggregator() {
        let store = Arc::new(MemoryStore::new());
        let buffer = Arc::new(MeasurementBuffer::<Reading>::new(Arc::clone(&store)).unwrap());
        let aggregator = Arc::new(StreamingAggregator::new());

        let producers = Producers::spawn(
            3,
            Duration::from_millis(10),
            Arc::clone(&buffer),
            Arc::clone(&aggregator),
        );
        tokio::time::sleep(Duration::from_millis(95)).await;
        let produced = producers.stop().await.unwrap();

        buffer.shutdown(DrainPolicy::Graceful).await;

        assert!(produced >= 3);
        assert_eq!(aggregator.count(), produced);
        assert_eq!(store.len() as u64, produced);
    }
}
