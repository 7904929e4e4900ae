pub mod config;
pub mod logging;
pub mod shutdown;
pub mod simulation;

pub use config::{Config, ConfigError, LogFormat, LogLevel};
pub use logging::{LoggingError, init_logging};
pub use shutdown::StopReason;

use crate::analyzer::{AggregateStats, StreamingAggregator};
use crate::buffer::{BufferConfig, MeasurementBuffer, PersisterStatsSnapshot};
use crate::domain::{DomainError, Reading};
use crate::store::MemoryStore;
use simulation::Producers;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::info;

/// What a finished run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reason: StopReason,
    pub produced: u64,
    pub stored: usize,
    pub buffer: PersisterStatsSnapshot,
    pub aggregate: AggregateStats,
}

/// Composition root: owns every component and tears them down in order.
pub struct App {
    config: Config,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run until a signal arrives or the configured duration elapses, then
    /// stop producers, shut the buffer down with the configured policy and
    /// report what happened.
    pub async fn run(&self) -> Result<RunSummary, DomainError> {
        let config = &self.config;
        let started = Instant::now();

        let store = Arc::new(
            MemoryStore::new()
                .with_latency(config.store_latency)
                .with_failure_rate(config.store_failure_rate),
        );
        let buffer = Arc::new(
            MeasurementBuffer::<Reading>::builder()
                .store(Arc::clone(&store))
                .config(BufferConfig::named("sensors"))
                .build()?,
        );
        let aggregator = Arc::new(StreamingAggregator::new());
        let reporter =
            aggregator.register_observer(report_every(Arc::downgrade(&aggregator), config.report_every));

        let producers = Producers::spawn(
            config.producers,
            config.sample_interval,
            Arc::clone(&buffer),
            Arc::clone(&aggregator),
        );

        let reason = tokio::select! {
            reason = shutdown::wait_for_signal() => reason,
            () = deadline(config.run_duration) => StopReason::Deadline,
        };
        info!(?reason, "Stopping producers");

        let produced = producers.stop().await?;
        buffer.shutdown(config.drain_policy).await;
        aggregator.unregister_observer(reporter);

        let summary = RunSummary {
            reason,
            produced,
            stored: store.len(),
            buffer: buffer.stats(),
            aggregate: aggregator.snapshot(),
        };

        info!(
            elapsed = ?started.elapsed(),
            produced = summary.produced,
            stored = summary.stored,
            failed = summary.buffer.failed,
            discarded = summary.buffer.discarded,
            min = ?summary.aggregate.min,
            max = ?summary.aggregate.max,
            average = ?summary.aggregate.average,
            "Run finished"
        );

        #[cfg(feature = "metrics")]
        if config.print_metrics {
            print_metrics(&summary, buffer.pending_len());
        }

        Ok(summary)
    }
}

/// Observer that logs the running statistics every `every` values. Holds the
/// aggregator weakly so the registration does not keep it alive.
fn report_every(aggregator: Weak<StreamingAggregator>, every: u64) -> impl Fn() + Send + Sync + 'static {
    move || {
        let Some(aggregator) = aggregator.upgrade() else {
            return;
        };
        let stats = aggregator.snapshot();
        if stats.count % every.max(1) == 0 {
            info!(
                count = stats.count,
                min = ?stats.min,
                max = ?stats.max,
                average = ?stats.average,
                last = ?stats.last,
                "Running statistics"
            );
        }
    }
}

async fn deadline(duration: Option<std::time::Duration>) {
    match duration {
        Some(duration) => tokio::time::sleep(duration).await,
        None => std::future::pending().await,
    }
}

#[cfg(feature = "metrics")]
fn print_metrics(summary: &RunSummary, pending: usize) {
    use crate::metrics::MetricsCollector;

    let rendered = MetricsCollector::new().and_then(|collector| {
        collector.record_buffer(&summary.buffer, pending);
        collector.record_aggregate(&summary.aggregate);
        collector.render()
    });
    match rendered {
        Ok(text) => println!("{text}"),
        Err(e) => tracing::error!("Failed to render metrics: {e}"),
    }
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Main entry point for the binary
pub async fn main() -> anyhow::Result<()> {
    let mut config = Config::from_args(std::env::args_os())?;
    if let Some(config_file) = config.config_file.clone() {
        eprintln!("Loading configuration from file: {}", config_file.display());
        config = Config::from_file(&config_file)?;
    }

    init_logging(config.log_level, config.log_format)?;
    info!("Starting measurement-buffer v{}", get_version());
    info!(
        producers = config.producers,
        interval = ?config.sample_interval,
        policy = %config.drain_policy,
        "Configuration loaded"
    );

    let summary = App::new(config).run().await?;
    info!(reason = ?summary.reason, "measurement-buffer stopped");
    Ok(())
}
