//! Prometheus export of buffer and aggregator snapshots.

use crate::analyzer::AggregateStats;
use crate::buffer::PersisterStatsSnapshot;
use prometheus::{Encoder, Gauge, IntGauge, Registry, TextEncoder};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Prometheus error: {0}")]
    PrometheusError(#[from] prometheus::Error),
    #[error("Metrics encoding error: {0}")]
    Encoding(String),
}

pub struct MetricsCollector {
    registry: Registry,

    admitted: IntGauge,
    saved: IntGauge,
    failed: IntGauge,
    panicked: IntGauge,
    cleared: IntGauge,
    discarded: IntGauge,
    pending: IntGauge,

    values_seen: IntGauge,
    value_min: Gauge,
    value_max: Gauge,
    value_average: Gauge,
    value_last: Gauge,
}

impl MetricsCollector {
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        Ok(Self {
            admitted: int_gauge(&registry, "measurement_buffer_admitted", "Measurements accepted into the queue")?,
            saved: int_gauge(&registry, "measurement_buffer_saved", "Measurements saved by the store")?,
            failed: int_gauge(&registry, "measurement_buffer_failed", "Saves that returned an error")?,
            panicked: int_gauge(&registry, "measurement_buffer_panicked", "Saves that panicked")?,
            cleared: int_gauge(&registry, "measurement_buffer_cleared", "Measurements removed by clear")?,
            discarded: int_gauge(&registry, "measurement_buffer_discarded", "Measurements discarded on abort")?,
            pending: int_gauge(&registry, "measurement_buffer_pending", "Measurements waiting in the queue")?,
            values_seen: int_gauge(&registry, "measurement_values_total", "Values appended to the aggregator")?,
            value_min: gauge(&registry, "measurement_value_min", "Smallest appended value")?,
            value_max: gauge(&registry, "measurement_value_max", "Largest appended value")?,
            value_average: gauge(&registry, "measurement_value_average", "Mean of appended values")?,
            value_last: gauge(&registry, "measurement_value_last", "Most recently appended value")?,
            registry,
        })
    }

    pub fn record_buffer(&self, stats: &PersisterStatsSnapshot, pending: usize) {
        self.admitted.set(stats.admitted as i64);
        self.saved.set(stats.saved as i64);
        self.failed.set(stats.failed as i64);
        self.panicked.set(stats.panicked as i64);
        self.cleared.set(stats.cleared as i64);
        self.discarded.set(stats.discarded as i64);
        self.pending.set(pending as i64);
    }

    /// Empty aggregates are exported as NaN.
    pub fn record_aggregate(&self, stats: &AggregateStats) {
        self.values_seen.set(stats.count as i64);
        self.value_min.set(stats.min.unwrap_or(f64::NAN));
        self.value_max.set(stats.max.unwrap_or(f64::NAN));
        self.value_average.set(stats.average.unwrap_or(f64::NAN));
        self.value_last.set(stats.last.unwrap_or(f64::NAN));
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String, MetricsError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| MetricsError::Encoding(e.to_string()))
    }
}

fn int_gauge(registry: &Registry, name: &str, help: &str) -> Result<IntGauge, MetricsError> {
    let gauge = IntGauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

fn gauge(registry: &Registry, name: &str, help: &str) -> Result<Gauge, MetricsError> {
    let gauge = Gauge::new(name, help)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}
