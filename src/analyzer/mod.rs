//! Streaming statistics over an append-only sequence of numbers.

pub mod aggregator;
pub mod error;
pub mod observer;
pub mod stats;

pub use aggregator::StreamingAggregator;
pub use error::AggregatorError;
pub use observer::ObserverHandle;
pub use stats::{AggregateStats, RunningStats};
