// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Counters stay far below i64::MAX
    clippy::cast_possible_wrap,       // Same, for gauge exports
    clippy::cast_precision_loss,      // Acceptable for averages and metrics
    clippy::missing_errors_doc,       // Error enums document themselves
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. BufferError in buffer module
    clippy::must_use_candidate,       // Annotated selectively on builders
    clippy::doc_markdown              // Internal API
)]

pub mod analyzer;
pub mod app;
pub mod buffer;
pub mod domain;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod store;

// Re-export main types for easy access
pub use analyzer::{AggregateStats, StreamingAggregator};
pub use app::{App, Config};
pub use buffer::{BufferError, DrainPolicy, MeasurementBuffer, PersisterState};
pub use domain::{DomainError, MeasurementData, Reading};
pub use store::{MeasurementStore, MemoryStore, StoreError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
