pub mod config;
pub mod error;
pub mod persister;
pub mod state;
pub mod stats;
mod worker;

pub use config::BufferConfig;
pub use error::BufferError;
pub use persister::{MeasurementBuffer, MeasurementBufferBuilder};
pub use state::{DrainPolicy, PersisterState};
pub use stats::{PersisterStats, PersisterStatsSnapshot};
