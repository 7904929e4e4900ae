//! Domain layer for measurement-buffer.
//!
//! Contains the types shared across all modules:
//! - `MeasurementData`: the read-only view the persister needs of a reading
//! - `Reading`: a plain timestamp/value record usable as a measurement
//! - `DomainError`: top-level error type wrapping the per-module errors

pub mod error;
pub mod measurement;

pub use error::DomainError;
pub use measurement::{MeasurementData, Reading};
