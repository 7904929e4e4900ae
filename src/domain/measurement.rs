use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Read-only accessors for a time-stamped numeric reading.
///
/// The concrete representation belongs to the producer. The buffer only moves
/// values of this type around and hands them to storage, so implementors must
/// be cheap to move and safe to share across threads.
pub trait MeasurementData: Send + Sync + 'static {
    fn timestamp(&self) -> DateTime<Utc>;
    fn value(&self) -> f64;
}

impl<T: MeasurementData + ?Sized> MeasurementData for Arc<T> {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn value(&self) -> f64 {
        (**self).value()
    }
}

impl<T: MeasurementData + ?Sized> MeasurementData for Box<T> {
    fn timestamp(&self) -> DateTime<Utc> {
        (**self).timestamp()
    }

    fn value(&self) -> f64 {
        (**self).value()
    }
}

/// A single reading taken by a named source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default)]
    pub source: Option<String>,
}

impl Reading {
    pub fn new(value: f64) -> Self {
        Self {
            timestamp: Utc::now(),
            value,
            source: None,
        }
    }

    pub fn at(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            source: None,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl MeasurementData for Reading {
    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn value(&self) -> f64 {
        self.value
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.timestamp.format("%H:%M:%S%.3f"))?;
        if let Some(source) = &self.source {
            write!(f, "{source}: ")?;
        }
        write!(f, "{}", self.value)
    }
}
