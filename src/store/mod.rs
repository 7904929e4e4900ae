pub mod memory;

pub use memory::MemoryStore;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Store rejected measurement: {reason}")]
    Rejected { reason: String },

    #[error("Store backend unavailable: {0}")]
    Unavailable(String),
}

pub type SaveFuture<'a> = Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + 'a>>;

/// Durable storage for measurements.
///
/// This trait is dyn-compatible by using boxed futures instead of `impl Future`.
/// The buffer never calls `save` concurrently, so implementations do not need
/// internal locking on its behalf. A `save` may be slow, return an error or
/// panic; none of those outcomes is retried.
pub trait MeasurementStore<M>: Send + Sync {
    fn save<'a>(&'a self, measurement: &'a M) -> SaveFuture<'a>;
}
