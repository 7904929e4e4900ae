use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

pub type Observer = Arc<dyn Fn() + Send + Sync>;

/// Handle ids are unique across every aggregator in the process.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(0);

/// Opaque token returned by registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverHandle(u64);

impl fmt::Display for ObserverHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// Registered callbacks in registration order.
#[derive(Default)]
pub(crate) struct ObserverSet {
    entries: BTreeMap<ObserverHandle, Observer>,
}

impl ObserverSet {
    pub(crate) fn insert(&mut self, observer: Observer) -> ObserverHandle {
        let handle = ObserverHandle(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed));
        self.entries.insert(handle, observer);
        handle
    }

    pub(crate) fn remove(&mut self, handle: ObserverHandle) -> bool {
        self.entries.remove(&handle).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Cloned so callbacks can run without holding the set's lock.
    pub(crate) fn snapshot(&self) -> Vec<(ObserverHandle, Observer)> {
        self.entries
            .iter()
            .map(|(handle, observer)| (*handle, Arc::clone(observer)))
            .collect()
    }
}
