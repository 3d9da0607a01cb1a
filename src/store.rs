use crate::models::Record;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Immutable snapshot of the customer table.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Vec<Record>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in source row order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

/// Shared, swappable pointer to the current [`RecordStore`].
///
/// Readers clone the `Arc` and release the lock immediately, so a reload
/// never waits on an in-flight search and a search never sees a partial table.
#[derive(Debug)]
pub struct StoreHandle {
    current: RwLock<Arc<RecordStore>>,
    version: AtomicU64,
}

impl StoreHandle {
    pub fn new(store: RecordStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
            version: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> Arc<RecordStore> {
        self.current.read().clone()
    }

    /// Replaces the current store with a fully built one and returns the new version.
    pub fn publish(&self, store: RecordStore) -> u64 {
        let next = Arc::new(store);
        *self.current.write() = next;
        self.version.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn rows_loaded(&self) -> usize {
        self.current.read().len()
    }
}
