//! In-memory [`ListStore`] implementation for tests and embedding.
//!
//! Holds the collection behind `std::sync::RwLock`. Read and write failures
//! can be switched on to exercise the degraded paths of the aggregator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::models::ShoppingListData;

use super::{ListStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<ShoppingListData>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing collection.
    pub fn with_data(data: ShoppingListData) -> Self {
        Self {
            data: RwLock::new(data),
            ..Self::default()
        }
    }

    /// Make every subsequent `load` fail as if the backing data were corrupt.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `save` fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of the stored collection, bypassing the failure switches.
    pub fn snapshot(&self) -> ShoppingListData {
        self.data
            .read()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

impl ListStore for MemoryStore {
    fn load(&self) -> Result<ShoppingListData, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Parse("simulated corrupt data".to_string()));
        }
        self.data
            .read()
            .map(|d| d.clone())
            .map_err(|e| StoreError::Read(e.to_string()))
    }

    fn save(&self, data: &ShoppingListData) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("simulated write failure".to_string()));
        }
        let mut stored = self
            .data
            .write()
            .map_err(|e| StoreError::Write(e.to_string()))?;
        *stored = data.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_and_failure_switches() {
        let store = MemoryStore::new();
        assert!(store.load().unwrap().items.is_empty());

        let mut data = ShoppingListData::default();
        data.last_updated = chrono::NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0));
        store.save(&data).unwrap();
        assert_eq!(store.load().unwrap(), data);

        store.set_fail_reads(true);
        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
        store.set_fail_writes(true);
        assert!(matches!(store.save(&data), Err(StoreError::Write(_))));
        assert_eq!(store.snapshot(), data);
    }
}
