//! Persistence contract for the shopping list.
//!
//! The [`ListStore`] trait reads and writes the whole
//! [`ShoppingListData`] collection as one unit. There is no per-entry
//! transaction and no version token: two callers running overlapping
//! load-modify-save cycles race, and the later save wins.

pub mod memory;

use thiserror::Error;

use crate::models::ShoppingListData;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read shopping list: {0}")]
    Read(String),
    #[error("failed to parse shopping list: {0}")]
    Parse(String),
    #[error("failed to write shopping list: {0}")]
    Write(String),
}

/// Whole-collection storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`load`](ListStore::load) | Read the full collection |
/// | [`save`](ListStore::save) | Replace the full collection |
pub trait ListStore {
    /// Read the full collection. A store that has never been written
    /// returns an empty collection rather than an error.
    fn load(&self) -> Result<ShoppingListData, StoreError>;

    /// Replace the stored collection with `data`.
    fn save(&self, data: &ShoppingListData) -> Result<(), StoreError>;
}

impl<T: ListStore + ?Sized> ListStore for &T {
    fn load(&self) -> Result<ShoppingListData, StoreError> {
        (**self).load()
    }

    fn save(&self, data: &ShoppingListData) -> Result<(), StoreError> {
        (**self).save(data)
    }
}
