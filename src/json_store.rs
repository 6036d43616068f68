//! JSON file persistence for the shopping list.
//!
//! The whole collection lives in one pretty-printed UTF-8 JSON document:
//!
//! ```json
//! {
//!   "items": [ { "id": "...", "display_text": "4 tomato", ... } ],
//!   "last_updated": "2024-06-01T09:30:00"
//! }
//! ```
//!
//! Saves write a sibling temporary file and rename it over the target, so
//! a reader sees either the old or the new collection, never a mix.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use larder_core::models::ShoppingListData;
use larder_core::store::{ListStore, StoreError};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "shopping_list.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ListStore for JsonFileStore {
    fn load(&self) -> Result<ShoppingListData, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no shopping list file yet");
                return Ok(ShoppingListData::default());
            }
            Err(e) => return Err(StoreError::Read(format!("{}: {}", self.path.display(), e))),
        };

        serde_json::from_str(&content)
            .map_err(|e| StoreError::Parse(format!("{}: {}", self.path.display(), e)))
    }

    fn save(&self, data: &ShoppingListData) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| StoreError::Write(format!("{}: {}", parent.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        let tmp = self.temp_path();
        fs::write(&tmp, json)
            .map_err(|e| StoreError::Write(format!("{}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            StoreError::Write(format!("{}: {}", self.path.display(), e))
        })?;

        debug!(path = %self.path.display(), items = data.items.len(), "saved shopping list");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use larder_core::models::{ShoppingListEntry, StructuredIngredient};
    use tempfile::TempDir;

    fn sample() -> ShoppingListData {
        let ing = StructuredIngredient::new("jalapeño")
            .unwrap()
            .with_quantity(Some(2.0))
            .unwrap();
        ShoppingListData {
            items: vec![ShoppingListEntry::new(
                "2 jalapeño",
                ing,
                "Salsa",
                "Fresh Produce",
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            )],
            last_updated: None,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path().join("list.json"));
        assert!(store.load().unwrap().items.is_empty());
    }

    #[test]
    fn test_save_creates_parents_and_keeps_non_ascii() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("data").join("list.json");
        let store = JsonFileStore::new(&path);
        assert_eq!(store.path(), path.as_path());

        let data = sample();
        store.save(&data).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("jalapeño"));
        assert!(raw.contains("\n  \"items\""));
        assert!(!store.temp_path().exists());
        assert_eq!(store.load().unwrap(), data);
    }

    #[test]
    fn test_corrupt_file_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.json");
        fs::write(&path, "{ not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert!(matches!(store.load(), Err(StoreError::Parse(_))));
    }

    #[test]
    fn test_directory_path_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert!(matches!(store.load(), Err(StoreError::Read(_))));
    }

    #[test]
    fn test_legacy_file_loads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("list.json");
        fs::write(
            &path,
            r#"{"items": [{"item": "1 onion", "recipe": "Soup", "added": "2023-11-02", "checked": false, "category": "Fresh Produce"}]}"#,
        )
        .unwrap();
        let data = JsonFileStore::new(&path).load().unwrap();
        assert_eq!(data.items.len(), 1);
        assert_eq!(data.items[0].display_text, "1 onion");
        assert_eq!(data.last_updated, None);
    }
}
