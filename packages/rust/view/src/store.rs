//! Key/value persistence for UI state.
//!
//! Values are opaque strings (JSON in practice). Losing them is harmless:
//! readers fall back to defaults.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use lessonmap_shared::{LessonmapError, Result};
use tracing::{debug, warn};

/// Minimal string store, the shape of a browser's local storage.
pub trait StateStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// In-memory store. State lives as long as the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Store backed by one JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(?path, error = %e, "ignoring corrupt state file");
                BTreeMap::new()
            }),
            Err(e) => {
                debug!(?path, error = %e, "no state file, starting empty");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_owned(), value);

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|e| LessonmapError::io(dir, e))?;
        }
        let content = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| LessonmapError::parse(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| LessonmapError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("lessonmap-store-{}-{name}", std::process::id()))
            .join("state.json")
    }

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.get("k").is_none());
        store.set("k", "v".into()).unwrap();
        assert_eq!(store.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn file_store_persists_across_opens() {
        let path = temp_path("persist");
        let mut store = JsonFileStore::open(&path);
        assert!(store.get("sidebar:open-classes").is_none());

        store
            .set("sidebar:open-classes", r#"{"statics":true}"#.into())
            .unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(
            reopened.get("sidebar:open-classes").as_deref(),
            Some(r#"{"statics":true}"#)
        );

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let path = temp_path("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileStore::open(&path);
        assert!(store.get("anything").is_none());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
