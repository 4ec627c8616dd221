use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::error::{PixelcastError, PixelcastResult};

/// Stable keys for the persisted catalogs.
pub const FRAMES_KEY: &str = "frames";
pub const TIMELINES_KEY: &str = "timelines";
pub const DEVICES_KEY: &str = "devices";

/// Durable key-value store keyed by named blobs. Writes are synchronous and
/// last-write-wins; the session saves after every catalog mutation.
pub trait CatalogStore {
    fn load(&self, key: &str) -> PixelcastResult<Option<String>>;
    fn save(&mut self, key: &str, payload: &str) -> PixelcastResult<()>;
}

/// One JSON file per key under a root directory.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }
}

impl CatalogStore for JsonFileStore {
    fn load(&self, key: &str) -> PixelcastResult<Option<String>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PixelcastError::storage(format!(
                "failed to read '{}': {e}",
                path.display()
            ))),
        }
    }

    fn save(&mut self, key: &str, payload: &str) -> PixelcastResult<()> {
        fs::create_dir_all(&self.root).map_err(|e| {
            PixelcastError::storage(format!(
                "failed to create '{}': {e}",
                self.root.display()
            ))
        })?;
        let path = self.key_path(key);
        fs::write(&path, payload).map_err(|e| {
            PixelcastError::storage(format!("failed to write '{}': {e}", path.display()))
        })
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CatalogStore for MemoryStore {
    fn load(&self, key: &str) -> PixelcastResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, payload: &str) -> PixelcastResult<()> {
        self.entries.insert(key.to_string(), payload.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load(FRAMES_KEY).unwrap(), None);
        store.save(FRAMES_KEY, "[]").unwrap();
        assert_eq!(store.load(FRAMES_KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_missing_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert_eq!(store.load("nothing").unwrap(), None);
    }

    #[test]
    fn file_store_roundtrip_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonFileStore::new(dir.path().join("nested"));
        store.save(DEVICES_KEY, r#"[{"ip":"10.0.0.1","name":"a"}]"#).unwrap();
        let loaded = store.load(DEVICES_KEY).unwrap().unwrap();
        assert!(loaded.contains("10.0.0.1"));
    }
}
