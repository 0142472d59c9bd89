use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

pub const SCANS_KEY: &str = "skin_scan.scans";
pub const STATS_KEY: &str = "skin_scan.stats";
pub const PREFERENCES_KEY: &str = "skin_scan.preferences";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Flat string key-value storage. Values are opaque serialized text.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Whole map lives in memory; every mutation rewrites the backing file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub async fn open(path: PathBuf) -> Self {
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse data file {path:?}: {err}");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                error!("failed to read data file {path:?}: {err}");
                BTreeMap::new()
            }
        };

        Self { path, entries }
    }

    /// Writes `entries` to disk. The caller commits them to memory only on success.
    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(entries)?;
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).map_err(io_err)?;
        file.write_all(&payload).map_err(io_err)?;
        file.sync_all().map_err(io_err)?;
        fs::rename(&temp_path, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if !self.entries.contains_key(key) {
            warn!("remove of absent key {key}");
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.remove(key);
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("skin_scan_kv_{tag}_{}_{nanos}.json", std::process::id()));
        path
    }

    #[tokio::test]
    async fn file_store_survives_reopen() {
        let path = unique_path("reopen");
        let mut store = JsonFileStore::open(path.clone()).await;
        store.set(SCANS_KEY, "[]".to_string()).unwrap();
        store.set(STATS_KEY, "{}".to_string()).unwrap();
        store.remove(STATS_KEY).unwrap();

        let reopened = JsonFileStore::open(path.clone()).await;
        assert_eq!(reopened.get(SCANS_KEY).as_deref(), Some("[]"));
        assert_eq!(reopened.get(STATS_KEY), None);

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failed_write_leaves_memory_untouched() {
        let path = PathBuf::from("/dev/null/skin_scan/state.json");
        let mut store = JsonFileStore::open(path).await;

        assert!(store.set(SCANS_KEY, "[{\"id\":\"x\"}]".to_string()).is_err());
        assert_eq!(store.get(SCANS_KEY), None);
    }

    #[tokio::test]
    async fn failed_remove_keeps_the_value() {
        let path = unique_path("remove");
        let mut store = JsonFileStore::open(path.clone()).await;
        store.set(STATS_KEY, "{}".to_string()).unwrap();

        // Point the store at an unwritable location.
        store.path = PathBuf::from("/dev/null/skin_scan/state.json");
        assert!(store.remove(STATS_KEY).is_err());
        assert_eq!(store.get(STATS_KEY).as_deref(), Some("{}"));

        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_file_opens_empty() {
        let path = unique_path("corrupt");
        std::fs::write(&path, b"{not json").unwrap();

        let store = JsonFileStore::open(path.clone()).await;
        assert_eq!(store.get(SCANS_KEY), None);

        let _ = std::fs::remove_file(path);
    }
}
