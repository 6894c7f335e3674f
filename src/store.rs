//! Local key-value persistence
//!
//! Small app state (preferences, bookmarks, view throttle) lives in a single
//! JSON object keyed by name. Reads never fail: a missing file, a corrupt
//! file or an undecodable value all read as "missing" and the caller falls
//! back to its default. Only writes report errors.
//!
//! # Atomic writes
//!
//! [`FileStore`] writes a temporary file in the target directory and renames
//! it over `store.json`, so a crash mid-write leaves the previous state
//! intact. `tempfile` creates the file with mode 0o600 on Unix.

use crate::core::error::{Error, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex;

pub const STORE_FILE_NAME: &str = "store.json";

/// Async get/set by key over JSON values.
pub trait KeyValueStore: Send + Sync {
    /// Returns `None` for a missing key or an unreadable store.
    fn get(&self, key: &str) -> impl Future<Output = Option<Value>> + Send;

    fn set(&self, key: &str, value: Value) -> impl Future<Output = Result<()>> + Send;

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Reads and decodes `key`. Undecodable values read as missing.
pub async fn load<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key).await?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(e) => {
            tracing::warn!(key, "Ignoring undecodable stored value: {e}");
            None
        }
    }
}

/// Encodes and writes `value` under `key`.
pub async fn save<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let value = serde_json::to_value(value)?;
    store.set(key, value).await
}

/// JSON-file backed store
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Loaded lazily on first access
    cache: Mutex<Option<Map<String, Value>>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Store at `<data_dir>/store.json`, if a data directory is available.
    pub fn open_default() -> Option<Self> {
        crate::utils::get_data_dir().map(|dir| Self::new(dir.join(STORE_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_file(path: &Path) -> Map<String, Value> {
        let json = match tokio::fs::read_to_string(path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), "Failed to read store: {e}");
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&json) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!(path = %path.display(), "Store is not a JSON object, starting empty");
                Map::new()
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "Corrupt store, starting empty: {e}");
                Map::new()
            }
        }
    }

    async fn write_file(path: PathBuf, map: &Map<String, Value>) -> std::io::Result<()> {
        let json = serde_json::to_vec_pretty(map)?;
        tokio::task::spawn_blocking(move || {
            let dir = path.parent().unwrap_or_else(|| Path::new("."));
            std::fs::create_dir_all(dir)?;
            let mut temp = tempfile::NamedTempFile::new_in(dir)?;
            temp.write_all(&json)?;
            temp.as_file().sync_all()?;
            temp.persist(&path).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(std::io::Error::other)?
    }

    /// Applies `update` to the stored object and writes it out.
    ///
    /// The in-memory copy only changes once the write succeeded.
    async fn update(&self, key: &str, update: impl FnOnce(&mut Map<String, Value>)) -> Result<()> {
        let mut cache = self.cache.lock().await;
        let current = match cache.take() {
            Some(map) => map,
            None => Self::read_file(&self.path).await,
        };

        let mut next = current.clone();
        update(&mut next);

        match Self::write_file(self.path.clone(), &next).await {
            Ok(()) => {
                *cache = Some(next);
                Ok(())
            }
            Err(e) => {
                *cache = Some(current);
                let message = if e.kind() == std::io::ErrorKind::StorageFull {
                    "disk full".to_string()
                } else {
                    e.to_string()
                };
                Err(Error::Store {
                    key: key.to_string(),
                    message,
                })
            }
        }
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut cache = self.cache.lock().await;
        if cache.is_none() {
            *cache = Some(Self::read_file(&self.path).await);
        }
        cache.as_ref().and_then(|map| map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.update(key, |map| {
            map.insert(key.to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.update(key, |map| {
            map.remove(key);
        })
        .await
    }
}

/// In-memory store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Arc<StdMutex<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        // Every write is a single insert or remove, so poisoning is ignored
        self.values
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<Value> {
        self.values().get(key).cloned()
    }

    async fn set(&self, key: &str, value: Value) -> Result<()> {
        self.values().insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);

        let store = FileStore::new(&path);
        assert!(store.get("theme").await.is_none());
        store.set("theme", json!("dark")).await.unwrap();
        save(&store, "bookmarks", &vec!["a", "b"]).await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("theme").await, Some(json!("dark")));
        let bookmarks: Vec<String> = load(&reopened, "bookmarks").await.unwrap();
        assert_eq!(bookmarks, vec!["a", "b"]);

        reopened.remove("theme").await.unwrap();
        assert!(FileStore::new(&path).get("theme").await.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        tokio::fs::write(&path, "{not json").await.unwrap();

        let store = FileStore::new(&path);
        assert!(store.get("anything").await.is_none());

        // First write replaces the corrupt file
        store.set("first_launch", json!(false)).await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed, json!({"first_launch": false}));
    }

    #[tokio::test]
    async fn test_non_object_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        tokio::fs::write(&path, "[1, 2, 3]").await.unwrap();
        assert!(FileStore::new(&path).get("0").await.is_none());
    }

    #[tokio::test]
    async fn test_undecodable_value_reads_as_missing() {
        let store = MemoryStore::new();
        store.set("count", json!("seven")).await.unwrap();
        assert_eq!(load::<u32>(&store, "count").await, None);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        // Parent is a regular file, so creating the temp file fails
        let blocker = dir.path().join("blocker");
        tokio::fs::write(&blocker, "").await.unwrap();
        let store = FileStore::new(blocker.join(STORE_FILE_NAME));

        let err = store.set("theme", json!("dark")).await.unwrap_err();
        assert!(matches!(err, Error::Store { ref key, .. } if key == "theme"));
        assert!(store.get("theme").await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        FileStore::new(&path).set("k", json!(1)).await.unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.set("k", json!(1)).await.unwrap();
        assert_eq!(clone.get("k").await, Some(json!(1)));
    }
}
