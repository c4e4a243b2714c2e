use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;

/// Fixed keys persisted by the service.
pub const INSURANCE_PLANS_KEY: &str = "insurance_plans";
pub const THEME_KEY: &str = "theme";
pub const ALERTS_MUTED_KEY: &str = "alerts_muted";

/// Flat JSON blobs under string keys. Last write wins.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn put(&self, key: &str, value: Value) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store file {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("store file {} is not a JSON object: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("stored value for '{key}' has an unexpected shape: {source}")]
    Shape {
        key: &'static str,
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

fn lock<'a>(
    values: &'a Mutex<BTreeMap<String, Value>>,
) -> Result<MutexGuard<'a, BTreeMap<String, Value>>, StoreError> {
    values
        .lock()
        .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<BTreeMap<String, Value>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(lock(&self.values)?.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        lock(&self.values)?.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.values)?.remove(key);
        Ok(())
    }
}

/// Single JSON object on disk, rewritten in full on every change.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, Value>>,
}

impl JsonFileStore {
    /// Opens the file, starting empty when it does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
                path: path.clone(),
                source,
            })?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        Ok(Self {
            path,
            values: Mutex::new(values),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes a sibling temp file and renames it over the store file.
    fn flush(&self, values: &BTreeMap<String, Value>) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(values).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, bytes).map_err(|source| StoreError::Io {
            path: staging.clone(),
            source,
        })?;
        fs::rename(&staging, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(lock(&self.values)?.get(key).cloned())
    }

    fn put(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut guard = lock(&self.values)?;
        let mut next = guard.clone();
        next.insert(key.to_string(), value);
        self.flush(&next)?;
        *guard = next;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut guard = lock(&self.values)?;
        if !guard.contains_key(key) {
            return Ok(());
        }
        let mut next = guard.clone();
        next.remove(key);
        self.flush(&next)?;
        *guard = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        {
            let store = JsonFileStore::open(&path).expect("store opens");
            store.put(THEME_KEY, json!("dark")).expect("put succeeds");
            store.put(ALERTS_MUTED_KEY, json!(true)).expect("put succeeds");
            store.remove(ALERTS_MUTED_KEY).expect("remove succeeds");
        }

        let reopened = JsonFileStore::open(&path).expect("store reopens");
        assert_eq!(reopened.get(THEME_KEY).expect("get"), Some(json!("dark")));
        assert_eq!(reopened.get(ALERTS_MUTED_KEY).expect("get"), None);
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        fs::write(&path, b"[1, 2").expect("write fixture");
        let err = JsonFileStore::open(&path).expect_err("corrupt file rejected");
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("store.json");
        let store = JsonFileStore::open(&path).expect("missing file opens empty");

        let err = store.put(THEME_KEY, json!("dark")).expect_err("parent dir is missing");
        assert!(matches!(err, StoreError::Io { .. }));
        assert_eq!(store.get(THEME_KEY).expect("get"), None);
    }

    #[test]
    fn flush_leaves_no_staging_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("store.json");
        let store = JsonFileStore::open(&path).expect("store opens");
        store.put(THEME_KEY, json!("light")).expect("put succeeds");
        assert!(path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }
}
