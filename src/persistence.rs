use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const STORAGE_PREFIX: &str = "campaign_client.";
pub const PROBE_KEY: &str = "__storage_probe__";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend rejected write: {0}")]
    WriteRejected(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

/// Raw string-to-string store underneath the adapter.
///
/// Mirrors the surface of a browser's persistent storage: every operation may
/// fail at runtime (quota, restricted context), not just at open time.
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
    fn item_keys(&self) -> Vec<String>;
}

/// Volatile backend for tests and storage-restricted contexts.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: BTreeMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }

    fn item_keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

/// Single-file backend: one JSON object holding every item.
///
/// The whole map is rewritten on each mutation. Items are short strings
/// (tokens, preferences), so this stays cheap.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    items: BTreeMap<String, String>,
}

impl FileBackend {
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| StorageError::Unavailable(format!("corrupt store file: {e}")))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(StorageError::Unavailable(e.to_string())),
        };
        Ok(Self { path, items })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.items)
            .map_err(|e| StorageError::WriteRejected(e.to_string()))?;
        fs::write(&self.path, raw).map_err(|e| StorageError::WriteRejected(e.to_string()))
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        self.flush()
    }

    fn item_keys(&self) -> Vec<String> {
        self.items.keys().cloned().collect()
    }
}

/// Namespacing + JSON layer over a [`StorageBackend`].
///
/// Failures never escape: `set`/`remove` report a bool, `get` falls back to
/// the supplied default. Callers must not need a recovery path for storage.
#[derive(Debug)]
pub struct StorageAdapter<B> {
    backend: B,
    prefix: String,
}

impl<B: StorageBackend> StorageAdapter<B> {
    pub fn new(backend: B) -> Self {
        Self::with_prefix(backend, STORAGE_PREFIX)
    }

    pub fn with_prefix(backend: B, prefix: impl Into<String>) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    /// Returns `default` when the key is absent, unparsable, or the backend
    /// is broken.
    pub fn get<V: DeserializeOwned>(&self, key: &str, default: V) -> V {
        match self.backend.get_item(&self.namespaced(key)) {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("[STORAGE] unparsable value under {key}: {e}");
                    default
                }
            },
            None => default,
        }
    }

    pub fn set<V: Serialize>(&mut self, key: &str, value: &V) -> bool {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("[STORAGE] cannot serialize value for {key}: {e}");
                return false;
            }
        };
        match self.backend.set_item(&self.namespaced(key), &raw) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[STORAGE] write failed for {key}: {e}");
                false
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        match self.backend.remove_item(&self.namespaced(key)) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("[STORAGE] remove failed for {key}: {e}");
                false
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.backend.get_item(&self.namespaced(key)).is_some()
    }

    /// Keys under this adapter's namespace, prefix stripped.
    pub fn keys(&self) -> Vec<String> {
        self.backend
            .item_keys()
            .into_iter()
            .filter_map(|k| k.strip_prefix(&self.prefix).map(str::to_string))
            .collect()
    }

    /// Serialized size of the stored value in bytes, 0 when absent.
    pub fn size_of(&self, key: &str) -> usize {
        self.backend
            .get_item(&self.namespaced(key))
            .map(|raw| raw.len())
            .unwrap_or(0)
    }

    /// Real write-then-delete probe. The backend may exist but reject
    /// writes, so feature detection alone is not trusted.
    pub fn is_available(&mut self) -> bool {
        let probe = self.namespaced(PROBE_KEY);
        if self.backend.set_item(&probe, "1").is_err() {
            return false;
        }
        self.backend.remove_item(&probe).is_ok()
    }
}
