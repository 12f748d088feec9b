use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{PageError, Result};

/// Flat string-keyed durable medium. One key holds one serialized collection.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Process-local backend, optionally capped to mimic a storage quota.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| PageError::Storage("memory backend lock poisoned".into()))
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.lock()?;
        if let Some(quota) = self.quota_bytes {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            if others + key.len() + value.len() > quota {
                return Err(PageError::Storage(format!(
                    "quota of {} bytes exceeded writing '{}'",
                    quota, key
                )));
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform data directory, e.g. `~/.local/share/pagebook`.
    pub fn default_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pagebook")
            .map(|dirs| dirs.data_dir().to_path_buf())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            return Err(PageError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    // Written to a sibling temp file and renamed so a reader never sees half
    // a collection.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn memory_backend_round_trips() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get("k").unwrap(), None);
        backend.set("k", "v").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("v"));
        backend.set("k", "w").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("w"));
    }

    #[test]
    fn memory_backend_enforces_quota() {
        let backend = MemoryBackend::with_quota(10);
        backend.set("a", "12345").unwrap();
        let err = backend.set("b", "123456789").unwrap_err();
        assert!(matches!(err, PageError::Storage(_)));
        // Overwriting the same key only counts the new value.
        backend.set("a", "123456789").unwrap();
    }

    #[test]
    fn file_backend_writes_one_file_per_key() {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::new(tmp.path().join("data"));
        backend.set("pagebook_pages", "[]").unwrap();

        let path = tmp.path().join("data").join("pagebook_pages.json");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "[]");
        assert_eq!(backend.get("pagebook_pages").unwrap().as_deref(), Some("[]"));
        assert_eq!(backend.get("missing").unwrap(), None);
    }

    #[test]
    fn file_backend_rejects_path_like_keys() {
        let tmp = TempDir::new().unwrap();
        let backend = FileBackend::new(tmp.path());
        assert!(backend.set("../escape", "x").is_err());
        assert!(backend.get("").is_err());
    }
}
