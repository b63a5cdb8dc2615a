use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use super::KeyValueStorage;

/// Keeps entries in a flat JSON object on disk, rewriting the whole file on
/// every change. A missing file reads as an empty store.
///
/// The file is read once, on first use. Later reads are served from memory
/// and writes go through to disk before the cached copy changes.
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStorage {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileStorage {
            path: path.as_ref().to_path_buf(),
            entries: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(format!("Failed to read '{}': {}", self.path.display(), e)),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw)
            .map_err(|e| format!("Failed to parse '{}': {}", self.path.display(), e))
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
            }
        }
        let serialized = serde_json::to_string_pretty(entries)
            .map_err(|e| format!("Failed to serialize storage: {}", e))?;
        fs::write(&self.path, serialized)
            .map_err(|e| format!("Failed to write '{}': {}", self.path.display(), e))
    }

    fn update(&self, f: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), String> {
        let mut cached = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = match cached.as_ref() {
            Some(entries) => entries.clone(),
            None => self.read_entries()?,
        };
        f(&mut entries);
        self.write_entries(&entries)?;
        *cached = Some(entries);
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        let mut cached = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if cached.is_none() {
            match self.read_entries() {
                Ok(entries) => *cached = Some(entries),
                Err(e) => {
                    warn!("Treating unreadable storage as empty: {}", e);
                    return None;
                }
            }
        }
        cached.as_ref().and_then(|entries| entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), String> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
