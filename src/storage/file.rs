use super::{KeyValueStore, StorageError};
use serde_json::{Map, Value};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{debug, warn};

const STORAGE_FILE: &str = "storage.json";

enum Contents {
    Intact(Map<String, Value>),
    Discarded,
}

impl Contents {
    fn into_entries(self) -> Map<String, Value> {
        match self {
            Self::Intact(entries) => entries,
            Self::Discarded => Map::new(),
        }
    }
}

/// Store backed by a single JSON object file inside a data directory.
///
/// Every write replaces the file through a temporary sibling and a rename, so
/// readers never observe a half-written object. The directory is created on the
/// first write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    #[must_use]
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(STORAGE_FILE),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored object. An unreadable file reads as empty and is
    /// reported as `Discarded` so the caller rewrites it.
    fn read(&self) -> Result<Contents, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Contents::Intact(Map::new()));
            }
            Err(err) => return Err(err.into()),
        };

        if contents.trim().is_empty() {
            return Ok(Contents::Intact(Map::new()));
        }

        match serde_json::from_str(&contents) {
            Ok(entries) => Ok(Contents::Intact(entries)),
            Err(err) => {
                warn!(
                    "discarding unreadable storage file {}: {err}",
                    self.path.display()
                );
                Ok(Contents::Discarded)
            }
        }
    }

    fn write(&self, entries: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(entries)?)?;
        fs::rename(&tmp, &self.path)?;

        debug!("storage written: {}", self.path.display());

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let entries = self.read()?.into_entries();
        Ok(entries.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        let mut entries = self.read()?.into_entries();
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Poisoned)?;
        match self.read()? {
            Contents::Intact(mut entries) => {
                if entries.remove(key).is_some() {
                    self.write(&entries)?;
                }
            }
            Contents::Discarded => self.write(&Map::new())?,
        }
        Ok(())
    }
}
