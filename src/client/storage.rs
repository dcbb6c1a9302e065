//! Durable key/value slots for the client session.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session storage io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session storage format: {0}")]
    Format(#[from] serde_json::Error),

    #[error("session storage lock poisoned")]
    Poisoned,
}

/// Synchronous string slots, shaped like browser local storage.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

type Slots = BTreeMap<String, String>;

fn lock(slots: &Mutex<Slots>) -> Result<MutexGuard<'_, Slots>, StorageError> {
    slots.lock().map_err(|_| StorageError::Poisoned)
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<Slots>,
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.slots)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.slots)?.remove(key);
        Ok(())
    }
}

/// Slots persisted as one JSON object on disk, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    slots: Mutex<Slots>,
}

/// Reads the slot object. Non-string values are kept as their JSON text so the
/// session layer sees them and rejects them; anything that is not an object is
/// unreadable as a whole.
fn decode_slots(raw: &str) -> Option<Slots> {
    match serde_json::from_str::<Value>(raw).ok()? {
        Value::Object(map) => Some(
            map.into_iter()
                .map(|(k, v)| match v {
                    Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
        ),
        _ => None,
    }
}

impl FileStorage {
    /// Opens `path`, starting empty when the file does not exist yet.
    ///
    /// An unreadable file is discarded and replaced with an empty one.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let storage = Self {
            path,
            slots: Mutex::new(Slots::new()),
        };
        if raw.trim().is_empty() {
            return Ok(storage);
        }
        match decode_slots(&raw) {
            Some(slots) => Ok(Self {
                slots: Mutex::new(slots),
                ..storage
            }),
            None => {
                warn!(path = %storage.path.display(), "session file is corrupt; discarding");
                storage.flush(&Slots::new())?;
                Ok(storage)
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, slots: &Slots) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(slots)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Applies `change` to a copy and keeps it only once it is on disk.
    fn update<F>(&self, change: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Slots),
    {
        let mut slots = lock(&self.slots)?;
        let mut next = slots.clone();
        change(&mut next);
        self.flush(&next)?;
        *slots = next;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|slots| {
            slots.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|slots| {
            slots.remove(key);
        })
    }
}
