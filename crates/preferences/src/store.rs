use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Failed to access preferences file {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed preferences file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Preference store lock poisoned")]
    Poisoned,
}

/// Local key-value storage for display preferences
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self.values.read().map_err(|_| PreferenceError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .write()
            .map_err(|_| PreferenceError::Poisoned)?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Preferences kept as a flat JSON object on disk, rewritten on every `set`
pub struct FilePreferenceStore {
    path: PathBuf,
    values: RwLock<HashMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`. A missing file reads as empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PreferenceError> {
        let path = path.as_ref().to_path_buf();
        let values = match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(?path, "no preferences file yet");
                HashMap::new()
            }
            Err(source) => return Err(PreferenceError::Io { path, source }),
        };

        Ok(Self {
            path,
            values: RwLock::new(values),
        })
    }

    fn persist(&self, values: &HashMap<String, String>) -> Result<(), PreferenceError> {
        let contents = serde_json::to_string_pretty(values)?;
        fs::write(&self.path, contents).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let values = self.values.read().map_err(|_| PreferenceError::Poisoned)?;
        Ok(values.get(key).cloned())
    }

    /// Memory only changes once the file write succeeds
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let mut values = self.values.write().map_err(|_| PreferenceError::Poisoned)?;
        let mut next = values.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(&next)?;
        *values = next;
        Ok(())
    }
}
