//! File-backed `ProgressStore`.
//!
//! All documents live in one JSON object `{ key: document }`. Every write
//! rewrites the file through a sibling temporary file that is renamed into
//! place, so a crash never leaves a half-written file behind.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use tracing::warn;
use trivia_core::error::DomainError;
use trivia_core::store::ProgressStore;

type Documents = BTreeMap<String, String>;

/// Stores progress documents in a single JSON file.
#[derive(Debug)]
pub struct JsonFileProgressStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

fn io_error(action: &str, path: &Path, err: &std::io::Error) -> DomainError {
    DomainError::Infrastructure(format!("failed to {action} {}: {err}", path.display()))
}

impl JsonFileProgressStore {
    /// Creates a store over `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_documents(&self) -> Result<Documents, DomainError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Documents::new()),
            Err(err) => return Err(io_error("read", &self.path, &err)),
        };
        match serde_json::from_str(&raw) {
            Ok(documents) => Ok(documents),
            Err(err) => {
                warn!(
                    path = %self.path.display(),
                    error = %err,
                    "progress file is malformed; treating it as empty"
                );
                Ok(Documents::new())
            }
        }
    }

    fn write_documents(&self, documents: &Documents) -> Result<(), DomainError> {
        let raw = serde_json::to_string_pretty(documents).map_err(|e| {
            DomainError::Infrastructure(format!("progress serialization failed: {e}"))
        })?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, raw).map_err(|e| io_error("write", &tmp, &e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error("replace", &self.path, &e))
    }

    fn modify(&self, change: impl FnOnce(&mut Documents)) -> Result<(), DomainError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut documents = self.read_documents()?;
        change(&mut documents);
        self.write_documents(&documents)
    }
}

impl ProgressStore for JsonFileProgressStore {
    fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.read_documents()?.remove(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.modify(|documents| {
            documents.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.modify(|documents| {
            documents.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.read_documents()?.into_keys().collect())
    }
}
