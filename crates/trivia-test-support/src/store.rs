//! Test stores: in-memory `ProgressStore` implementations for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use trivia_core::error::DomainError;
use trivia_core::store::ProgressStore;

/// A progress store that keeps documents in memory. Clones of the documents
/// can be inspected, and documents can be planted to simulate prior sessions
/// or corruption.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    documents: Mutex<BTreeMap<String, String>>,
}

impl MemoryProgressStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a raw document under `key`, bypassing any validation.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn plant(&self, key: &str, raw: &str) {
        self.documents
            .lock()
            .unwrap()
            .insert(key.to_owned(), raw.to_owned());
    }

    /// Returns the raw document under `key`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn document(&self, key: &str) -> Option<String> {
        self.documents.lock().unwrap().get(key).cloned()
    }
}

impl ProgressStore for MemoryProgressStore {
    fn load(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.documents.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), DomainError> {
        self.documents
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DomainError> {
        self.documents.lock().unwrap().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, DomainError> {
        Ok(self.documents.lock().unwrap().keys().cloned().collect())
    }
}

/// A progress store whose every operation fails. Useful for checking that
/// persistence failures never abort bookkeeping.
#[derive(Debug)]
pub struct FailingProgressStore;

impl ProgressStore for FailingProgressStore {
    fn load(&self, _key: &str) -> Result<Option<String>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn save(&self, _key: &str, _value: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn remove(&self, _key: &str) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }

    fn keys(&self) -> Result<Vec<String>, DomainError> {
        Err(DomainError::Infrastructure("disk unavailable".into()))
    }
}
