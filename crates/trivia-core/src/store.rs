//! Durable progress storage abstraction.

use crate::error::DomainError;

/// Key/value document storage for session progress that must survive a
/// reload (answered sets, roster snapshot).
///
/// Each `save` replaces the whole document under `key` atomically; callers
/// perform read-modify-write per mutation.
pub trait ProgressStore: Send + Sync {
    /// Load the document stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Replace the document stored under `key`.
    fn save(&self, key: &str, value: &str) -> Result<(), DomainError>;

    /// Remove the document under `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), DomainError>;

    /// List every stored key.
    fn keys(&self) -> Result<Vec<String>, DomainError>;
}
