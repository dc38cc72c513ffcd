//! Storage backend abstraction for `Quill`.
//!
//! This crate defines the [`StorageBackend`] trait: a flat key-value storage
//! interface that knows nothing about documents, users, or rendering. The
//! document store and the credential store in `quill-core` both sit on top
//! of a backend.
//!
//! Two implementations are provided:
//!
//! - [`FsBackend`] : production default, one file per key inside a directory
//! - [`MemoryBackend`] : in-memory, for testing only

mod error;
mod fs_backend;
mod memory;

pub use error::StorageError;
pub use fs_backend::FsBackend;
pub use memory::MemoryBackend;

/// A pluggable, flat key-value storage backend.
///
/// Keys are plain names without separators (e.g. `about.md`, `users.json`).
/// Values are opaque byte arrays.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait StorageBackend: Send + Sync + 'static {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails, or
    /// [`StorageError::InvalidKey`] if the key is not a plain name.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store a key-value pair, replacing any existing value.
    ///
    /// Readers observe either the previous value or the new one, never a
    /// partially written value.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete a key. Deleting a non-existent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the underlying backend fails.
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// List all keys that start with the given prefix, sorted
    /// lexicographically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Move the value stored under `from` to `to`, replacing any value
    /// already stored under `to`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Missing`] if `from` does not exist, or
    /// [`StorageError::Rename`] if the underlying backend fails.
    async fn rename(&self, from: &str, to: &str) -> Result<(), StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`get`](StorageBackend::get) and checks
    /// for `Some`. Backends may override this with a more efficient check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Reject keys that could escape a flat namespace.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] for empty keys, keys starting with
/// `.` (which covers `.` and `..`), and keys containing `/`, `\` or NUL.
pub fn check_key(key: &str) -> Result<(), StorageError> {
    let reason = if key.is_empty() {
        "key is empty"
    } else if key == "." || key == ".." {
        "key refers to a directory"
    } else if key.starts_with('.') {
        "key is hidden"
    } else if key.contains(['/', '\\', '\0']) {
        "key contains a path separator"
    } else {
        return Ok(());
    };
    Err(StorageError::InvalidKey {
        key: key.to_owned(),
        reason: reason.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names_are_valid_keys() {
        assert!(check_key("about.md").is_ok());
        assert!(check_key("notes").is_ok());
        assert!(check_key("v1.2.notes.txt").is_ok());
    }

    #[test]
    fn hidden_keys_are_rejected() {
        for key in [".notes.txt", ".env", "..md"] {
            assert!(
                matches!(check_key(key), Err(StorageError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }

    #[test]
    fn traversal_keys_are_rejected() {
        for key in ["", ".", "..", "../users.json", "a/b.txt", "a\\b.txt"] {
            assert!(
                matches!(check_key(key), Err(StorageError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }
}
