//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open the storage backend at the given path.
    #[error("failed to open storage at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// Failed to read a value from storage.
    #[error("failed to read key '{key}': {reason}")]
    Read { key: String, reason: String },

    /// Failed to write a value to storage.
    #[error("failed to write key '{key}': {reason}")]
    Write { key: String, reason: String },

    /// Failed to delete a key from storage.
    #[error("failed to delete key '{key}': {reason}")]
    Delete { key: String, reason: String },

    /// Failed to list keys with the given prefix.
    #[error("failed to list keys with prefix '{prefix}': {reason}")]
    List { prefix: String, reason: String },

    /// Failed to move a value from one key to another.
    #[error("failed to rename key '{from}' to '{to}': {reason}")]
    Rename {
        from: String,
        to: String,
        reason: String,
    },

    /// The key an operation requires does not exist.
    #[error("key not found: '{key}'")]
    Missing { key: String },

    /// A storage key is not a plain name.
    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },
}
