//! Error types for `quill-core`.
//!
//! Every error a boundary can surface to a user displays as the exact
//! user-facing message (`"notes.txt does not exist."`), so handlers can put
//! `err.to_string()` straight into a flash message. Errors never include
//! passwords or password hashes.

use quill_storage::StorageError;

/// Input rejected by filename or signup validation.
///
/// Carries the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The user-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// No document with this name exists in the store.
    #[error("{name} does not exist.")]
    NotFound { name: String },

    /// A document with the target name already exists.
    #[error("{name} already exisits.")]
    AlreadyExists { name: String },

    /// The name cannot address a document inside the store (path separators,
    /// a leading `.`).
    #[error("{name} is not a valid file name.")]
    InvalidName { name: String },

    /// The underlying storage backend failed.
    #[error("document storage error: {0}")]
    Storage(StorageError),
}

impl DocumentError {
    /// Map a backend error for the document `name`.
    pub(crate) fn from_storage(name: &str, err: StorageError) -> Self {
        match err {
            StorageError::InvalidKey { .. } => Self::InvalidName {
                name: name.to_owned(),
            },
            StorageError::Missing { .. } => Self::NotFound {
                name: name.to_owned(),
            },
            other => Self::Storage(other),
        }
    }
}

/// Errors from the content renderer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    /// The document's extension has no rendering mode.
    #[error("{name} can not be displayed.")]
    UnsupportedType { name: String },
}

/// Errors from the credential store.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The credential record is missing or cannot be parsed.
    #[error("credential store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// Password hashing failed.
    #[error("password hashing failed: {reason}")]
    Hashing { reason: String },

    /// The underlying storage backend failed.
    #[error("credential storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Errors from signing in.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("Invalid Credentials")]
    InvalidCredentials,

    /// The credential store could not be consulted.
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// Errors from signing up.
#[derive(Debug, thiserror::Error)]
pub enum SignupError {
    /// The username or password was rejected.
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The credential store could not be consulted or updated.
    #[error(transparent)]
    Credentials(#[from] CredentialError),
}

/// Rejection by the sign-in guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// The session carries no signed-in user.
    #[error("You must be signed in to do that.")]
    NotAuthenticated,
}
