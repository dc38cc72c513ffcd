//! Shared application state for the `Quill` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. It holds the document store, the sign-in guard,
//! and the session cookie settings.

use std::sync::Arc;

use quill_core::auth::AuthGuard;
use quill_core::credentials::CredentialStore;
use quill_core::store::DocumentStore;
use quill_storage::StorageBackend;

use crate::session::SessionConfig;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Document CRUD over the data directory.
    pub documents: DocumentStore,
    /// Signup and sign-in against the credential store.
    pub guard: AuthGuard,
    /// Key and lifetime of session cookies.
    pub sessions: SessionConfig,
}

impl AppState {
    /// Build the state from a document backend and a credential backend.
    ///
    /// Session cookies use a random key until [`AppState::with_sessions`]
    /// supplies one.
    #[must_use]
    pub fn new(documents: Arc<dyn StorageBackend>, credentials: Arc<dyn StorageBackend>) -> Self {
        Self {
            documents: DocumentStore::new(documents),
            guard: AuthGuard::new(Arc::new(CredentialStore::new(credentials))),
            sessions: SessionConfig::ephemeral(),
        }
    }

    /// Replace the session cookie settings.
    #[must_use]
    pub fn with_sessions(mut self, sessions: SessionConfig) -> Self {
        self.sessions = sessions;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
