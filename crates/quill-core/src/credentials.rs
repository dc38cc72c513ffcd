//! The credential store: username to password hash.
//!
//! The whole mapping is persisted as one JSON object under a single storage
//! key and is loaded and rewritten as a unit. Only hashes are stored.
//!
//! # Concurrency
//!
//! `save` is a load-modify-save cycle. Saves through the same
//! [`CredentialStore`] are serialized by a mutex, so two signups in this
//! process cannot lose each other's entry. Separate processes sharing the
//! same file still race and the last writer wins.

use std::collections::BTreeMap;
use std::sync::Arc;

use quill_storage::StorageBackend;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::CredentialError;

/// Storage key of the credential record.
pub const CREDENTIALS_KEY: &str = "users.json";

/// Persisted mapping of usernames to password hashes.
pub type Credentials = BTreeMap<String, String>;

/// Loads and saves the username to hashed-password mapping.
pub struct CredentialStore {
    backend: Arc<dyn StorageBackend>,
    /// Serializes load-modify-save cycles.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Create a credential store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            write_lock: Mutex::new(()),
        }
    }

    /// Write an empty record if none exists yet.
    ///
    /// This is the only place a missing record counts as "no users". Returns
    /// `true` when a record was created.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Storage`] if the backend fails.
    pub async fn initialize(&self) -> Result<bool, CredentialError> {
        let _guard = self.write_lock.lock().await;
        if self.backend.exists(CREDENTIALS_KEY).await? {
            return Ok(false);
        }
        self.persist(&Credentials::new()).await?;
        Ok(true)
    }

    /// Load the whole mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StoreUnavailable`] if the record is missing
    /// or is not a JSON object of strings.
    pub async fn load(&self) -> Result<Credentials, CredentialError> {
        let bytes = self
            .backend
            .get(CREDENTIALS_KEY)
            .await
            .map_err(|e| CredentialError::StoreUnavailable {
                reason: e.to_string(),
            })?
            .ok_or_else(|| CredentialError::StoreUnavailable {
                reason: format!("'{CREDENTIALS_KEY}' does not exist"),
            })?;

        serde_json::from_slice(&bytes).map_err(|e| CredentialError::StoreUnavailable {
            reason: format!("'{CREDENTIALS_KEY}' is corrupt: {e}"),
        })
    }

    /// Insert or overwrite one entry and rewrite the whole mapping.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StoreUnavailable`] if the current mapping
    /// cannot be loaded; nothing is written in that case.
    pub async fn save(&self, username: &str, hashed_password: &str) -> Result<(), CredentialError> {
        let _guard = self.write_lock.lock().await;
        let mut credentials = self.load().await?;
        credentials.insert(username.to_owned(), hashed_password.to_owned());
        self.persist(&credentials).await?;
        debug!(username, users = credentials.len(), "credentials saved");
        Ok(())
    }

    /// Check whether a username is registered.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StoreUnavailable`] if the mapping cannot be
    /// loaded.
    pub async fn contains(&self, username: &str) -> Result<bool, CredentialError> {
        Ok(self.load().await?.contains_key(username))
    }

    /// Return the stored hash for a username.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::StoreUnavailable`] if the mapping cannot be
    /// loaded.
    pub async fn lookup(&self, username: &str) -> Result<Option<String>, CredentialError> {
        Ok(self.load().await?.remove(username))
    }

    async fn persist(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        let bytes =
            serde_json::to_vec_pretty(credentials).map_err(|e| CredentialError::StoreUnavailable {
                reason: format!("failed to serialize credentials: {e}"),
            })?;
        self.backend.put(CREDENTIALS_KEY, &bytes).await?;
        Ok(())
    }
}
