//! Signup validation, sign-in, and the signed-in guard.
//!
//! A session moves `SignedOut -> SignedIn` on a successful [`AuthGuard::register`]
//! or [`AuthGuard::authenticate`], and back on explicit sign-out. There is no
//! expiry here.

use std::sync::Arc;

use tracing::debug;

use crate::credentials::CredentialStore;
use crate::error::{AuthError, CredentialError, GuardError, SignupError, ValidationError};
use crate::password;
use crate::session::Session;

/// Minimum password length in characters.
pub const PASSWORD_MIN_LEN: usize = 5;
/// Maximum password length in characters.
pub const PASSWORD_MAX_LEN: usize = 20;

/// Registers and signs in users against a [`CredentialStore`].
#[derive(Debug, Clone)]
pub struct AuthGuard {
    credentials: Arc<CredentialStore>,
}

impl AuthGuard {
    #[must_use]
    pub fn new(credentials: Arc<CredentialStore>) -> Self {
        Self { credentials }
    }

    /// The underlying credential store.
    #[must_use]
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.credentials
    }

    /// Check signup input. The first failing rule wins:
    ///
    /// 1. empty username
    /// 2. username already registered
    /// 3. password not 5 to 20 word characters, or confirmation differs
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] if the store cannot be consulted.
    pub async fn validate_signup(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Option<ValidationError>, CredentialError> {
        if username.is_empty() {
            return Ok(Some(ValidationError::new("Username can not be empty.")));
        }
        if self.credentials.contains(username).await? {
            return Ok(Some(ValidationError::new("Username already exists.")));
        }
        if !is_valid_password(password) || password != confirm_password {
            return Ok(Some(ValidationError::new("password is invalid.")));
        }
        Ok(None)
    }

    /// Validate, hash, and save a new user; return the signed-in session.
    ///
    /// # Errors
    ///
    /// Returns [`SignupError::Invalid`] with the user-facing message when
    /// validation fails (nothing is saved), or [`SignupError::Credentials`]
    /// when the store fails.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<Session, SignupError> {
        if let Some(invalid) = self
            .validate_signup(username, password, confirm_password)
            .await?
        {
            return Err(invalid.into());
        }
        let hashed = password::hash(password)?;
        self.credentials.save(username, &hashed).await?;
        debug!(username, "user registered");
        Ok(Session::signed_in(username))
    }

    /// Verify a username and password pair.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] unless the username exists
    /// and the password matches its stored hash.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        let Some(hashed) = self.credentials.lookup(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !password::verify(password, &hashed) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(Session::signed_in(username))
    }
}

/// 5 to 20 ASCII word characters (letters, digits, underscore).
fn is_valid_password(password: &str) -> bool {
    (PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&password.len())
        && password
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Whether the session carries a username.
#[must_use]
pub fn is_signed_in(session: &Session) -> bool {
    session.username().is_some()
}

/// Require a signed-in session, returning its username.
///
/// # Errors
///
/// Returns [`GuardError::NotAuthenticated`] for a signed-out session.
pub fn require_signed_in(session: &Session) -> Result<&str, GuardError> {
    session.username().ok_or(GuardError::NotAuthenticated)
}
