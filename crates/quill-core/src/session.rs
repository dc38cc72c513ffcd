//! Session state and one-shot flash messages.
//!
//! The core never owns a session. Callers pass the current [`Session`] in
//! and get [`Flash`] messages back; storing both between requests is the
//! boundary's concern.

use serde::{Deserialize, Serialize};

/// Per-client state: at most one signed-in username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    username: Option<String>,
}

impl Session {
    /// A session with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    /// A session signed in as `username`.
    #[must_use]
    pub fn signed_in(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
        }
    }

    /// The signed-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Whether a flash reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

/// A message for the next rendered page only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Error,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn updated(name: &str) -> Self {
        Self::success(format!("{name} has been updated."))
    }

    #[must_use]
    pub fn created(name: &str) -> Self {
        Self::success(format!("{name} was created."))
    }

    #[must_use]
    pub fn deleted(name: &str) -> Self {
        Self::success(format!("{name} was deleted."))
    }

    #[must_use]
    pub fn duplicated(name: &str, copy: &str) -> Self {
        Self::success(format!("{name} was duplicated as {copy}."))
    }

    #[must_use]
    pub fn renamed() -> Self {
        Self::success("Filename is updated")
    }

    #[must_use]
    pub fn signed_up() -> Self {
        Self::success("Sign up succeeded! Welcome!")
    }

    #[must_use]
    pub fn welcome() -> Self {
        Self::success("Welcome!")
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self::success("You have been signed out.")
    }

    #[must_use]
    pub fn missing(name: &str) -> Self {
        Self::error(format!("{name} does not exist."))
    }
}

impl<E: std::error::Error> From<&E> for Flash {
    fn from(err: &E) -> Self {
        Self::error(err.to_string())
    }
}
