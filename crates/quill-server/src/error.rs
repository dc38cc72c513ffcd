//! HTTP error types for the `Quill` server.
//!
//! Maps domain errors from `quill-core` into HTTP responses. Rejections a user
//! can act on (missing document, not signed in) redirect to the listing with
//! the message as an error flash; storage failures answer `500`.

use axum::Extension;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use quill_core::error::{
    AuthError, CredentialError, DocumentError, GuardError, RenderError, SignupError,
};
use quill_core::session::Flash;

use crate::session::SetFlash;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Redirect to the listing and flash the message.
    Rejected(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::Rejected(message) => {
                (Extension(SetFlash(Flash::error(message))), Redirect::to("/")).into_response()
            }
            Self::Internal(message) => {
                tracing::error!(error = %message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again later.",
                )
                    .into_response()
            }
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        match err {
            DocumentError::NotFound { .. }
            | DocumentError::AlreadyExists { .. }
            | DocumentError::InvalidName { .. } => Self::Rejected(err.to_string()),
            DocumentError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<GuardError> for AppError {
    fn from(err: GuardError) -> Self {
        Self::Rejected(err.to_string())
    }
}

impl From<RenderError> for AppError {
    fn from(err: RenderError) -> Self {
        Self::Rejected(err.to_string())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::Rejected(err.to_string()),
            AuthError::Credentials(inner) => inner.into(),
        }
    }
}

impl From<SignupError> for AppError {
    fn from(err: SignupError) -> Self {
        match err {
            SignupError::Invalid(invalid) => Self::Rejected(invalid.to_string()),
            SignupError::Credentials(inner) => inner.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::header;
    use quill_storage::StorageError;

    #[test]
    fn missing_document_redirects_with_flash() {
        let err = AppError::from(DocumentError::NotFound {
            name: "notafile.txt".to_owned(),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");

        let flash = response.extensions().get::<SetFlash>().unwrap();
        assert_eq!(flash.0, Flash::missing("notafile.txt"));
    }

    #[test]
    fn guard_rejection_redirects_with_flash() {
        let response = AppError::from(GuardError::NotAuthenticated).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let flash = response.extensions().get::<SetFlash>().unwrap();
        assert_eq!(flash.0.message, "You must be signed in to do that.");
    }

    #[test]
    fn storage_failure_is_internal() {
        let err = AppError::from(DocumentError::Storage(StorageError::Read {
            key: "about.md".to_owned(),
            reason: "disk on fire".to_owned(),
        }));
        assert!(matches!(err, AppError::Internal(_)));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.extensions().get::<SetFlash>().is_none());
    }

    #[test]
    fn unavailable_credentials_are_internal() {
        let err = AppError::from(AuthError::Credentials(CredentialError::StoreUnavailable {
            reason: "missing".to_owned(),
        }));
        assert!(matches!(err, AppError::Internal(_)));
    }
}
