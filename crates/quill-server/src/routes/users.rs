//! User routes: `/users/*`
//!
//! Handles sign up, sign in, and sign out. Failed submissions re-render the
//! form with `422` and keep the username.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use quill_core::error::{AuthError, SignupError};
use quill_core::session::{Flash, Session};
use serde::Deserialize;
use tracing::{info, warn};

use super::{page, redirect_with};
use crate::error::AppError;
use crate::session::{CurrentSession, SessionChange};
use crate::state::AppState;
use crate::templates;

/// Build the `/users` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signup", get(signup_form).post(signup))
        .route("/signin", get(signin_form).post(signin))
        .route("/signout", post(signout))
}

// ── Request types ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

#[derive(Deserialize)]
pub struct SigninForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

fn signed_in(session: Session, flash: Flash) -> Response {
    let mut response = redirect_with("/", flash);
    response
        .extensions_mut()
        .insert(SessionChange::SignIn(session));
    response
}

// ── Handlers ─────────────────────────────────────────────────────────

async fn signup_form(Extension(current): Extension<CurrentSession>) -> Response {
    page(StatusCode::OK, templates::signup(&current, "", None))
}

/// Register a user and sign them in.
async fn signup(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    match state
        .guard
        .register(&form.username, &form.password, &form.confirm_password)
        .await
    {
        Ok(session) => {
            info!(username = %form.username, "user signed up");
            Ok(signed_in(session, Flash::signed_up()))
        }
        Err(SignupError::Invalid(invalid)) => Ok(page(
            StatusCode::UNPROCESSABLE_ENTITY,
            templates::signup(&current, &form.username, Some(invalid.message())),
        )),
        Err(err) => Err(err.into()),
    }
}

async fn signin_form(Extension(current): Extension<CurrentSession>) -> Response {
    page(StatusCode::OK, templates::signin(&current, "", None))
}

/// Check credentials and sign the user in.
async fn signin(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<SigninForm>,
) -> Result<Response, AppError> {
    match state
        .guard
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(session) => {
            info!(username = %form.username, "user signed in");
            Ok(signed_in(session, Flash::welcome()))
        }
        Err(err @ AuthError::InvalidCredentials) => {
            warn!(username = %form.username, "sign-in rejected");
            Ok(page(
                StatusCode::UNPROCESSABLE_ENTITY,
                templates::signin(&current, &form.username, Some(&err.to_string())),
            ))
        }
        Err(err) => Err(err.into()),
    }
}

/// Sign out the current user.
async fn signout(Extension(current): Extension<CurrentSession>) -> Response {
    if let Some(username) = current.session.username() {
        info!(username = %username, "user signed out");
    }
    let mut response = redirect_with("/", Flash::signed_out());
    response.extensions_mut().insert(SessionChange::SignOut);
    response
}
