//! HTTP route handlers for `Quill`.
//!
//! Routes are organized by subsystem:
//! - `documents`: listing, viewing, and editing documents
//! - `users`: sign up, sign in, sign out

pub mod documents;
pub mod users;

use std::sync::Arc;

use axum::http::{HeaderValue, StatusCode};
use axum::middleware as axum_mw;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Extension, Router};
use quill_core::session::Flash;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::session::{FlashShown, SetFlash, session_middleware};
use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/users", users::router())
        .merge(documents::router())
        .layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// A rendered page. Rendering the layout consumes any pending flash.
pub(crate) fn page(status: StatusCode, html: String) -> Response {
    (status, Extension(FlashShown), Html(html)).into_response()
}

/// A `303 See Other` carrying a flash for the next page.
pub(crate) fn redirect_with(to: &str, flash: Flash) -> Response {
    (Extension(SetFlash(flash)), Redirect::to(to)).into_response()
}
