//! Document routes: listing, viewing, creating, editing, renaming,
//! duplicating, and deleting.
//!
//! Everything except the listing and the viewer requires a signed-in session.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use quill_core::auth::require_signed_in;
use quill_core::document::validate_name;
use quill_core::error::DocumentError;
use quill_core::render::{self, ContentType};
use quill_core::session::Flash;
use serde::Deserialize;
use tracing::info;

use super::{page, redirect_with};
use crate::error::AppError;
use crate::session::CurrentSession;
use crate::state::AppState;
use crate::templates;

/// Build the document router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_documents))
        .route("/new", get(new_document_form))
        .route("/create", post(create_document))
        .route("/{filename}", get(view_document).post(update_document))
        .route("/{filename}/edit", get(edit_document_form))
        .route("/{filename}/delete", post(delete_document))
        .route("/{filename}/duplicate", post(duplicate_document))
        .route(
            "/{filename}/rename",
            get(rename_document_form).post(rename_document),
        )
}

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateForm {
    #[serde(default)]
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct RenameForm {
    #[serde(default)]
    pub new_name: String,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List every document.
async fn list_documents(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Response, AppError> {
    let files = state.documents.list().await?;
    Ok(page(StatusCode::OK, templates::index(&current, &files)))
}

/// Show a document: text verbatim, markdown as HTML.
async fn view_document(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let content = state.documents.read(&filename).await?;
    let rendered = render::render_document(&filename, &content)?;

    Ok(match rendered.content_type {
        ContentType::PlainText => (
            [(header::CONTENT_TYPE, rendered.content_type.as_mime())],
            rendered.body,
        )
            .into_response(),
        ContentType::Html => page(
            StatusCode::OK,
            templates::document(&current, &filename, &String::from_utf8_lossy(&rendered.body)),
        ),
    })
}

/// Show the edit form.
async fn edit_document_form(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    require_signed_in(&current.session)?;
    let content = state.documents.read(&filename).await?;
    Ok(page(
        StatusCode::OK,
        templates::edit(&current, &filename, &String::from_utf8_lossy(&content)),
    ))
}

/// Replace a document's content.
async fn update_document(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
    Form(form): Form<UpdateForm>,
) -> Result<Response, AppError> {
    let username = require_signed_in(&current.session)?;
    state
        .documents
        .write(&filename, form.content.as_bytes())
        .await?;
    info!(name = %filename, user = %username, "document updated");
    Ok(redirect_with("/", Flash::updated(&filename)))
}

/// Show the create form.
async fn new_document_form(
    Extension(current): Extension<CurrentSession>,
) -> Result<Response, AppError> {
    require_signed_in(&current.session)?;
    Ok(page(StatusCode::OK, templates::new_document(&current, "", None)))
}

/// Create an empty document.
async fn create_document(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Form(form): Form<CreateForm>,
) -> Result<Response, AppError> {
    let username = require_signed_in(&current.session)?;
    let filename = form.filename;

    let rejected = |message: &str| {
        page(
            StatusCode::UNPROCESSABLE_ENTITY,
            templates::new_document(&current, &filename, Some(message)),
        )
    };

    if let Some(invalid) = validate_name(&filename) {
        return Ok(rejected(invalid.message()));
    }
    match state.documents.create_empty(&filename).await {
        Ok(()) => {}
        Err(
            err @ (DocumentError::AlreadyExists { .. } | DocumentError::InvalidName { .. }),
        ) => return Ok(rejected(&err.to_string())),
        Err(err) => return Err(err.into()),
    }

    info!(name = %filename, user = %username, "document created");
    Ok(redirect_with("/", Flash::created(&filename)))
}

/// Delete a document.
async fn delete_document(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let username = require_signed_in(&current.session)?;
    state.documents.delete(&filename).await?;
    info!(name = %filename, user = %username, "document deleted");
    Ok(redirect_with("/", Flash::deleted(&filename)))
}

/// Copy a document and continue to renaming the copy.
async fn duplicate_document(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let username = require_signed_in(&current.session)?;
    let copy = state.documents.duplicate(&filename).await?;
    info!(name = %filename, copy = %copy, user = %username, "document duplicated");
    Ok(redirect_with(
        &format!("{}/rename", templates::href(&copy)),
        Flash::duplicated(&filename, &copy),
    ))
}

/// Show the rename form, prefilled with the current name.
async fn rename_document_form(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    require_signed_in(&current.session)?;
    if !state.documents.exists(&filename).await? {
        return Err(DocumentError::NotFound { name: filename }.into());
    }
    Ok(page(
        StatusCode::OK,
        templates::rename(&current, &filename, &filename, None),
    ))
}

/// Rename a document.
async fn rename_document(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentSession>,
    Path(filename): Path<String>,
    Form(form): Form<RenameForm>,
) -> Result<Response, AppError> {
    let username = require_signed_in(&current.session)?;
    let new_name = form.new_name;

    let rejected = |message: &str| {
        page(
            StatusCode::UNPROCESSABLE_ENTITY,
            templates::rename(&current, &filename, &new_name, Some(message)),
        )
    };

    if let Some(invalid) = validate_name(&new_name) {
        return Ok(rejected(invalid.message()));
    }
    match state.documents.rename(&filename, &new_name).await {
        Ok(()) => {}
        Err(
            err @ (DocumentError::AlreadyExists { .. } | DocumentError::InvalidName { .. }),
        ) => return Ok(rejected(&err.to_string())),
        Err(err) => return Err(err.into()),
    }

    info!(old = %filename, new = %new_name, user = %username, "document renamed");
    Ok(redirect_with("/", Flash::renamed()))
}
