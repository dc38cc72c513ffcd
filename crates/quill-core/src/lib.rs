//! Core library for `Quill`.
//!
//! Contains the document store, the content renderer, the credential store,
//! and the sign-in guard. This crate depends on `quill-storage` for the
//! storage backend trait and knows nothing about HTTP, cookies, or pages.
//! Sessions are plain values passed in by the caller; flash messages are
//! returned to the caller.

pub mod auth;
pub mod credentials;
pub mod document;
pub mod error;
pub mod password;
pub mod render;
pub mod session;
pub mod store;
