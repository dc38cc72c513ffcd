//! `Quill` HTTP server.
//!
//! Wires together the core library, storage backends, and HTTP routes into a
//! running Axum server. Serves the document pages at `/` and the account
//! pages at `/users/*`.

pub mod config;
pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod templates;
