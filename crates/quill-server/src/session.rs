//! Cookie-carried sessions and flash delivery.
//!
//! The whole session lives in the encrypted `quill_session` cookie as a small
//! JSON record, so the server keeps no per-client state. [`session_middleware`]
//! decrypts it into a [`CurrentSession`] for the handler and afterwards applies
//! whatever the handler asked for through response extensions:
//!
//! - [`SetFlash`]: store a flash for the next rendered page
//! - [`FlashShown`]: the pending flash was rendered, drop it
//! - [`SessionChange`]: sign in or sign out
//!
//! A sign-in is only honoured until its `expires_at`. Cookies that fail to
//! decrypt or parse read as signed out.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::extract::{Request, State};
use axum::http::Extensions;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar, SameSite};
use quill_core::session::{Flash, Session};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quill_session";

/// How long a sign-in lasts when nothing else is configured.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Minimum length of a configured session secret, in bytes.
pub const MIN_SECRET_LEN: usize = 64;

/// Key and lifetime settings for session cookies.
#[derive(Clone)]
pub struct SessionConfig {
    key: Key,
    ttl: Duration,
    secure: bool,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("ttl", &self.ttl)
            .field("secure", &self.secure)
            .finish_non_exhaustive()
    }
}

impl SessionConfig {
    #[must_use]
    pub fn new(key: Key, ttl: Duration) -> Self {
        Self {
            key,
            ttl,
            secure: false,
        }
    }

    /// Settings with a random key. Sessions do not survive a restart.
    #[must_use]
    pub fn ephemeral() -> Self {
        Self::new(Key::generate(), DEFAULT_SESSION_TTL)
    }

    /// Settings keyed by a configured secret.
    ///
    /// A missing secret, or one shorter than [`MIN_SECRET_LEN`] bytes, falls
    /// back to a random key with a warning.
    #[must_use]
    pub fn from_secret(secret: Option<&str>, ttl: Duration) -> Self {
        let key = match secret.map(|s| Key::try_from(s.as_bytes())) {
            Some(Ok(key)) => key,
            Some(Err(e)) => {
                warn!(error = %e, "session secret rejected, using a random key");
                Key::generate()
            }
            None => {
                warn!("no session secret configured, sessions end on restart");
                Key::generate()
            }
        };
        Self::new(key, ttl)
    }

    /// Mark the cookie `Secure`, for deployments behind HTTPS.
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// How long a sign-in lasts.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn jar(&self, headers: &axum::http::HeaderMap) -> PrivateCookieJar {
        PrivateCookieJar::from_headers(headers, self.key.clone())
    }

    fn cookie(&self, value: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .path("/")
            .build()
    }
}

/// The session and pending flash of the current request.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession {
    pub session: Session,
    pub flash: Option<Flash>,
}

/// Response extension: show this flash on the next rendered page.
#[derive(Debug, Clone)]
pub struct SetFlash(pub Flash);

/// Response extension: the pending flash has been rendered.
#[derive(Debug, Clone, Copy)]
pub struct FlashShown;

/// Response extension: change who is signed in.
#[derive(Debug, Clone)]
pub enum SessionChange {
    SignIn(Session),
    SignOut,
}

/// What the cookie carries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SessionRecord {
    #[serde(default)]
    session: Session,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flash: Option<Flash>,
    /// Unix seconds after which the sign-in no longer counts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    expires_at: Option<u64>,
}

impl SessionRecord {
    fn read(jar: &PrivateCookieJar, now: u64) -> Self {
        let Some(cookie) = jar.get(SESSION_COOKIE) else {
            return Self::default();
        };
        match serde_json::from_str::<Self>(cookie.value()) {
            Ok(record) if record.expires_at.is_some_and(|at| at <= now) => Self {
                flash: record.flash,
                ..Self::default()
            },
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "discarding unreadable session cookie");
                Self::default()
            }
        }
    }

    fn apply(mut self, update: SessionUpdate, now: u64, ttl: Duration) -> Self {
        if update.flash_shown {
            self.flash = None;
        }
        if let Some(flash) = update.flash {
            self.flash = Some(flash);
        }
        match update.change {
            Some(SessionChange::SignIn(session)) => {
                self.session = session;
                self.expires_at = Some(now.saturating_add(ttl.as_secs()));
            }
            Some(SessionChange::SignOut) => {
                self.session = Session::signed_out();
                self.expires_at = None;
            }
            None => {}
        }
        self
    }
}

/// Instructions collected from one response.
#[derive(Debug, Default)]
struct SessionUpdate {
    flash_shown: bool,
    flash: Option<Flash>,
    change: Option<SessionChange>,
}

impl SessionUpdate {
    fn take(extensions: &mut Extensions) -> Self {
        Self {
            flash_shown: extensions.remove::<FlashShown>().is_some(),
            flash: extensions.remove::<SetFlash>().map(|f| f.0),
            change: extensions.remove::<SessionChange>(),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}

/// Middleware that decrypts the session cookie and writes back changes.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let config = &state.sessions;
    let jar = config.jar(req.headers());
    let now = unix_now();
    let record = SessionRecord::read(&jar, now);
    req.extensions_mut().insert(CurrentSession {
        session: record.session.clone(),
        flash: record.flash.clone(),
    });

    let mut response = next.run(req).await;

    let update = SessionUpdate::take(response.extensions_mut());
    let updated = record.clone().apply(update, now, config.ttl);
    if updated == record {
        return response;
    }

    let jar = if updated == SessionRecord::default() {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    } else {
        match serde_json::to_string(&updated) {
            Ok(value) => jar.add(config.cookie(value)),
            Err(e) => {
                warn!(error = %e, "failed to encode session cookie");
                return response;
            }
        }
    };
    (jar, response).into_response()
}
