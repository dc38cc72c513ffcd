//! Server configuration for `Quill`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `QUILL_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::session::DEFAULT_SESSION_TTL;

/// Default listen port when neither `QUILL_BIND_ADDR` nor `PORT` is set.
pub const DEFAULT_PORT: u16 = 4567;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Directory holding the documents.
    pub data_dir: PathBuf,
    /// Directory holding the credential record.
    pub credentials_dir: PathBuf,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Secret the session cookie key is built from (at least 64 bytes).
    pub session_secret: Option<String>,
    /// How long a sign-in lasts.
    pub session_ttl: Duration,
    /// Whether the session cookie is marked `Secure`.
    pub cookie_secure: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on, listening on `0.0.0.0`
    /// - `QUILL_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:4567`)
    /// - `QUILL_DATA_DIR`: document directory (default: `./data`)
    /// - `QUILL_CREDENTIALS_DIR`: directory of `users.json` (default: `./config`)
    /// - `QUILL_LOG_LEVEL`: log filter (default: `info`)
    /// - `QUILL_SESSION_SECRET`: session cookie secret (default: random per start)
    /// - `QUILL_SESSION_TTL_SECS`: sign-in lifetime in seconds (default: `7200`)
    /// - `QUILL_COOKIE_SECURE`: `true` to mark the cookie `Secure` (default: `false`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let default_addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));

        // Priority: QUILL_BIND_ADDR > PORT > default 127.0.0.1:4567
        let bind_addr = if let Some(addr) = lookup("QUILL_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port_str) = lookup("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_PORT);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            default_addr
        };

        let data_dir = lookup("QUILL_DATA_DIR").map_or_else(|| PathBuf::from("./data"), PathBuf::from);

        let credentials_dir =
            lookup("QUILL_CREDENTIALS_DIR").map_or_else(|| PathBuf::from("./config"), PathBuf::from);

        let log_level = lookup("QUILL_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let session_secret = lookup("QUILL_SESSION_SECRET").filter(|s| !s.is_empty());

        let session_ttl = lookup("QUILL_SESSION_TTL_SECS")
            .and_then(|secs| secs.parse().ok())
            .map_or(DEFAULT_SESSION_TTL, Duration::from_secs);

        let cookie_secure = lookup("QUILL_COOKIE_SECURE")
            .is_some_and(|v| matches!(v.as_str(), "1" | "true" | "yes"));

        Self {
            bind_addr,
            data_dir,
            credentials_dir,
            log_level,
            session_secret,
            session_ttl,
            cookie_secure,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_with(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_with(&[]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 4567)));
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.credentials_dir, PathBuf::from("./config"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.session_secret, None);
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
        assert!(!config.cookie_secure);
    }

    #[test]
    fn session_settings() {
        let config = config_with(&[
            ("QUILL_SESSION_SECRET", "s3cret"),
            ("QUILL_SESSION_TTL_SECS", "600"),
            ("QUILL_COOKIE_SECURE", "true"),
        ]);
        assert_eq!(config.session_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.session_ttl, Duration::from_secs(600));
        assert!(config.cookie_secure);

        let config = config_with(&[
            ("QUILL_SESSION_TTL_SECS", "soon"),
            ("QUILL_SESSION_SECRET", ""),
        ]);
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
        assert_eq!(config.session_secret, None);
    }

    #[test]
    fn bind_addr_wins_over_port() {
        let config = config_with(&[("QUILL_BIND_ADDR", "0.0.0.0:9000"), ("PORT", "8080")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
    }

    #[test]
    fn port_binds_all_interfaces() {
        let config = config_with(&[("PORT", "8080")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_with(&[("QUILL_BIND_ADDR", "not an address")]);
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);

        let config = config_with(&[("PORT", "eighty")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
    }

    #[test]
    fn directories_are_configurable() {
        let config = config_with(&[
            ("QUILL_DATA_DIR", "/srv/quill/docs"),
            ("QUILL_CREDENTIALS_DIR", "/etc/quill"),
            ("QUILL_LOG_LEVEL", "debug"),
        ]);
        assert_eq!(config.data_dir, PathBuf::from("/srv/quill/docs"));
        assert_eq!(config.credentials_dir, PathBuf::from("/etc/quill"));
        assert_eq!(config.log_level, "debug");
    }
}
