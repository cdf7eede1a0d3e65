//! API server configuration.

use kredo_core::config::CoreConfig;
use kredo_core::secrets::{resolve_encryption_key, resolve_jwt_secret};

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8080").
    pub bind_addr: String,
    /// PostgreSQL connection URL. In-memory stores are used when unset.
    pub database_url: Option<String>,
    /// Token signing secret.
    pub jwt_secret: String,
    /// Base64 AES-256 key for personal-data fields.
    pub encryption_key: String,
    /// Domain settings (OTP, tokens, throttling, CRM).
    pub core: CoreConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                               |
    /// |------------------------------|---------------------------------------|
    /// | `BIND_ADDR`                  | `127.0.0.1:8080`                      |
    /// | `DATABASE_URL`               | unset (in-memory stores)              |
    /// | `JWT_SECRET` / `AUTH_SECRET` | generated & persisted to file         |
    /// | `KREDO_ENCRYPTION_KEY`       | generated & persisted to file         |
    ///
    /// Domain settings are read by [`CoreConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            database_url: std::env::var("DATABASE_URL").ok().filter(|u| !u.is_empty()),
            jwt_secret: resolve_jwt_secret(),
            encryption_key: resolve_encryption_key(),
            core: CoreConfig::from_env(),
        }
    }
}
