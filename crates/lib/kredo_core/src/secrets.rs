//! Server-held secrets: the token signing secret and the field encryption key.
//!
//! Resolution order: environment variables, then a file persisted under the
//! platform data directory, then a freshly generated value written to that
//! file so restarts keep issuing compatible tokens and ciphertext.

use std::path::{Path, PathBuf};

use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{info, warn};

use crate::crypto;

const JWT_SECRET_FILE: &str = "jwt-secret";
const ENCRYPTION_KEY_FILE: &str = "encryption-key";

/// Resolve the token signing secret: `JWT_SECRET` → `AUTH_SECRET` → persisted file.
pub fn resolve_jwt_secret() -> String {
    resolve_secret(
        &["JWT_SECRET", "AUTH_SECRET"],
        &secrets_dir().join(JWT_SECRET_FILE),
        generate_signing_secret,
    )
}

/// Resolve the base64 field encryption key: `KREDO_ENCRYPTION_KEY` → persisted file.
pub fn resolve_encryption_key() -> String {
    resolve_secret(
        &["KREDO_ENCRYPTION_KEY"],
        &secrets_dir().join(ENCRYPTION_KEY_FILE),
        crypto::generate_key_base64,
    )
}

/// First non-empty env var, else the trimmed file contents, else `generate()`
/// persisted to `path`.
pub fn resolve_secret(env_vars: &[&str], path: &Path, generate: fn() -> String) -> String {
    for name in env_vars {
        if let Ok(secret) = std::env::var(name)
            && !secret.trim().is_empty()
        {
            return secret.trim().to_string();
        }
    }

    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let secret = generate();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(path, &secret) {
        Ok(()) => info!(path = %path.display(), "generated new secret"),
        Err(e) => warn!(path = %path.display(), error = %e, "generated secret could not be persisted"),
    }
    secret
}

fn generate_signing_secret() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

fn secrets_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kredo")
}
