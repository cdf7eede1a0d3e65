//! One-time-code hashing via bcrypt.
//!
//! Both calls are CPU-bound; async callers wrap them in `spawn_blocking`.

use crate::error::{CoreError, CoreResult};

/// Hash a one-time code with the given bcrypt cost.
pub fn hash_code(code: &str, cost: u32) -> CoreResult<String> {
    bcrypt::hash(code, cost).map_err(|e| CoreError::Internal(format!("bcrypt hash: {e}")))
}

/// Check a submitted code against a stored hash.
pub fn verify_code(code: &str, hash: &str) -> CoreResult<bool> {
    bcrypt::verify(code, hash).map_err(|e| CoreError::Internal(format!("bcrypt verify: {e}")))
}
