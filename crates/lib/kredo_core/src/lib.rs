//! # kredo_core
//!
//! Core domain logic for Kredo: phone verification through one-time codes,
//! bearer tokens, field-level encryption of personal data, request throttling
//! and the loan-application lifecycle.

pub mod application;
pub mod auth;
pub mod config;
pub mod crm;
pub mod crypto;
pub mod decision;
pub mod error;
pub mod ids;
pub mod identity;
pub mod migrate;
pub mod otp;
pub mod rate_limit;
pub mod secrets;
pub mod sync;
pub mod validation;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Mask a phone number for logging: keep the country and operator prefix and the last two digits.
pub fn mask_phone(phone: &str) -> String {
    let chars: Vec<char> = phone.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{head}{}{tail}", "*".repeat(chars.len() - 8))
}
