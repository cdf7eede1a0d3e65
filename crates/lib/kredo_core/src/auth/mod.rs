//! Phone-number authentication primitives.
//!
//! One-time codes are stored only as bcrypt hashes; a successful verification
//! is exchanged for a short-lived HS256 bearer token whose subject is the
//! verified phone number.

pub mod code_hash;
pub mod token;

pub use token::{AccessClaims, IssuedToken, TokenIssuer};
