//! Stateless bearer tokens (HS256 JWT).
//!
//! Nothing is stored server-side: a token is valid while its signature checks
//! out and its expiry has not passed. There is no revocation.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TokenConfig;
use crate::error::{CoreError, CoreResult};

const TOKEN_TYPE_ACCESS: &str = "access";

/// Claims embedded in access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject: the verified phone number.
    pub sub: String,
    /// Token type, always `access`.
    pub typ: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
}

/// A freshly minted token and its lifetime.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in_seconds: u32,
}

/// Mints and validates access tokens with a server-held secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: u32,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], config: &TokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_seconds: config.ttl_seconds,
        }
    }

    /// Mint a token whose subject is `phone`.
    pub fn issue(&self, phone: &str) -> CoreResult<IssuedToken> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: phone.to_string(),
            typ: TOKEN_TYPE_ACCESS.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(i64::from(self.ttl_seconds))).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| CoreError::Internal(format!("jwt encode: {e}")))?;
        Ok(IssuedToken {
            token,
            expires_in_seconds: self.ttl_seconds,
        })
    }

    /// Validate a token, returning the verified phone number.
    ///
    /// Corruption, a bad signature, a wrong token type and expiry all yield
    /// `None`; callers cannot tell them apart.
    pub fn validate(&self, token: &str) -> Option<String> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        match decode::<AccessClaims>(token, &self.decoding, &validation) {
            Ok(data) if data.claims.typ == TOKEN_TYPE_ACCESS => Some(data.claims.sub),
            Ok(_) => {
                debug!("rejected token with unexpected type");
                None
            }
            Err(e) => {
                debug!(error = %e, "rejected token");
                None
            }
        }
    }
}
