//! Challenge generation and verification.
//!
//! Verification runs under a per-challenge lock, so the attempt counter is
//! read, incremented and written back by one request at a time. The checks
//! run in a fixed order and each failing check ends the call:
//!
//! 1. unknown id → `NOT_FOUND`
//! 2. phone mismatch → `NOT_FOUND` (indistinguishable from 1)
//! 3. locked → `OTP_LOCKED`
//! 4. expired → `OTP_EXPIRED`
//! 5. already verified → `OTP_ALREADY_VERIFIED`
//! 6. attempts + 1 over the limit → lock, `OTP_MAX_ATTEMPTS` (code not compared)
//! 7. code mismatch → `OTP_INVALID`; match → verified

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use tracing::{info, warn};

use super::delivery::OtpDelivery;
use super::store::OtpChallengeStore;
use super::{OtpChallenge, OtpChannel};
use crate::auth::code_hash::{hash_code, verify_code};
use crate::auth::{IssuedToken, TokenIssuer};
use crate::config::OtpConfig;
use crate::error::{CoreError, CoreResult};
use crate::identity::{IdentityProvider, PersonalData};
use crate::ids::ChallengeId;
use crate::mask_phone;
use crate::sync::KeyedLocks;
use crate::validation::{FieldErrors, check_otp_code, check_phone};

/// Result of a successful `generate`.
#[derive(Debug, Clone)]
pub struct GeneratedChallenge {
    pub id: ChallengeId,
    pub ttl_seconds: u32,
}

/// Result of a successful `verify`.
#[derive(Debug, Clone)]
pub struct VerifiedChallenge {
    pub token: IssuedToken,
    pub profile: PersonalData,
}

pub struct OtpChallengeManager {
    store: Arc<dyn OtpChallengeStore>,
    delivery: Arc<dyn OtpDelivery>,
    identity: Arc<dyn IdentityProvider>,
    tokens: TokenIssuer,
    config: OtpConfig,
    locks: KeyedLocks<ChallengeId>,
}

impl OtpChallengeManager {
    pub fn new(
        store: Arc<dyn OtpChallengeStore>,
        delivery: Arc<dyn OtpDelivery>,
        identity: Arc<dyn IdentityProvider>,
        tokens: TokenIssuer,
        config: OtpConfig,
    ) -> Self {
        Self {
            store,
            delivery,
            identity,
            tokens,
            config,
            locks: KeyedLocks::new(),
        }
    }

    /// Create a challenge for `phone` and hand the code to the delivery channel.
    ///
    /// The plaintext code is never stored and never returned.
    pub async fn generate(&self, phone: &str, channel: &str) -> CoreResult<GeneratedChallenge> {
        let mut errors = FieldErrors::new();
        check_phone(&mut errors, "phoneNumber", phone);
        let channel = channel.parse::<OtpChannel>().unwrap_or_else(|_| {
            errors.add("channel", "Channel must be SMS or EMAIL");
            OtpChannel::Sms
        });
        errors.into_result()?;

        let code = generate_code(self.config.code_length);
        let code_hash = hash_blocking(code.clone(), self.config.hash_cost).await?;

        let now = Utc::now();
        let challenge = OtpChallenge {
            id: ChallengeId::new(),
            phone_number: phone.to_string(),
            code_hash,
            channel,
            attempts: 0,
            verified: false,
            created_at: now,
            expires_at: now + Duration::seconds(i64::from(self.config.ttl_seconds)),
            locked_until: None,
        };
        self.store.insert(&challenge).await?;
        self.delivery.deliver(&challenge, &code).await?;

        info!(
            request_id = %challenge.id,
            phone = %mask_phone(phone),
            channel = %channel,
            "otp challenge created"
        );
        Ok(GeneratedChallenge {
            id: challenge.id,
            ttl_seconds: self.config.ttl_seconds,
        })
    }

    /// Verify `code` for challenge `id`; on success mint a token for the phone.
    pub async fn verify(
        &self,
        id: ChallengeId,
        phone: &str,
        code: &str,
    ) -> CoreResult<VerifiedChallenge> {
        let mut errors = FieldErrors::new();
        check_phone(&mut errors, "phoneNumber", phone);
        check_otp_code(&mut errors, "otpCode", code, self.config.code_length);
        errors.into_result()?;

        let _guard = self.locks.lock(id).await;
        let mut challenge = self.verify_locked(id, phone, code, Utc::now()).await?;

        // The challenge is spent only once the token and profile are in hand.
        let token = self.tokens.issue(&challenge.phone_number)?;
        let profile = self.identity.fetch_profile(&challenge.phone_number).await?;
        challenge.verified = true;
        self.store.update(&challenge).await?;
        info!(request_id = %id, "otp verified");
        Ok(VerifiedChallenge { token, profile })
    }

    /// Runs every check in order. On a matching code the counted attempt is
    /// returned unsaved; the caller marks it verified and persists it.
    async fn verify_locked(
        &self,
        id: ChallengeId,
        phone: &str,
        code: &str,
        now: DateTime<Utc>,
    ) -> CoreResult<OtpChallenge> {
        let mut challenge = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::NotFound("OTP request".into()))?;

        if challenge.phone_number != phone {
            warn!(request_id = %id, "phone number mismatch on otp verify");
            return Err(CoreError::NotFound("OTP request".into()));
        }

        if challenge.is_locked_at(now) {
            warn!(request_id = %id, "otp verify while locked");
            return Err(CoreError::OtpLocked);
        }

        if challenge.is_expired_at(now) {
            info!(request_id = %id, "otp expired");
            return Err(CoreError::OtpExpired);
        }

        if challenge.verified {
            info!(request_id = %id, "otp already verified");
            return Err(CoreError::OtpAlreadyVerified);
        }

        challenge.attempts += 1;
        if challenge.attempts > self.config.max_attempts {
            challenge.locked_until =
                Some(now + Duration::minutes(i64::from(self.config.lockout_minutes)));
            self.store.update(&challenge).await?;
            warn!(request_id = %id, attempts = challenge.attempts, "otp max attempts exceeded");
            return Err(CoreError::OtpMaxAttempts);
        }

        if !verify_blocking(code.to_string(), challenge.code_hash.clone()).await? {
            self.store.update(&challenge).await?;
            info!(
                request_id = %id,
                attempt = challenge.attempts,
                max_attempts = self.config.max_attempts,
                "invalid otp attempt"
            );
            return Err(CoreError::OtpInvalid);
        }

        Ok(challenge)
    }
}

/// Uniform random code of exactly `length` digits with no leading zero.
fn generate_code(length: u32) -> String {
    let length = length.clamp(1, 9);
    let min = if length == 1 { 0 } else { 10u32.pow(length - 1) };
    let max = 10u32.pow(length);
    rand::rng().random_range(min..max).to_string()
}

async fn hash_blocking(code: String, cost: u32) -> CoreResult<String> {
    tokio::task::spawn_blocking(move || hash_code(&code, cost))
        .await
        .map_err(|e| CoreError::Internal(format!("hash task: {e}")))?
}

async fn verify_blocking(code: String, hash: String) -> CoreResult<bool> {
    tokio::task::spawn_blocking(move || verify_code(&code, &hash))
        .await
        .map_err(|e| CoreError::Internal(format!("verify task: {e}")))?
}
