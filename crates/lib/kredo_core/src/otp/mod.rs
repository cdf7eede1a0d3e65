//! One-time-code challenges.
//!
//! A challenge binds a phone number to the bcrypt hash of a numeric code. It
//! is created by [`manager::OtpChallengeManager::generate`] and afterwards
//! mutated only by verify attempts.

pub mod delivery;
pub mod manager;
pub mod queries;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ChallengeId;

pub use manager::{GeneratedChallenge, OtpChallengeManager, VerifiedChallenge};
pub use store::{MemoryOtpStore, OtpChallengeStore};

/// Channel the code is delivered over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OtpChannel {
    Sms,
    Email,
}

impl OtpChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            OtpChannel::Sms => "SMS",
            OtpChannel::Email => "EMAIL",
        }
    }
}

impl fmt::Display for OtpChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OtpChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SMS" => Ok(OtpChannel::Sms),
            "EMAIL" => Ok(OtpChannel::Email),
            other => Err(format!("unknown channel: {other}")),
        }
    }
}

/// Stored challenge. Never holds the plaintext code.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: ChallengeId,
    pub phone_number: String,
    pub code_hash: String,
    pub channel: OtpChannel,
    /// Verify attempts so far; only ever increases.
    pub attempts: u32,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub locked_until: Option<DateTime<Utc>>,
}

impl OtpChallenge {
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| now < until)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
