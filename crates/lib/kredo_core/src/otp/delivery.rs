//! Code delivery channels.
//!
//! Real SMS and e-mail gateways are out of scope. [`LoggingDelivery`] writes
//! the code to the log for local development; [`MemoryOutbox`] keeps it in
//! memory so tests and demos can read it back.

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::info;

use super::OtpChallenge;
use crate::error::CoreResult;
use crate::ids::ChallengeId;
use crate::mask_phone;

/// Hands a freshly generated code to the customer.
#[async_trait]
pub trait OtpDelivery: Send + Sync {
    async fn deliver(&self, challenge: &OtpChallenge, code: &str) -> CoreResult<()>;
}

/// Development stub: logs the code instead of sending it.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingDelivery;

#[async_trait]
impl OtpDelivery for LoggingDelivery {
    async fn deliver(&self, challenge: &OtpChallenge, code: &str) -> CoreResult<()> {
        info!(
            target: "kredo::otp::delivery",
            request_id = %challenge.id,
            phone = %mask_phone(&challenge.phone_number),
            channel = %challenge.channel,
            code,
            "DEV MODE: one-time code"
        );
        Ok(())
    }
}

/// Keeps the last code per challenge in memory.
#[derive(Debug, Default)]
pub struct MemoryOutbox {
    codes: DashMap<ChallengeId, String>,
}

impl MemoryOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// The code delivered for `id`, if any.
    pub fn code_for(&self, id: ChallengeId) -> Option<String> {
        self.codes.get(&id).map(|c| c.clone())
    }
}

#[async_trait]
impl OtpDelivery for MemoryOutbox {
    async fn deliver(&self, challenge: &OtpChallenge, code: &str) -> CoreResult<()> {
        self.codes.insert(challenge.id, code.to_string());
        Ok(())
    }
}
