//! Challenge persistence.

use async_trait::async_trait;
use dashmap::DashMap;

use super::OtpChallenge;
use crate::error::{CoreError, CoreResult};
use crate::ids::ChallengeId;

/// Storage for OTP challenges. Each challenge is addressed only by its id.
#[async_trait]
pub trait OtpChallengeStore: Send + Sync {
    async fn insert(&self, challenge: &OtpChallenge) -> CoreResult<()>;

    async fn find(&self, id: ChallengeId) -> CoreResult<Option<OtpChallenge>>;

    /// Persist the mutable fields (attempts, verified, lock) of an existing challenge.
    async fn update(&self, challenge: &OtpChallenge) -> CoreResult<()>;
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryOtpStore {
    challenges: DashMap<ChallengeId, OtpChallenge>,
}

impl MemoryOtpStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }
}

#[async_trait]
impl OtpChallengeStore for MemoryOtpStore {
    async fn insert(&self, challenge: &OtpChallenge) -> CoreResult<()> {
        self.challenges.insert(challenge.id, challenge.clone());
        Ok(())
    }

    async fn find(&self, id: ChallengeId) -> CoreResult<Option<OtpChallenge>> {
        Ok(self.challenges.get(&id).map(|c| c.clone()))
    }

    async fn update(&self, challenge: &OtpChallenge) -> CoreResult<()> {
        match self.challenges.get_mut(&challenge.id) {
            Some(mut stored) => {
                stored.attempts = challenge.attempts;
                stored.verified = challenge.verified;
                stored.locked_until = challenge.locked_until;
                Ok(())
            }
            None => Err(CoreError::Internal(format!(
                "update of unknown challenge {}",
                challenge.id
            ))),
        }
    }
}
