//! Postgres-backed challenge store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::store::OtpChallengeStore;
use super::{OtpChallenge, OtpChannel};
use crate::error::{CoreError, CoreResult};
use crate::ids::ChallengeId;

#[derive(sqlx::FromRow)]
struct OtpChallengeRow {
    id: Uuid,
    phone_number: String,
    code_hash: String,
    channel: String,
    attempts: i32,
    verified: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    locked_until: Option<DateTime<Utc>>,
}

impl TryFrom<OtpChallengeRow> for OtpChallenge {
    type Error = CoreError;

    fn try_from(row: OtpChallengeRow) -> Result<Self, Self::Error> {
        Ok(OtpChallenge {
            id: ChallengeId(row.id),
            phone_number: row.phone_number,
            code_hash: row.code_hash,
            channel: row.channel.parse::<OtpChannel>().map_err(CoreError::Internal)?,
            attempts: u32::try_from(row.attempts)
                .map_err(|_| CoreError::Internal(format!("negative attempts on {}", row.id)))?,
            verified: row.verified,
            created_at: row.created_at,
            expires_at: row.expires_at,
            locked_until: row.locked_until,
        })
    }
}

/// Challenge store over a Postgres pool.
#[derive(Clone)]
pub struct PgOtpStore {
    pool: PgPool,
}

impl PgOtpStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OtpChallengeStore for PgOtpStore {
    async fn insert(&self, challenge: &OtpChallenge) -> CoreResult<()> {
        sqlx::query(
            "INSERT INTO otp_challenges \
             (id, phone_number, code_hash, channel, attempts, verified, created_at, expires_at, locked_until) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(challenge.id.as_uuid())
        .bind(&challenge.phone_number)
        .bind(&challenge.code_hash)
        .bind(challenge.channel.as_str())
        .bind(challenge.attempts as i32)
        .bind(challenge.verified)
        .bind(challenge.created_at)
        .bind(challenge.expires_at)
        .bind(challenge.locked_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: ChallengeId) -> CoreResult<Option<OtpChallenge>> {
        let row = sqlx::query_as::<_, OtpChallengeRow>(
            "SELECT id, phone_number, code_hash, channel, attempts, verified, \
                    created_at, expires_at, locked_until \
             FROM otp_challenges WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(OtpChallenge::try_from).transpose()
    }

    async fn update(&self, challenge: &OtpChallenge) -> CoreResult<()> {
        let result = sqlx::query(
            "UPDATE otp_challenges \
             SET attempts = $2, verified = $3, locked_until = $4 \
             WHERE id = $1",
        )
        .bind(challenge.id.as_uuid())
        .bind(challenge.attempts as i32)
        .bind(challenge.verified)
        .bind(challenge.locked_until)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::Internal(format!(
                "update of unknown challenge {}",
                challenge.id
            )));
        }
        Ok(())
    }
}
