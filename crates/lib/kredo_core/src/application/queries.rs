//! Postgres-backed application store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::store::ApplicationStore;
use super::{ApplicationStatus, Decision, EmploymentStatus, LoanApplication};
use crate::error::{CoreError, CoreResult};
use crate::ids::ApplicationId;

const COLUMNS: &str = "id, phone_number, first_name, last_name, fin_encrypted, date_of_birth, \
     employment_status, monthly_income, existing_monthly_debt, address_encrypted, \
     terms_accepted, privacy_accepted, consent_timestamp, requested_amount, term_months, \
     status, score, decision, approved_amount, apr, reason_codes, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct LoanApplicationRow {
    id: Uuid,
    phone_number: String,
    first_name: String,
    last_name: String,
    fin_encrypted: String,
    date_of_birth: NaiveDate,
    employment_status: String,
    monthly_income: f64,
    existing_monthly_debt: f64,
    address_encrypted: String,
    terms_accepted: bool,
    privacy_accepted: bool,
    consent_timestamp: Option<DateTime<Utc>>,
    requested_amount: Option<f64>,
    term_months: Option<i32>,
    status: String,
    score: Option<i32>,
    decision: Option<String>,
    approved_amount: Option<f64>,
    apr: Option<f64>,
    reason_codes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn non_negative(value: Option<i32>, column: &str, id: Uuid) -> CoreResult<Option<u32>> {
    value
        .map(|v| {
            u32::try_from(v)
                .map_err(|_| CoreError::Internal(format!("negative {column} on application {id}")))
        })
        .transpose()
}

impl TryFrom<LoanApplicationRow> for LoanApplication {
    type Error = CoreError;

    fn try_from(row: LoanApplicationRow) -> Result<Self, Self::Error> {
        Ok(LoanApplication {
            id: ApplicationId(row.id),
            phone_number: row.phone_number,
            first_name: row.first_name,
            last_name: row.last_name,
            fin_encrypted: row.fin_encrypted,
            date_of_birth: row.date_of_birth,
            employment_status: row
                .employment_status
                .parse::<EmploymentStatus>()
                .map_err(CoreError::Internal)?,
            monthly_income: row.monthly_income,
            existing_monthly_debt: row.existing_monthly_debt,
            address_encrypted: row.address_encrypted,
            terms_accepted: row.terms_accepted,
            privacy_accepted: row.privacy_accepted,
            consent_timestamp: row.consent_timestamp,
            requested_amount: row.requested_amount,
            term_months: non_negative(row.term_months, "term_months", row.id)?,
            status: row.status.parse::<ApplicationStatus>().map_err(CoreError::Internal)?,
            score: non_negative(row.score, "score", row.id)?,
            decision: row
                .decision
                .map(|d| d.parse::<Decision>())
                .transpose()
                .map_err(CoreError::Internal)?,
            approved_amount: row.approved_amount,
            apr: row.apr,
            reason_codes: row.reason_codes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Application store over a Postgres pool.
#[derive(Clone)]
pub struct PgApplicationStore {
    pool: PgPool,
}

impl PgApplicationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApplicationStore for PgApplicationStore {
    async fn insert(&self, a: &LoanApplication) -> CoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO loan_applications ({COLUMNS}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
              $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23)"
        ))
        .bind(a.id.as_uuid())
        .bind(&a.phone_number)
        .bind(&a.first_name)
        .bind(&a.last_name)
        .bind(&a.fin_encrypted)
        .bind(a.date_of_birth)
        .bind(a.employment_status.as_str())
        .bind(a.monthly_income)
        .bind(a.existing_monthly_debt)
        .bind(&a.address_encrypted)
        .bind(a.terms_accepted)
        .bind(a.privacy_accepted)
        .bind(a.consent_timestamp)
        .bind(a.requested_amount)
        .bind(a.term_months.map(|t| t as i32))
        .bind(a.status.as_str())
        .bind(a.score.map(|s| s as i32))
        .bind(a.decision.map(|d| d.as_str()))
        .bind(a.approved_amount)
        .bind(a.apr)
        .bind(&a.reason_codes)
        .bind(a.created_at)
        .bind(a.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, id: ApplicationId) -> CoreResult<Option<LoanApplication>> {
        let row = sqlx::query_as::<_, LoanApplicationRow>(&format!(
            "SELECT {COLUMNS} FROM loan_applications WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(LoanApplication::try_from).transpose()
    }

    async fn update(&self, a: &LoanApplication) -> CoreResult<()> {
        // Identity, owner and personal data are fixed at creation.
        let result = sqlx::query(
            "UPDATE loan_applications SET \
                requested_amount = $2, term_months = $3, status = $4, score = $5, \
                decision = $6, approved_amount = $7, apr = $8, reason_codes = $9, \
                updated_at = $10 \
             WHERE id = $1",
        )
        .bind(a.id.as_uuid())
        .bind(a.requested_amount)
        .bind(a.term_months.map(|t| t as i32))
        .bind(a.status.as_str())
        .bind(a.score.map(|s| s as i32))
        .bind(a.decision.map(|d| d.as_str()))
        .bind(a.approved_amount)
        .bind(a.apr)
        .bind(&a.reason_codes)
        .bind(a.updated_at)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(CoreError::Internal(format!(
                "update of unknown application {}",
                a.id
            )));
        }
        Ok(())
    }

    async fn has_active_for_phone(&self, phone: &str) -> CoreResult<bool> {
        let active: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM loan_applications WHERE phone_number = $1 AND status <> $2)",
        )
        .bind(phone)
        .bind(ApplicationStatus::Completed.as_str())
        .fetch_one(&self.pool)
        .await?;
        Ok(active)
    }
}
