//! Request and response bodies. JSON field names are camelCase.

use chrono::{DateTime, NaiveDate, Utc};
use kredo_core::application::{ApplicationResult, ApplyCommand, Consent};
use kredo_core::identity::PersonalData;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

fn default_channel() -> String {
    "SMS".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOtpRequest {
    pub phone_number: String,
    #[serde(default = "default_channel")]
    pub channel: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateOtpResponse {
    pub request_id: Uuid,
    pub ttl_seconds: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: String,
    pub request_id: Uuid,
    pub otp_code: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub verified: bool,
    pub access_token: String,
    pub expires_in_seconds: u32,
    pub personal_data: PersonalData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentDto {
    #[serde(default)]
    pub terms_accepted: bool,
    #[serde(default)]
    pub privacy_accepted: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyToLoanRequest {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub fin: String,
    pub date_of_birth: NaiveDate,
    pub employment_status: String,
    pub monthly_income: f64,
    #[serde(default)]
    pub existing_monthly_debt: f64,
    pub address: String,
    pub consent: ConsentDto,
}

impl From<ApplyToLoanRequest> for ApplyCommand {
    fn from(r: ApplyToLoanRequest) -> Self {
        ApplyCommand {
            phone_number: r.phone_number,
            first_name: r.first_name,
            last_name: r.last_name,
            fin: r.fin,
            date_of_birth: r.date_of_birth,
            employment_status: r.employment_status,
            monthly_income: r.monthly_income,
            existing_monthly_debt: r.existing_monthly_debt,
            address: r.address,
            consent: Consent {
                terms_accepted: r.consent.terms_accepted,
                privacy_accepted: r.consent.privacy_accepted,
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStatusResponse {
    pub application_id: Uuid,
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAmountRequest {
    pub requested_amount: f64,
    pub term_months: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResultResponse {
    pub application_id: Uuid,
    pub status: String,
    pub decision: Option<String>,
    pub score: Option<u32>,
    pub approved_amount: Option<f64>,
    pub apr: Option<f64>,
    pub reason_codes: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<ApplicationResult> for LoanResultResponse {
    fn from(r: ApplicationResult) -> Self {
        Self {
            application_id: r.application_id.as_uuid(),
            status: r.status.to_string(),
            decision: r.decision.map(|d| d.to_string()),
            score: r.score,
            approved_amount: r.approved_amount,
            apr: r.apr,
            reason_codes: r.reason_codes,
            last_updated: r.last_updated,
        }
    }
}
