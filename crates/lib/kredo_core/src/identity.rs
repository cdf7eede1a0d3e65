//! Identity registry collaborator.
//!
//! After a phone is verified the customer's profile is pre-filled from the
//! national identity registry. Only the contract lives here; the bundled
//! provider returns a fixed development profile.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::EmploymentStatus;
use crate::error::CoreResult;
use crate::mask_phone;

/// Profile data returned by the registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub first_name: String,
    pub last_name: String,
    pub fin: String,
    pub date_of_birth: NaiveDate,
    pub address: String,
    pub employment_status: EmploymentStatus,
    pub monthly_income: f64,
    pub existing_monthly_debt: f64,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn fetch_profile(&self, phone: &str) -> CoreResult<PersonalData>;
}

/// Returns the same profile for every phone number.
#[derive(Debug, Clone)]
pub struct StaticIdentityProvider {
    profile: PersonalData,
}

impl StaticIdentityProvider {
    pub fn new(profile: PersonalData) -> Self {
        Self { profile }
    }
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new(PersonalData {
            first_name: "Turan".into(),
            last_name: "Aliyev".into(),
            fin: "7ABC123".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap_or_default(),
            address: "Bakı, Nəsimi rayonu, mənzil 42".into(),
            employment_status: EmploymentStatus::Employed,
            monthly_income: 3000.0,
            existing_monthly_debt: 100.0,
        })
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn fetch_profile(&self, phone: &str) -> CoreResult<PersonalData> {
        debug!(phone = %mask_phone(phone), "identity profile lookup");
        Ok(self.profile.clone())
    }
}
