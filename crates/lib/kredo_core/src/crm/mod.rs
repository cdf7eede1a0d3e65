//! CRM collaborator: application pushes and customer flags.

pub mod dispatcher;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::ids::ApplicationId;

pub use dispatcher::{CrmDispatcher, CrmMetrics, CrmMetricsSnapshot, CrmPush};
pub use mock::MockCrmClient;

/// Outcome of pushing an application to the CRM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResult {
    pub success: bool,
    pub reference_id: Option<String>,
    pub error: Option<String>,
}

impl PushResult {
    pub fn accepted(reference_id: impl Into<String>) -> Self {
        Self {
            success: true,
            reference_id: Some(reference_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            reference_id: None,
            error: Some(error.into()),
        }
    }
}

/// What the CRM knows about a customer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerFlags {
    pub existing_customer: bool,
    pub has_active_loans: bool,
    pub has_default_history: bool,
    /// 1 (lowest) to 5 for existing customers, 0 otherwise.
    pub credit_tier: u8,
    pub special_programs: Vec<String>,
}

#[async_trait]
pub trait CrmClient: Send + Sync {
    async fn push_application(
        &self,
        id: ApplicationId,
        phone: &str,
        first_name: &str,
        last_name: &str,
    ) -> CoreResult<PushResult>;

    async fn fetch_customer_flags(&self, phone: &str) -> CoreResult<CustomerFlags>;
}
