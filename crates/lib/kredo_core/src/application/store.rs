//! Application persistence.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{ApplicationStatus, LoanApplication};
use crate::error::{CoreError, CoreResult};
use crate::ids::ApplicationId;

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, application: &LoanApplication) -> CoreResult<()>;

    async fn find(&self, id: ApplicationId) -> CoreResult<Option<LoanApplication>>;

    /// Replace the stored record with `application`.
    async fn update(&self, application: &LoanApplication) -> CoreResult<()>;

    /// Whether `phone` owns any application not yet `COMPLETED`.
    async fn has_active_for_phone(&self, phone: &str) -> CoreResult<bool>;
}

/// Process-local store.
#[derive(Default)]
pub struct MemoryApplicationStore {
    applications: DashMap<ApplicationId, LoanApplication>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applications.is_empty()
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn insert(&self, application: &LoanApplication) -> CoreResult<()> {
        self.applications.insert(application.id, application.clone());
        Ok(())
    }

    async fn find(&self, id: ApplicationId) -> CoreResult<Option<LoanApplication>> {
        Ok(self.applications.get(&id).map(|a| a.clone()))
    }

    async fn update(&self, application: &LoanApplication) -> CoreResult<()> {
        match self.applications.get_mut(&application.id) {
            Some(mut stored) => {
                *stored = application.clone();
                Ok(())
            }
            None => Err(CoreError::Internal(format!(
                "update of unknown application {}",
                application.id
            ))),
        }
    }

    async fn has_active_for_phone(&self, phone: &str) -> CoreResult<bool> {
        Ok(self
            .applications
            .iter()
            .any(|a| a.phone_number == phone && a.status != ApplicationStatus::Completed))
    }
}
