//! Simulated CRM used until a real integration exists.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use sha2::{Digest, Sha256};
use tracing::info;

use super::{CrmClient, CustomerFlags, PushResult};
use crate::error::CoreResult;
use crate::ids::ApplicationId;
use crate::mask_phone;

const MIN_DELAY_MS: u64 = 50;
const MAX_DELAY_MS: u64 = 150;

/// Answers after a short random delay. Flags are a pure function of the phone.
#[derive(Debug, Clone)]
pub struct MockCrmClient {
    latency: bool,
}

impl MockCrmClient {
    pub fn new() -> Self {
        Self { latency: true }
    }

    /// Same answers, no simulated network delay.
    pub fn instant() -> Self {
        Self { latency: false }
    }

    async fn simulate_latency(&self) {
        if self.latency {
            let delay = rand::rng().random_range(MIN_DELAY_MS..=MAX_DELAY_MS);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
    }
}

impl Default for MockCrmClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive flags for `phone` from a stable hash of it.
pub fn flags_for_phone(phone: &str) -> CustomerFlags {
    let digest = Sha256::digest(phone.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let hash = u64::from_be_bytes(head);

    let existing_customer = hash % 3 == 0;
    let special_programs = match (existing_customer, hash % 7 == 0) {
        (true, true) => vec!["LOYALTY_DISCOUNT".to_string(), "FAST_TRACK".to_string()],
        (true, false) => vec!["STANDARD".to_string()],
        (false, _) => Vec::new(),
    };
    CustomerFlags {
        existing_customer,
        has_active_loans: existing_customer && hash % 5 == 0,
        has_default_history: hash % 17 == 0,
        credit_tier: if existing_customer { (hash % 5) as u8 + 1 } else { 0 },
        special_programs,
    }
}

#[async_trait]
impl CrmClient for MockCrmClient {
    async fn push_application(
        &self,
        id: ApplicationId,
        _phone: &str,
        _first_name: &str,
        _last_name: &str,
    ) -> CoreResult<PushResult> {
        self.simulate_latency().await;
        let reference = format!(
            "CRM-{}",
            uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );
        info!(application_id = %id, crm_ref = %reference, "mock crm push accepted");
        Ok(PushResult::accepted(reference))
    }

    async fn fetch_customer_flags(&self, phone: &str) -> CoreResult<CustomerFlags> {
        self.simulate_latency().await;
        let flags = flags_for_phone(phone);
        info!(
            phone = %mask_phone(phone),
            existing = flags.existing_customer,
            active_loans = flags.has_active_loans,
            tier = flags.credit_tier,
            "mock crm flags"
        );
        Ok(flags)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_deterministic_and_consistent() {
        for n in 0..200u32 {
            let phone = format!("+99450{:07}", n);
            let flags = flags_for_phone(&phone);
            assert_eq!(flags, flags_for_phone(&phone));
            if flags.existing_customer {
                assert!((1..=5).contains(&flags.credit_tier));
                assert!(!flags.special_programs.is_empty());
            } else {
                assert_eq!(flags.credit_tier, 0);
                assert!(!flags.has_active_loans);
                assert!(flags.special_programs.is_empty());
            }
        }
    }

    #[test]
    fn some_phones_are_existing_customers() {
        let existing = (0..300u32)
            .filter(|n| flags_for_phone(&format!("+994551{:06}", n)).existing_customer)
            .count();
        assert!(existing > 0 && existing < 300);
    }

    #[tokio::test]
    async fn push_returns_crm_reference() {
        let client = MockCrmClient::instant();
        let result = client
            .push_application(ApplicationId::new(), "+994501234567", "Turan", "Aliyev")
            .await
            .unwrap();
        assert!(result.success);
        let reference = result.reference_id.unwrap();
        assert!(reference.starts_with("CRM-"));
        assert_eq!(reference.len(), 12);
        assert_eq!(reference, reference.to_uppercase());
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_latency_is_bounded() {
        let client = MockCrmClient::new();
        let started = tokio::time::Instant::now();
        client.fetch_customer_flags("+994501234567").await.unwrap();
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(MIN_DELAY_MS));
        assert!(elapsed <= Duration::from_millis(MAX_DELAY_MS + 1));
    }
}
