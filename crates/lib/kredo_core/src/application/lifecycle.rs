//! Application lifecycle.
//!
//! ```text
//! INFO_SUBMITTED -> SCORING -> OFFER_PENDING -> OFFER_ACCEPTED | OFFER_REJECTED -> COMPLETED
//!                          \-> COMPLETED (hard rejection)
//! ```
//!
//! Every operation is checked against the phone carried by the caller's
//! bearer token. Mutations of one application are serialized by its id;
//! creation is serialized by phone so the duplicate check and the insert
//! cannot interleave.
//!
//! Accept, reject and finalize only check ownership, not the current status.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};

use super::store::ApplicationStore;
use super::{ApplicationStatus, Decision, EmploymentStatus, LoanApplication};
use crate::config::CrmConfig;
use crate::crm::{CrmClient, CrmDispatcher, CrmPush, CustomerFlags};
use crate::crypto::FieldCipher;
use crate::decision::{CRM_UNAVAILABLE, DecisionEngine, DecisionInput};
use crate::error::{CoreError, CoreResult};
use crate::ids::ApplicationId;
use crate::mask_phone;
use crate::sync::KeyedLocks;
use crate::validation::{
    FieldErrors, check_address, check_amount, check_date_of_birth, check_debt, check_fin,
    check_income, check_name, check_phone, check_term,
};

/// Terms and privacy consent given with an application.
#[derive(Debug, Clone, Copy, Default)]
pub struct Consent {
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
}

/// Personal and financial data submitted to open an application.
#[derive(Debug, Clone)]
pub struct ApplyCommand {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub fin: String,
    pub date_of_birth: NaiveDate,
    pub employment_status: String,
    pub monthly_income: f64,
    pub existing_monthly_debt: f64,
    pub address: String,
    pub consent: Consent,
}

/// Id and status after a state-changing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
}

/// Read-only view of an application's status and decision.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationResult {
    pub application_id: ApplicationId,
    pub status: ApplicationStatus,
    pub decision: Option<Decision>,
    pub score: Option<u32>,
    pub approved_amount: Option<f64>,
    pub apr: Option<f64>,
    pub reason_codes: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl From<&LoanApplication> for ApplicationResult {
    fn from(a: &LoanApplication) -> Self {
        Self {
            application_id: a.id,
            status: a.status,
            decision: a.decision,
            score: a.score,
            approved_amount: a.approved_amount,
            apr: a.apr,
            reason_codes: a.reason_codes.clone(),
            last_updated: a.updated_at,
        }
    }
}

pub struct ApplicationStateMachine {
    store: Arc<dyn ApplicationStore>,
    cipher: FieldCipher,
    engine: DecisionEngine,
    crm: Arc<dyn CrmClient>,
    dispatcher: CrmDispatcher,
    flags_timeout: Duration,
    locks: KeyedLocks<ApplicationId>,
    phone_locks: KeyedLocks<String>,
}

impl ApplicationStateMachine {
    /// Build a state machine. Spawns the CRM push worker, so a Tokio runtime must be running.
    pub fn new(
        store: Arc<dyn ApplicationStore>,
        cipher: FieldCipher,
        crm: Arc<dyn CrmClient>,
        config: &CrmConfig,
    ) -> Self {
        let dispatcher = CrmDispatcher::spawn(Arc::clone(&crm), config);
        Self {
            store,
            cipher,
            engine: DecisionEngine::new(),
            crm,
            dispatcher,
            flags_timeout: config.flags_timeout(),
            locks: KeyedLocks::new(),
            phone_locks: KeyedLocks::new(),
        }
    }

    pub fn crm_dispatcher(&self) -> &CrmDispatcher {
        &self.dispatcher
    }

    /// Open an application in `INFO_SUBMITTED` and queue the CRM push.
    pub async fn submit_info(
        &self,
        auth_phone: &str,
        cmd: ApplyCommand,
    ) -> CoreResult<StatusUpdate> {
        let employment_status = validate_apply(&cmd, Utc::now().date_naive())?;

        if cmd.phone_number != auth_phone {
            warn!("phone number mismatch between request and token");
            return Err(CoreError::Unauthorized(
                "phone number does not match the verified phone".into(),
            ));
        }

        let _guard = self.phone_locks.lock(cmd.phone_number.clone()).await;
        if self.store.has_active_for_phone(&cmd.phone_number).await? {
            info!(phone = %mask_phone(&cmd.phone_number), "duplicate application attempt");
            return Err(CoreError::DuplicateApplication);
        }

        let now = Utc::now();
        let application = LoanApplication {
            id: ApplicationId::new(),
            fin_encrypted: self.cipher.encrypt(&cmd.fin)?,
            address_encrypted: self.cipher.encrypt(&cmd.address)?,
            phone_number: cmd.phone_number,
            first_name: cmd.first_name,
            last_name: cmd.last_name,
            date_of_birth: cmd.date_of_birth,
            employment_status,
            monthly_income: cmd.monthly_income,
            existing_monthly_debt: cmd.existing_monthly_debt,
            terms_accepted: cmd.consent.terms_accepted,
            privacy_accepted: cmd.consent.privacy_accepted,
            consent_timestamp: Some(now),
            requested_amount: None,
            term_months: None,
            status: ApplicationStatus::InfoSubmitted,
            score: None,
            decision: None,
            approved_amount: None,
            apr: None,
            reason_codes: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        self.store.insert(&application).await?;
        info!(application_id = %application.id, "loan application created");

        self.dispatcher.enqueue(CrmPush {
            application_id: application.id,
            phone_number: application.phone_number.clone(),
            first_name: application.first_name.clone(),
            last_name: application.last_name.clone(),
        });

        Ok(StatusUpdate {
            application_id: application.id,
            status: application.status,
        })
    }

    /// Record the requested amount and term, then score the application.
    pub async fn submit_amount(
        &self,
        auth_phone: &str,
        id: ApplicationId,
        requested_amount: f64,
        term_months: u32,
    ) -> CoreResult<StatusUpdate> {
        let mut errors = FieldErrors::new();
        check_amount(&mut errors, "requestedAmount", requested_amount);
        check_term(&mut errors, "termMonths", term_months);
        errors.into_result()?;

        let _guard = self.locks.lock(id).await;
        let mut application = self.owned(auth_phone, id).await?;
        if application.status != ApplicationStatus::InfoSubmitted {
            return Err(CoreError::InvalidStatus {
                actual: application.status,
                expected: ApplicationStatus::InfoSubmitted,
            });
        }

        application.requested_amount = Some(requested_amount);
        application.term_months = Some(term_months);
        application.transition(ApplicationStatus::Scoring, Utc::now());
        self.store.update(&application).await?;
        info!(application_id = %id, "application moved to SCORING");

        let flags = self.customer_flags(id, &application.phone_number).await;
        let input = DecisionInput {
            date_of_birth: application.date_of_birth,
            employment_status: application.employment_status,
            monthly_income: application.monthly_income,
            existing_monthly_debt: application.existing_monthly_debt,
            requested_amount,
            term_months,
        };
        let now = Utc::now();
        let outcome = self
            .engine
            .evaluate(&input, flags.as_ref(), now.date_naive());

        application.score = Some(outcome.score);
        application.decision = Some(outcome.decision);
        application.approved_amount = outcome.approved_amount;
        application.apr = outcome.apr;
        application.reason_codes = outcome.reason_codes;
        if flags.is_none() {
            application.reason_codes.push(CRM_UNAVAILABLE.to_string());
        }
        let next = if outcome.decision == Decision::Rejected {
            ApplicationStatus::Completed
        } else {
            ApplicationStatus::OfferPending
        };
        application.transition(next, now);
        self.store.update(&application).await?;

        info!(
            application_id = %id,
            score = outcome.score,
            decision = %outcome.decision,
            status = %next,
            "application evaluated"
        );
        Ok(StatusUpdate {
            application_id: id,
            status: next,
        })
    }

    pub async fn accept_offer(&self, auth_phone: &str, id: ApplicationId) -> CoreResult<()> {
        self.set_status(auth_phone, id, ApplicationStatus::OfferAccepted, None)
            .await
    }

    /// Customer declines the offer; recorded as a customer-initiated rejection.
    pub async fn reject_offer(&self, auth_phone: &str, id: ApplicationId) -> CoreResult<()> {
        self.set_status(
            auth_phone,
            id,
            ApplicationStatus::OfferRejected,
            Some(Decision::CustomerRejected),
        )
        .await
    }

    pub async fn finalize(&self, auth_phone: &str, id: ApplicationId) -> CoreResult<()> {
        self.set_status(auth_phone, id, ApplicationStatus::Completed, None)
            .await
    }

    pub async fn get_result(
        &self,
        auth_phone: &str,
        id: ApplicationId,
    ) -> CoreResult<ApplicationResult> {
        let application = self.owned(auth_phone, id).await?;
        Ok(ApplicationResult::from(&application))
    }

    /// Plaintext national identifier of an application.
    pub fn decrypt_fin(&self, application: &LoanApplication) -> CoreResult<String> {
        self.cipher.decrypt(&application.fin_encrypted)
    }

    /// Plaintext address of an application.
    pub fn decrypt_address(&self, application: &LoanApplication) -> CoreResult<String> {
        self.cipher.decrypt(&application.address_encrypted)
    }

    async fn set_status(
        &self,
        auth_phone: &str,
        id: ApplicationId,
        status: ApplicationStatus,
        decision: Option<Decision>,
    ) -> CoreResult<()> {
        let _guard = self.locks.lock(id).await;
        let mut application = self.owned(auth_phone, id).await?;
        let previous = application.status;
        if let Some(decision) = decision {
            application.decision = Some(decision);
        }
        application.transition(status, Utc::now());
        self.store.update(&application).await?;
        info!(application_id = %id, from = %previous, to = %status, "application status changed");
        Ok(())
    }

    async fn owned(&self, auth_phone: &str, id: ApplicationId) -> CoreResult<LoanApplication> {
        let application = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("Loan application {id}")))?;
        if !application.is_owned_by(auth_phone) {
            warn!(application_id = %id, "access attempt by non-owner");
            return Err(CoreError::Unauthorized(
                "application belongs to another customer".into(),
            ));
        }
        Ok(application)
    }

    async fn customer_flags(&self, id: ApplicationId, phone: &str) -> Option<CustomerFlags> {
        match tokio::time::timeout(self.flags_timeout, self.crm.fetch_customer_flags(phone)).await
        {
            Ok(Ok(flags)) => {
                info!(application_id = %id, tier = flags.credit_tier, "crm flags received");
                Some(flags)
            }
            Ok(Err(e)) => {
                warn!(application_id = %id, error = %e, "crm flags unavailable, scoring without them");
                None
            }
            Err(_) => {
                warn!(
                    application_id = %id,
                    timeout_ms = self.flags_timeout.as_millis() as u64,
                    "crm flags timed out, scoring without them"
                );
                None
            }
        }
    }
}

fn validate_apply(cmd: &ApplyCommand, today: NaiveDate) -> CoreResult<EmploymentStatus> {
    let mut errors = FieldErrors::new();
    check_phone(&mut errors, "phoneNumber", &cmd.phone_number);
    check_name(&mut errors, "firstName", "First name", &cmd.first_name);
    check_name(&mut errors, "lastName", "Last name", &cmd.last_name);
    check_fin(&mut errors, "fin", &cmd.fin);
    check_date_of_birth(&mut errors, "dateOfBirth", cmd.date_of_birth, today);
    check_income(&mut errors, "monthlyIncome", cmd.monthly_income);
    check_debt(&mut errors, "existingMonthlyDebt", cmd.existing_monthly_debt);
    check_address(&mut errors, "address", &cmd.address);
    let employment = cmd.employment_status.parse::<EmploymentStatus>().ok();
    if employment.is_none() {
        errors.add("employmentStatus", "Invalid employment status");
    }
    if !cmd.consent.terms_accepted {
        errors.add("consent.termsAccepted", "Terms and conditions must be accepted");
    }
    if !cmd.consent.privacy_accepted {
        errors.add("consent.privacyAccepted", "Privacy policy must be accepted");
    }
    errors.into_result()?;
    employment.ok_or_else(|| CoreError::invalid_field("employmentStatus", "Invalid employment status"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::store::MemoryApplicationStore;
    use crate::crm::PushResult;
    use async_trait::async_trait;

    const PHONE: &str = "+994501234567";
    const OTHER: &str = "+994551112233";

    /// CRM with fixed flags and a configurable flag-lookup delay.
    struct FixedCrm {
        flags: CustomerFlags,
        delay: Duration,
    }

    #[async_trait]
    impl CrmClient for FixedCrm {
        async fn push_application(
            &self,
            _id: ApplicationId,
            _phone: &str,
            _first_name: &str,
            _last_name: &str,
        ) -> CoreResult<PushResult> {
            Ok(PushResult::accepted("CRM-FIXED001"))
        }

        async fn fetch_customer_flags(&self, _phone: &str) -> CoreResult<CustomerFlags> {
            tokio::time::sleep(self.delay).await;
            Ok(self.flags.clone())
        }
    }

    fn machine_with(crm: FixedCrm) -> (ApplicationStateMachine, Arc<MemoryApplicationStore>) {
        let store = Arc::new(MemoryApplicationStore::new());
        let machine = ApplicationStateMachine::new(
            store.clone(),
            FieldCipher::new(&[7u8; 32]),
            Arc::new(crm),
            &CrmConfig::default(),
        );
        (machine, store)
    }

    fn machine() -> (ApplicationStateMachine, Arc<MemoryApplicationStore>) {
        machine_with(FixedCrm {
            flags: CustomerFlags::default(),
            delay: Duration::ZERO,
        })
    }

    fn command(phone: &str) -> ApplyCommand {
        ApplyCommand {
            phone_number: phone.into(),
            first_name: "Turan".into(),
            last_name: "Aliyev".into(),
            fin: "7ABC123".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 10).unwrap(),
            employment_status: "EMPLOYED".into(),
            monthly_income: 3000.0,
            existing_monthly_debt: 100.0,
            address: "Bakı, Nəsimi rayonu, mənzil 42".into(),
            consent: Consent {
                terms_accepted: true,
                privacy_accepted: true,
            },
        }
    }

    #[tokio::test]
    async fn submit_info_encrypts_and_queues_crm_push() {
        let (machine, store) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        assert_eq!(created.status, ApplicationStatus::InfoSubmitted);

        let stored = store.find(created.application_id).await.unwrap().unwrap();
        assert_ne!(stored.fin_encrypted, "7ABC123");
        assert!(!stored.address_encrypted.contains("Nəsimi"));
        assert_eq!(machine.decrypt_fin(&stored).unwrap(), "7ABC123");
        assert_eq!(
            machine.decrypt_address(&stored).unwrap(),
            "Bakı, Nəsimi rayonu, mənzil 42"
        );
        assert!(stored.consent_timestamp.is_some());
        assert_eq!(machine.crm_dispatcher().metrics().enqueued, 1);
    }

    #[tokio::test]
    async fn submit_info_requires_token_phone() {
        let (machine, store) = machine();
        let result = machine.submit_info(OTHER, command(PHONE)).await;
        assert!(matches!(result, Err(CoreError::Unauthorized(_))));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn submit_info_aggregates_validation_errors() {
        let (machine, _) = machine();
        let mut cmd = command(PHONE);
        cmd.fin = "abc".into();
        cmd.employment_status = "FREELANCER".into();
        cmd.monthly_income = 0.0;
        cmd.consent.privacy_accepted = false;
        match machine.submit_info(PHONE, cmd).await {
            Err(CoreError::Validation(errors)) => {
                assert!(errors.get("fin").is_some());
                assert!(errors.get("employmentStatus").is_some());
                assert!(errors.get("monthlyIncome").is_some());
                assert!(errors.get("consent.privacyAccepted").is_some());
                assert!(errors.get("consent.termsAccepted").is_none());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn second_active_application_is_duplicate() {
        let (machine, _) = machine();
        let first = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        let second = machine.submit_info(PHONE, command(PHONE)).await;
        assert!(matches!(second, Err(CoreError::DuplicateApplication)));

        machine.finalize(PHONE, first.application_id).await.unwrap();
        assert!(machine.submit_info(PHONE, command(PHONE)).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_submissions_create_one_application() {
        let (machine, store) = machine();
        let machine = Arc::new(machine);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let machine = Arc::clone(&machine);
            handles.push(tokio::spawn(async move {
                machine.submit_info(PHONE, command(PHONE)).await
            }));
        }
        let mut created = 0;
        for h in handles {
            match h.await.unwrap() {
                Ok(_) => created += 1,
                Err(CoreError::DuplicateApplication) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn strong_applicant_gets_an_offer() {
        let (machine, _) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        let scored = machine
            .submit_amount(PHONE, created.application_id, 5000.0, 12)
            .await
            .unwrap();
        assert_eq!(scored.status, ApplicationStatus::OfferPending);

        let result = machine.get_result(PHONE, created.application_id).await.unwrap();
        assert_eq!(result.decision, Some(Decision::Approved));
        assert_eq!(result.score, Some(780));
        assert_eq!(result.approved_amount, Some(4500.0));
        assert_eq!(result.apr, Some(15.0));
        assert!(!result.reason_codes.iter().any(|r| r == CRM_UNAVAILABLE));
    }

    #[tokio::test]
    async fn hard_rejection_completes_application() {
        let (machine, _) = machine();
        let mut cmd = command(PHONE);
        cmd.employment_status = "UNEMPLOYED".into();
        cmd.monthly_income = 300.0;
        cmd.existing_monthly_debt = 200.0;
        let created = machine.submit_info(PHONE, cmd).await.unwrap();
        let scored = machine
            .submit_amount(PHONE, created.application_id, 5000.0, 12)
            .await
            .unwrap();
        assert_eq!(scored.status, ApplicationStatus::Completed);

        let result = machine.get_result(PHONE, created.application_id).await.unwrap();
        assert_eq!(result.decision, Some(Decision::Rejected));
        assert!(result.apr.is_none());
        // A completed application no longer blocks a new one.
        assert!(machine.submit_info(PHONE, command(PHONE)).await.is_ok());
    }

    #[tokio::test]
    async fn amount_twice_is_invalid_status() {
        let (machine, _) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        machine
            .submit_amount(PHONE, created.application_id, 5000.0, 12)
            .await
            .unwrap();
        match machine
            .submit_amount(PHONE, created.application_id, 5000.0, 12)
            .await
        {
            Err(err @ CoreError::InvalidStatus { .. }) => {
                let message = err.to_string();
                assert!(message.contains("OFFER_PENDING"));
                assert!(message.contains("INFO_SUBMITTED"));
            }
            other => panic!("expected INVALID_STATUS, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn amount_out_of_range_is_rejected_before_lookup() {
        let (machine, _) = machine();
        match machine.submit_amount(PHONE, ApplicationId::new(), 50.0, 72).await {
            Err(CoreError::Validation(errors)) => {
                assert!(errors.get("requestedAmount").is_some());
                assert!(errors.get("termMonths").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_customers_cannot_touch_application() {
        let (machine, _) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        let id = created.application_id;

        assert!(matches!(
            machine.submit_amount(OTHER, id, 5000.0, 12).await,
            Err(CoreError::Unauthorized(_))
        ));
        assert!(matches!(machine.accept_offer(OTHER, id).await, Err(CoreError::Unauthorized(_))));
        assert!(matches!(machine.reject_offer(OTHER, id).await, Err(CoreError::Unauthorized(_))));
        assert!(matches!(machine.finalize(OTHER, id).await, Err(CoreError::Unauthorized(_))));
        assert!(matches!(machine.get_result(OTHER, id).await, Err(CoreError::Unauthorized(_))));
        assert!(matches!(
            machine.get_result(PHONE, ApplicationId::new()).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn accept_then_finalize() {
        let (machine, _) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        let id = created.application_id;
        machine.submit_amount(PHONE, id, 5000.0, 12).await.unwrap();

        machine.accept_offer(PHONE, id).await.unwrap();
        let result = machine.get_result(PHONE, id).await.unwrap();
        assert_eq!(result.status, ApplicationStatus::OfferAccepted);
        assert_eq!(result.decision, Some(Decision::Approved));

        machine.finalize(PHONE, id).await.unwrap();
        let result = machine.get_result(PHONE, id).await.unwrap();
        assert_eq!(result.status, ApplicationStatus::Completed);
    }

    #[tokio::test]
    async fn reject_records_customer_rejection() {
        let (machine, _) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        let id = created.application_id;
        machine.submit_amount(PHONE, id, 5000.0, 12).await.unwrap();
        let before = machine.get_result(PHONE, id).await.unwrap();

        machine.reject_offer(PHONE, id).await.unwrap();
        let after = machine.get_result(PHONE, id).await.unwrap();
        assert_eq!(after.status, ApplicationStatus::OfferRejected);
        assert_eq!(after.decision, Some(Decision::CustomerRejected));
        assert_eq!(after.score, before.score);
        assert!(after.last_updated >= before.last_updated);
    }

    #[tokio::test]
    async fn finalize_does_not_check_status() {
        let (machine, _) = machine();
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        machine.finalize(PHONE, created.application_id).await.unwrap();
        let result = machine.get_result(PHONE, created.application_id).await.unwrap();
        assert_eq!(result.status, ApplicationStatus::Completed);
        assert!(result.decision.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_crm_flags_do_not_stall_scoring() {
        let (machine, _) = machine_with(FixedCrm {
            flags: CustomerFlags::default(),
            delay: Duration::from_secs(600),
        });
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        let scored = machine
            .submit_amount(PHONE, created.application_id, 5000.0, 12)
            .await
            .unwrap();
        assert_eq!(scored.status, ApplicationStatus::OfferPending);

        let result = machine.get_result(PHONE, created.application_id).await.unwrap();
        assert_eq!(result.reason_codes.last().map(String::as_str), Some(CRM_UNAVAILABLE));
    }

    #[tokio::test]
    async fn crm_flags_feed_the_score() {
        let (machine, _) = machine_with(FixedCrm {
            flags: CustomerFlags {
                existing_customer: true,
                credit_tier: 4,
                special_programs: vec!["STANDARD".into()],
                ..CustomerFlags::default()
            },
            delay: Duration::ZERO,
        });
        let created = machine.submit_info(PHONE, command(PHONE)).await.unwrap();
        machine
            .submit_amount(PHONE, created.application_id, 5000.0, 12)
            .await
            .unwrap();
        let result = machine.get_result(PHONE, created.application_id).await.unwrap();
        assert_eq!(result.score, Some(800));
        assert_eq!(result.approved_amount, Some(5000.0));
    }
}
