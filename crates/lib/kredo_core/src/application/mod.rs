//! Loan applications and their lifecycle.

pub mod lifecycle;
pub mod queries;
pub mod store;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ApplicationId;

pub use lifecycle::{ApplicationResult, ApplicationStateMachine, ApplyCommand, Consent, StatusUpdate};
pub use store::{ApplicationStore, MemoryApplicationStore};

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {other}", stringify!($name))),
                }
            }
        }
    };
}

wire_enum!(
    /// Lifecycle status of an application.
    ///
    /// `PendingCrm` is reserved: no transition produces or consumes it.
    ApplicationStatus {
        OtpPending => "OTP_PENDING",
        OtpVerified => "OTP_VERIFIED",
        InfoSubmitted => "INFO_SUBMITTED",
        AmountSubmitted => "AMOUNT_SUBMITTED",
        Scoring => "SCORING",
        OfferPending => "OFFER_PENDING",
        OfferAccepted => "OFFER_ACCEPTED",
        OfferRejected => "OFFER_REJECTED",
        PendingCrm => "PENDING_CRM",
        Completed => "COMPLETED",
    }
);

wire_enum!(
    /// Credit decision outcome.
    Decision {
        Approved => "APPROVED",
        Rejected => "REJECTED",
        ManualReview => "MANUAL_REVIEW",
        CustomerRejected => "CUSTOMER_REJECTED",
    }
);

wire_enum!(
    /// Applicant employment status.
    EmploymentStatus {
        Employed => "EMPLOYED",
        SelfEmployed => "SELF_EMPLOYED",
        Unemployed => "UNEMPLOYED",
        Retired => "RETIRED",
        Student => "STUDENT",
    }
);

/// A loan application as stored.
///
/// `fin_encrypted` and `address_encrypted` hold ciphertext only. Callers that
/// need the plaintext decrypt explicitly; nothing is cached on the record.
#[derive(Debug, Clone)]
pub struct LoanApplication {
    pub id: ApplicationId,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub fin_encrypted: String,
    pub date_of_birth: NaiveDate,
    pub employment_status: EmploymentStatus,
    pub monthly_income: f64,
    pub existing_monthly_debt: f64,
    pub address_encrypted: String,
    pub terms_accepted: bool,
    pub privacy_accepted: bool,
    pub consent_timestamp: Option<DateTime<Utc>>,
    pub requested_amount: Option<f64>,
    pub term_months: Option<u32>,
    pub status: ApplicationStatus,
    pub score: Option<u32>,
    pub decision: Option<Decision>,
    pub approved_amount: Option<f64>,
    pub apr: Option<f64>,
    pub reason_codes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanApplication {
    pub fn is_owned_by(&self, phone: &str) -> bool {
        self.phone_number == phone
    }

    /// Set a new status and stamp `updated_at`.
    pub fn transition(&mut self, status: ApplicationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}
