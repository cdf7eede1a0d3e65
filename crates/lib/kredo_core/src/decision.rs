//! Credit decision policy.
//!
//! [`DecisionEngine::evaluate`] is pure: the same input, flags and date always
//! give the same outcome. Scores start at [`BASE_SCORE`], are adjusted by each
//! rule in turn, and are clamped to [`MIN_SCORE`]..=[`MAX_SCORE`]. Every rule
//! that fires appends a reason code, in evaluation order.

use chrono::NaiveDate;
use tracing::debug;

use crate::application::{Decision, EmploymentStatus};
use crate::crm::CustomerFlags;

pub const MIN_SCORE: u32 = 300;
pub const MAX_SCORE: u32 = 850;
pub const BASE_SCORE: i32 = 600;
pub const APPROVE_THRESHOLD: u32 = 700;
pub const REVIEW_THRESHOLD: u32 = 600;

const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 70;
const HIGH_INCOME: f64 = 2500.0;
const MODERATE_INCOME: f64 = 1000.0;
const MAX_PAYMENT_SHARE: f64 = 0.4;

/// Appended by the caller when customer flags could not be fetched.
pub const CRM_UNAVAILABLE: &str = "CRM_UNAVAILABLE";

/// Applicant data the policy looks at.
#[derive(Debug, Clone)]
pub struct DecisionInput {
    pub date_of_birth: NaiveDate,
    pub employment_status: EmploymentStatus,
    pub monthly_income: f64,
    pub existing_monthly_debt: f64,
    pub requested_amount: f64,
    pub term_months: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecisionOutcome {
    pub score: u32,
    pub decision: Decision,
    /// Only for `Approved`.
    pub approved_amount: Option<f64>,
    /// Indicative rate; absent for `Rejected`.
    pub apr: Option<f64>,
    pub reason_codes: Vec<String>,
}

impl DecisionOutcome {
    fn hard_reject(reason: &str) -> Self {
        Self {
            score: MIN_SCORE,
            decision: Decision::Rejected,
            approved_amount: None,
            apr: None,
            reason_codes: vec![reason.to_string()],
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionEngine;

impl DecisionEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        input: &DecisionInput,
        flags: Option<&CustomerFlags>,
        today: NaiveDate,
    ) -> DecisionOutcome {
        let age = today.years_since(input.date_of_birth).unwrap_or(0);
        if !(MIN_AGE..=MAX_AGE).contains(&age) {
            return DecisionOutcome::hard_reject("AGE_OUT_OF_RANGE");
        }
        if input.monthly_income <= 0.0 {
            return DecisionOutcome::hard_reject("NO_INCOME");
        }

        let mut score = BASE_SCORE;
        let mut reasons: Vec<String> = Vec::new();
        let mut apply = |delta: i32, reason: &str| {
            score += delta;
            reasons.push(reason.to_string());
        };

        let dti = input.existing_monthly_debt / input.monthly_income;
        if dti > 0.5 {
            apply(-120, "DTI_EXCESSIVE");
        } else if dti > 0.3 {
            apply(-40, "DTI_MODERATE");
        } else {
            apply(40, "DTI_LOW");
        }

        match input.employment_status {
            EmploymentStatus::Employed => apply(80, "EMPLOYMENT_STABLE"),
            EmploymentStatus::SelfEmployed => apply(30, "EMPLOYMENT_SELF"),
            EmploymentStatus::Retired => apply(10, "EMPLOYMENT_RETIRED"),
            EmploymentStatus::Student => apply(-40, "EMPLOYMENT_STUDENT"),
            EmploymentStatus::Unemployed => apply(-150, "EMPLOYMENT_RISK"),
        }

        if input.monthly_income >= HIGH_INCOME {
            apply(60, "INCOME_HIGH");
        } else if input.monthly_income >= MODERATE_INCOME {
            apply(20, "INCOME_MODERATE");
        } else {
            apply(-60, "INCOME_LOW");
        }

        let disposable = input.monthly_income - input.existing_monthly_debt;
        let payment = input.requested_amount / f64::from(input.term_months.max(1));
        if payment > MAX_PAYMENT_SHARE * disposable {
            apply(-50, "AFFORDABILITY_RISK");
        }

        if let Some(flags) = flags {
            if flags.has_default_history {
                apply(-100, "CRM_DEFAULT_HISTORY");
            }
            if flags.has_active_loans {
                apply(-20, "CRM_ACTIVE_LOANS");
            }
            if flags.existing_customer {
                apply(5 * i32::from(flags.credit_tier), "CRM_EXISTING_CUSTOMER");
            }
        }

        let score = score.clamp(MIN_SCORE as i32, MAX_SCORE as i32) as u32;
        let decision = if score >= APPROVE_THRESHOLD {
            Decision::Approved
        } else if score < REVIEW_THRESHOLD {
            Decision::Rejected
        } else {
            Decision::ManualReview
        };

        let outcome = DecisionOutcome {
            score,
            decision,
            approved_amount: (decision == Decision::Approved)
                .then(|| approved_amount(input.requested_amount, score)),
            apr: (decision != Decision::Rejected).then(|| apr_for_score(score)),
            reason_codes: reasons,
        };
        debug!(score, decision = %decision, reasons = ?outcome.reason_codes, "decision evaluated");
        outcome
    }
}

/// Annual percentage rate for a score. Non-increasing in the score.
pub fn apr_for_score(score: u32) -> f64 {
    match score {
        800.. => 12.0,
        750..=799 => 15.0,
        700..=749 => 18.0,
        650..=699 => 22.0,
        _ => 26.0,
    }
}

fn approved_amount(requested: f64, score: u32) -> f64 {
    let share = match score {
        800.. => 1.0,
        750..=799 => 0.9,
        _ => 0.75,
    };
    (requested * share * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Months;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
    }

    fn input(
        dob: NaiveDate,
        employment: EmploymentStatus,
        income: f64,
        debt: f64,
        amount: f64,
        term: u32,
    ) -> DecisionInput {
        DecisionInput {
            date_of_birth: dob,
            employment_status: employment,
            monthly_income: income,
            existing_monthly_debt: debt,
            requested_amount: amount,
            term_months: term,
        }
    }

    fn dob(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn has(outcome: &DecisionOutcome, code: &str) -> bool {
        outcome.reason_codes.iter().any(|r| r == code)
    }

    #[test]
    fn high_income_employed_is_approved() {
        let engine = DecisionEngine::new();
        let outcome = engine.evaluate(
            &input(dob(1990, 5, 10), EmploymentStatus::Employed, 3000.0, 100.0, 5000.0, 12),
            None,
            today(),
        );
        assert_eq!(outcome.decision, Decision::Approved);
        assert_eq!(outcome.score, 780);
        assert!(has(&outcome, "INCOME_HIGH"));
        assert!(has(&outcome, "EMPLOYMENT_STABLE"));
        assert_eq!(outcome.apr, Some(15.0));
        assert_eq!(outcome.approved_amount, Some(4500.0));
    }

    #[test]
    fn low_income_unemployed_is_rejected() {
        let engine = DecisionEngine::new();
        let outcome = engine.evaluate(
            &input(dob(1990, 5, 10), EmploymentStatus::Unemployed, 300.0, 200.0, 5000.0, 12),
            None,
            today(),
        );
        assert_eq!(outcome.decision, Decision::Rejected);
        assert_eq!(outcome.score, MIN_SCORE);
        assert!(has(&outcome, "EMPLOYMENT_RISK"));
        assert!(has(&outcome, "DTI_EXCESSIVE"));
        assert!(has(&outcome, "AFFORDABILITY_RISK"));
        assert!(outcome.apr.is_none());
        assert!(outcome.approved_amount.is_none());
    }

    #[test]
    fn under_and_over_age_are_rejected() {
        let engine = DecisionEngine::new();
        let seventeen = today().checked_sub_months(Months::new(17 * 12)).unwrap();
        let young = engine.evaluate(
            &input(seventeen, EmploymentStatus::Employed, 2000.0, 0.0, 3000.0, 12),
            None,
            today(),
        );
        assert_eq!(young.decision, Decision::Rejected);
        assert_eq!(young.reason_codes, vec!["AGE_OUT_OF_RANGE"]);

        let seventy_two = today().checked_sub_months(Months::new(72 * 12)).unwrap();
        let old = engine.evaluate(
            &input(seventy_two, EmploymentStatus::Retired, 2000.0, 0.0, 3000.0, 12),
            None,
            today(),
        );
        assert_eq!(old.decision, Decision::Rejected);
        assert!(has(&old, "AGE_OUT_OF_RANGE"));
    }

    #[test]
    fn eighteenth_birthday_is_eligible() {
        let engine = DecisionEngine::new();
        let eighteen = today().checked_sub_months(Months::new(18 * 12)).unwrap();
        let outcome = engine.evaluate(
            &input(eighteen, EmploymentStatus::Student, 1200.0, 0.0, 1000.0, 12),
            None,
            today(),
        );
        assert!(!has(&outcome, "AGE_OUT_OF_RANGE"));
    }

    #[test]
    fn zero_income_is_rejected() {
        let engine = DecisionEngine::new();
        let outcome = engine.evaluate(
            &input(dob(1990, 5, 10), EmploymentStatus::Unemployed, 0.0, 0.0, 3000.0, 12),
            None,
            today(),
        );
        assert_eq!(outcome.decision, Decision::Rejected);
        assert_eq!(outcome.reason_codes, vec!["NO_INCOME"]);
        assert_eq!(outcome.score, MIN_SCORE);
    }

    #[test]
    fn borderline_goes_to_manual_review() {
        let engine = DecisionEngine::new();
        // 600 + 40 (DTI 0.17) + 30 (self-employed) + 20 (moderate income)
        let outcome = engine.evaluate(
            &input(dob(1985, 3, 15), EmploymentStatus::SelfEmployed, 1200.0, 200.0, 5000.0, 24),
            None,
            today(),
        );
        assert_eq!(outcome.score, 690);
        assert_eq!(outcome.decision, Decision::ManualReview);
        assert_eq!(outcome.apr, Some(22.0));
        assert!(outcome.approved_amount.is_none());
    }

    #[test]
    fn high_dti_lowers_score() {
        let engine = DecisionEngine::new();
        // 600 - 120 (DTI 0.6) + 80 + 20 - 50 (416.67 > 0.4 * 800)
        let outcome = engine.evaluate(
            &input(dob(1990, 5, 10), EmploymentStatus::Employed, 2000.0, 1200.0, 5000.0, 12),
            None,
            today(),
        );
        assert!(has(&outcome, "DTI_EXCESSIVE"));
        assert_eq!(outcome.score, 530);
        assert_eq!(outcome.decision, Decision::Rejected);
    }

    #[test]
    fn score_stays_in_range_with_reasons() {
        let engine = DecisionEngine::new();
        let cases = [
            (dob(1990, 1, 1), EmploymentStatus::Employed, 5000.0, 0.0, 10000.0, 12),
            (dob(2000, 1, 1), EmploymentStatus::Student, 500.0, 100.0, 1000.0, 6),
            (dob(1960, 1, 1), EmploymentStatus::Retired, 1500.0, 300.0, 3000.0, 36),
            (dob(1985, 1, 1), EmploymentStatus::SelfEmployed, 2500.0, 500.0, 8000.0, 24),
        ];
        let best_flags = CustomerFlags {
            existing_customer: true,
            credit_tier: 5,
            ..CustomerFlags::default()
        };
        for (d, e, income, debt, amount, term) in cases {
            for flags in [None, Some(&best_flags)] {
                let outcome = engine.evaluate(&input(d, e, income, debt, amount, term), flags, today());
                assert!((MIN_SCORE..=MAX_SCORE).contains(&outcome.score));
                assert!(!outcome.reason_codes.is_empty());
            }
        }
    }

    #[test]
    fn apr_never_increases_with_score() {
        let mut previous = f64::MAX;
        for score in MIN_SCORE..=MAX_SCORE {
            let apr = apr_for_score(score);
            assert!(apr <= previous, "apr rose at score {score}");
            previous = apr;
        }
    }

    #[test]
    fn approved_amount_is_positive_and_bounded() {
        for score in APPROVE_THRESHOLD..=MAX_SCORE {
            for requested in [100.0, 1234.57, 50000.0] {
                let amount = approved_amount(requested, score);
                assert!(amount > 0.0 && amount <= requested);
            }
        }
    }

    #[test]
    fn crm_flags_adjust_score() {
        let engine = DecisionEngine::new();
        let base = input(dob(1990, 5, 10), EmploymentStatus::Employed, 3000.0, 100.0, 5000.0, 12);

        let loyal = CustomerFlags {
            existing_customer: true,
            credit_tier: 4,
            special_programs: vec!["STANDARD".into()],
            ..CustomerFlags::default()
        };
        let outcome = engine.evaluate(&base, Some(&loyal), today());
        assert_eq!(outcome.score, 800);
        assert!(has(&outcome, "CRM_EXISTING_CUSTOMER"));
        assert_eq!(outcome.approved_amount, Some(5000.0));
        assert_eq!(outcome.apr, Some(12.0));

        let defaulted = CustomerFlags {
            has_default_history: true,
            ..CustomerFlags::default()
        };
        let outcome = engine.evaluate(&base, Some(&defaulted), today());
        assert_eq!(outcome.score, 680);
        assert_eq!(outcome.decision, Decision::ManualReview);
        assert!(has(&outcome, "CRM_DEFAULT_HISTORY"));
    }

    #[test]
    fn same_input_same_outcome() {
        let engine = DecisionEngine::new();
        let i = input(dob(1988, 7, 1), EmploymentStatus::Retired, 1500.0, 300.0, 3000.0, 36);
        assert_eq!(
            engine.evaluate(&i, None, today()),
            engine.evaluate(&i, None, today())
        );
    }
}
