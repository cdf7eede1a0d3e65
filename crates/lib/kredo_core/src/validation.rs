//! Input validation.
//!
//! Validators collect every failing field into [`FieldErrors`] instead of
//! stopping at the first problem, so the caller sees the complete picture.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;

use crate::error::{CoreError, CoreResult};

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+994[0-9]{9}$").expect("static regex"));
static FIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{7,10}$").expect("static regex"));

pub const MIN_LOAN_AMOUNT: f64 = 100.0;
pub const MAX_LOAN_AMOUNT: f64 = 50_000.0;
pub const MIN_TERM_MONTHS: u32 = 3;
pub const MAX_TERM_MONTHS: u32 = 60;

/// Ordered field → reason map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure. The first reason for a field wins.
    pub fn add(&mut self, field: &str, reason: impl Into<String>) {
        self.0.entry(field.to_string()).or_insert_with(|| reason.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(())` when nothing failed, otherwise `CoreError::Validation`.
    pub fn into_result(self) -> CoreResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CoreError::Validation(self))
        }
    }
}

pub fn check_phone(errors: &mut FieldErrors, field: &str, phone: &str) {
    if phone.trim().is_empty() {
        errors.add(field, "Phone number is required");
    } else if !PHONE_RE.is_match(phone) {
        errors.add(field, "Phone number must be in format +994XXXXXXXXX");
    }
}

pub fn check_otp_code(errors: &mut FieldErrors, field: &str, code: &str, length: u32) {
    if code.is_empty() {
        errors.add(field, "OTP code is required");
    } else if code.len() != length as usize || !code.bytes().all(|b| b.is_ascii_digit()) {
        errors.add(field, format!("OTP code must be {length} digits"));
    }
}

pub fn check_name(errors: &mut FieldErrors, field: &str, label: &str, value: &str) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, format!("{label} is required"));
    } else if !(2..=100).contains(&len) {
        errors.add(field, format!("{label} must be between 2 and 100 characters"));
    }
}

pub fn check_fin(errors: &mut FieldErrors, field: &str, fin: &str) {
    if fin.trim().is_empty() {
        errors.add(field, "FIN is required");
    } else if !FIN_RE.is_match(fin) {
        errors.add(field, "FIN must be 7-10 alphanumeric characters");
    }
}

pub fn check_address(errors: &mut FieldErrors, field: &str, address: &str) {
    let len = address.trim().chars().count();
    if len == 0 {
        errors.add(field, "Address is required");
    } else if !(5..=500).contains(&len) {
        errors.add(field, "Address must be between 5 and 500 characters");
    }
}

pub fn check_date_of_birth(errors: &mut FieldErrors, field: &str, dob: NaiveDate, today: NaiveDate) {
    if dob >= today {
        errors.add(field, "Date of birth must be in the past");
    }
}

pub fn check_income(errors: &mut FieldErrors, field: &str, income: f64) {
    if !income.is_finite() || income < 0.01 {
        errors.add(field, "Monthly income must be greater than 0");
    }
}

pub fn check_debt(errors: &mut FieldErrors, field: &str, debt: f64) {
    if !debt.is_finite() || debt < 0.0 {
        errors.add(field, "Existing monthly debt cannot be negative");
    }
}

pub fn check_amount(errors: &mut FieldErrors, field: &str, amount: f64) {
    if !amount.is_finite() || amount < MIN_LOAN_AMOUNT {
        errors.add(field, "Minimum loan amount is 100 AZN");
    } else if amount > MAX_LOAN_AMOUNT {
        errors.add(field, "Maximum loan amount is 50,000 AZN");
    }
}

pub fn check_term(errors: &mut FieldErrors, field: &str, term_months: u32) {
    if term_months < MIN_TERM_MONTHS {
        errors.add(field, "Minimum term is 3 months");
    } else if term_months > MAX_TERM_MONTHS {
        errors.add(field, "Maximum term is 60 months");
    }
}
