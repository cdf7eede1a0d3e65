//! Request handlers.

pub mod loan;
pub mod otp;
