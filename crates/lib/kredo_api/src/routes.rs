//! Route paths.

pub const POST_GENERATE_OTP: &str = "/api/v1/kredo-ms/otp-service/generate-otp";
pub const POST_VERIFY_OTP: &str = "/api/v1/kredo-ms/otp-service/verify-otp";

pub const POST_APPLY_TO_LOAN: &str = "/api/v1/kredo-ms/loan-application/apply-to-loan";
pub const POST_SUBMIT_AMOUNT: &str =
    "/api/v1/kredo-ms/loan-application/{application_id}/submit-requested-amount";
pub const POST_ACCEPT_OFFER: &str = "/api/v1/kredo-ms/loan-application/{application_id}/accept-offer";
pub const POST_REJECT_OFFER: &str = "/api/v1/kredo-ms/loan-application/{application_id}/reject-offer";
pub const POST_FINALIZE: &str = "/api/v1/kredo-ms/loan-application/{application_id}/finalize";
pub const GET_RESULT: &str = "/api/v1/kredo-ms/loan-application/{application_id}/result";
