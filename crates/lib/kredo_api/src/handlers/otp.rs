//! Phone verification handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use kredo_core::ids::ChallengeId;
use tracing::info;

use crate::AppState;
use crate::error::AppResult;
use crate::models::{GenerateOtpRequest, GenerateOtpResponse, VerifyOtpRequest, VerifyOtpResponse};

/// `POST /otp-service/generate-otp`: create a challenge and send the code.
pub async fn generate_otp_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateOtpRequest>, JsonRejection>,
) -> AppResult<Json<GenerateOtpResponse>> {
    let Json(body) = payload?;
    info!(channel = %body.channel, "otp generation requested");
    let generated = state.otp.generate(&body.phone_number, &body.channel).await?;
    Ok(Json(GenerateOtpResponse {
        request_id: generated.id.as_uuid(),
        ttl_seconds: generated.ttl_seconds,
    }))
}

/// `POST /otp-service/verify-otp`: check the code and mint an access token.
pub async fn verify_otp_handler(
    State(state): State<AppState>,
    payload: Result<Json<VerifyOtpRequest>, JsonRejection>,
) -> AppResult<Json<VerifyOtpResponse>> {
    let Json(body) = payload?;
    info!(request_id = %body.request_id, "otp verification requested");
    let verified = state
        .otp
        .verify(
            ChallengeId::from(body.request_id),
            &body.phone_number,
            &body.otp_code,
        )
        .await?;
    Ok(Json(VerifyOtpResponse {
        verified: true,
        access_token: verified.token.token,
        expires_in_seconds: verified.token.expires_in_seconds,
        personal_data: verified.profile,
    }))
}
