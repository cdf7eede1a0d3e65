//! Loan application handlers. All routes sit behind `require_auth`.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::{Extension, Json};
use kredo_core::ids::ApplicationId;
use tracing::info;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedPhone;
use crate::models::{
    ApplicationStatusResponse, ApplyToLoanRequest, LoanResultResponse, SubmitAmountRequest,
};

fn application_id(path: Result<Path<Uuid>, PathRejection>) -> AppResult<ApplicationId> {
    let Path(id) = path?;
    Ok(ApplicationId::from(id))
}

/// `POST /loan-application/apply-to-loan`
pub async fn apply_to_loan_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPhone(phone)): Extension<AuthenticatedPhone>,
    payload: Result<Json<ApplyToLoanRequest>, JsonRejection>,
) -> AppResult<Json<ApplicationStatusResponse>> {
    let Json(body) = payload?;
    info!("loan application received");
    let created = state.applications.submit_info(&phone, body.into()).await?;
    Ok(Json(ApplicationStatusResponse {
        application_id: created.application_id.as_uuid(),
        status: created.status.to_string(),
    }))
}

/// `POST /loan-application/{id}/submit-requested-amount`
pub async fn submit_amount_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPhone(phone)): Extension<AuthenticatedPhone>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<SubmitAmountRequest>, JsonRejection>,
) -> AppResult<Json<ApplicationStatusResponse>> {
    let id = application_id(path)?;
    let Json(body) = payload?;
    info!(application_id = %id, "requested amount submitted");
    let scored = state
        .applications
        .submit_amount(&phone, id, body.requested_amount, body.term_months)
        .await?;
    Ok(Json(ApplicationStatusResponse {
        application_id: scored.application_id.as_uuid(),
        status: scored.status.to_string(),
    }))
}

/// `POST /loan-application/{id}/accept-offer`
pub async fn accept_offer_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPhone(phone)): Extension<AuthenticatedPhone>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<()> {
    let id = application_id(path)?;
    state.applications.accept_offer(&phone, id).await?;
    Ok(())
}

/// `POST /loan-application/{id}/reject-offer`
pub async fn reject_offer_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPhone(phone)): Extension<AuthenticatedPhone>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<()> {
    let id = application_id(path)?;
    state.applications.reject_offer(&phone, id).await?;
    Ok(())
}

/// `POST /loan-application/{id}/finalize`
pub async fn finalize_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPhone(phone)): Extension<AuthenticatedPhone>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<()> {
    let id = application_id(path)?;
    state.applications.finalize(&phone, id).await?;
    Ok(())
}

/// `GET /loan-application/{id}/result`
pub async fn result_handler(
    State(state): State<AppState>,
    Extension(AuthenticatedPhone(phone)): Extension<AuthenticatedPhone>,
    path: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<LoanResultResponse>> {
    let id = application_id(path)?;
    info!(application_id = %id, "result requested");
    let result = state.applications.get_result(&phone, id).await?;
    Ok(Json(result.into()))
}
