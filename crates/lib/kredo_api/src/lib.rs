//! # kredo_api
//!
//! HTTP API library for Kredo.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use kredo_core::application::{ApplicationStateMachine, ApplicationStore, MemoryApplicationStore};
use kredo_core::auth::TokenIssuer;
use kredo_core::crm::{CrmClient, MockCrmClient};
use kredo_core::crypto::FieldCipher;
use kredo_core::error::CoreResult;
use kredo_core::identity::{IdentityProvider, StaticIdentityProvider};
use kredo_core::otp::delivery::{LoggingDelivery, OtpDelivery};
use kredo_core::otp::{MemoryOtpStore, OtpChallengeManager, OtpChallengeStore};
use kredo_core::rate_limit::RateLimiter;
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::handlers::{loan, otp};

/// Storage and collaborator implementations behind the API.
#[derive(Clone)]
pub struct Backends {
    pub otp_store: Arc<dyn OtpChallengeStore>,
    pub application_store: Arc<dyn ApplicationStore>,
    pub delivery: Arc<dyn OtpDelivery>,
    pub identity: Arc<dyn IdentityProvider>,
    pub crm: Arc<dyn CrmClient>,
}

impl Backends {
    /// Process-local stores with the development collaborators.
    pub fn in_memory() -> Self {
        Self {
            otp_store: Arc::new(MemoryOtpStore::new()),
            application_store: Arc::new(MemoryApplicationStore::new()),
            delivery: Arc::new(LoggingDelivery),
            identity: Arc::new(StaticIdentityProvider::default()),
            crm: Arc::new(MockCrmClient::new()),
        }
    }

    /// Postgres stores with the development collaborators.
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            otp_store: Arc::new(kredo_core::otp::queries::PgOtpStore::new(pool.clone())),
            application_store: Arc::new(
                kredo_core::application::queries::PgApplicationStore::new(pool),
            ),
            ..Self::in_memory()
        }
    }
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub otp: Arc<OtpChallengeManager>,
    pub applications: Arc<ApplicationStateMachine>,
    pub tokens: TokenIssuer,
    pub rate_limiter: Arc<RateLimiter>,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    /// Wire the domain components. Must run inside a Tokio runtime.
    pub fn new(config: ApiConfig, backends: Backends) -> CoreResult<Self> {
        let tokens = TokenIssuer::new(config.jwt_secret.as_bytes(), &config.core.token);
        let cipher = FieldCipher::from_base64_key(&config.encryption_key)?;
        let otp = OtpChallengeManager::new(
            backends.otp_store,
            backends.delivery,
            backends.identity,
            tokens.clone(),
            config.core.otp.clone(),
        );
        let applications = ApplicationStateMachine::new(
            backends.application_store,
            cipher,
            backends.crm,
            &config.core.crm,
        );
        Ok(Self {
            otp: Arc::new(otp),
            applications: Arc::new(applications),
            tokens,
            rate_limiter: Arc::new(RateLimiter::new(&config.core.rate_limit)),
            config,
        })
    }
}

/// Run embedded database migrations.
///
/// Delegates to `kredo_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    kredo_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public, throttled per client and path
    let public = Router::new()
        .route(routes::POST_GENERATE_OTP, post(otp::generate_otp_handler))
        .route(routes::POST_VERIFY_OTP, post(otp::verify_otp_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit::throttle,
        ));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::POST_APPLY_TO_LOAN, post(loan::apply_to_loan_handler))
        .route(routes::POST_SUBMIT_AMOUNT, post(loan::submit_amount_handler))
        .route(routes::POST_ACCEPT_OFFER, post(loan::accept_offer_handler))
        .route(routes::POST_REJECT_OFFER, post(loan::reject_offer_handler))
        .route(routes::POST_FINALIZE, post(loan::finalize_handler))
        .route(routes::GET_RESULT, get(loan::result_handler))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
