//! Shared helpers: in-memory app, JSON requests, OTP login.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use kredo_api::config::ApiConfig;
use kredo_api::{AppState, Backends};
use kredo_core::config::CoreConfig;
use kredo_core::crm::MockCrmClient;
use kredo_core::crypto::generate_key_base64;
use kredo_core::ids::ChallengeId;
use kredo_core::otp::delivery::MemoryOutbox;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PHONE: &str = "+994501234567";
pub const OTHER_PHONE: &str = "+994551112233";

pub struct TestApp {
    pub router: Router,
    pub outbox: Arc<MemoryOutbox>,
}

pub fn test_app() -> TestApp {
    let mut core = CoreConfig::default();
    core.otp.hash_cost = 4;
    let config = ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url: None,
        jwt_secret: "test-secret".into(),
        encryption_key: generate_key_base64(),
        core,
    };
    let outbox = Arc::new(MemoryOutbox::new());
    let backends = Backends {
        delivery: outbox.clone(),
        crm: Arc::new(MockCrmClient::instant()),
        ..Backends::in_memory()
    };
    let state = AppState::new(config, backends).expect("app state");
    TestApp {
        router: kredo_api::router(state),
        outbox,
    }
}

impl TestApp {
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send_from(method, uri, token, body, "198.51.100.1").await
    }

    pub async fn send_from(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        client_ip: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", client_ip);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.expect("request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("parse JSON")
        };
        (status, json)
    }

    /// Generate a challenge for `phone` and return `(request_id, code)`.
    pub async fn generate(&self, phone: &str) -> (String, String) {
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/kredo-ms/otp-service/generate-otp",
                None,
                Some(json!({ "phoneNumber": phone, "channel": "SMS" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "generate failed: {body}");
        let request_id = body["requestId"].as_str().expect("requestId").to_string();
        let id: ChallengeId = request_id.parse().expect("challenge id");
        let code = self.outbox.code_for(id).expect("delivered code");
        (request_id, code)
    }

    /// Full OTP login; returns the access token.
    pub async fn login(&self, phone: &str) -> String {
        let (request_id, code) = self.generate(phone).await;
        let (status, body) = self
            .send(
                "POST",
                "/api/v1/kredo-ms/otp-service/verify-otp",
                None,
                Some(json!({ "phoneNumber": phone, "requestId": request_id, "otpCode": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {body}");
        body["accessToken"].as_str().expect("accessToken").to_string()
    }
}

pub fn apply_body(phone: &str) -> Value {
    json!({
        "phoneNumber": phone,
        "firstName": "Turan",
        "lastName": "Aliyev",
        "fin": "7ABC123",
        "dateOfBirth": "1990-05-10",
        "employmentStatus": "EMPLOYED",
        "monthlyIncome": 3000.0,
        "existingMonthlyDebt": 100.0,
        "address": "Bakı, Nəsimi rayonu, mənzil 42",
        "consent": { "termsAccepted": true, "privacyAccepted": true }
    })
}

pub fn loan_uri(id: &str, action: &str) -> String {
    format!("/api/v1/kredo-ms/loan-application/{id}/{action}")
}
