// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;
use wellness_tracker::config::Config;
use wellness_tracker::db::JsonDb;
use wellness_tracker::middleware::auth::create_jwt;
use wellness_tracker::routes::create_router;
use wellness_tracker::services::{GoalService, OtpService};
use wellness_tracker::session::SessionManager;
use wellness_tracker::AppState;

/// Create a test app with an in-memory store and no external
/// collaborators configured (OTP and goals use their local fallbacks).
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let db = JsonDb::new_in_memory();

    let state = Arc::new(AppState {
        config,
        db,
        sessions: SessionManager::new(),
        otp: OtpService::new(None),
        goals: GoalService::new(None),
    });

    (create_router(state.clone()), state)
}

/// Seed an account directly in the store and mint a session token for it.
/// Returns `(token, user_id)`.
#[allow(dead_code)]
pub async fn seed_authenticated_user(state: &AppState, email: &str) -> (String, String) {
    let view = state
        .db
        .sign_up(email, "password123")
        .await
        .expect("seed signup should succeed");
    let token = create_jwt(&view.id, &state.config.jwt_signing_key).expect("JWT should mint");
    (token, view.id)
}

/// POST a JSON body and return `(status, parsed body)`.
#[allow(dead_code)]
pub async fn post_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(app, "POST", uri, token, Some(body)).await
}

/// PUT a JSON body and return `(status, parsed body)`.
#[allow(dead_code)]
pub async fn put_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    request_json(app, "PUT", uri, token, Some(body)).await
}

/// GET and return `(status, parsed body)`.
#[allow(dead_code)]
pub async fn get_json(
    app: &axum::Router,
    uri: &str,
    token: Option<&str>,
) -> (StatusCode, serde_json::Value) {
    request_json(app, "GET", uri, token, None).await
}

#[allow(dead_code)]
async fn request_json(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };

    (status, json)
}
