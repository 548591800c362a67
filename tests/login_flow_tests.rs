// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Login and OTP verification flow tests.
//!
//! With no delivery webhook configured the channel stores its fixed
//! fallback code, so the "right" code in these tests is the fallback.

use axum::http::StatusCode;
use serde_json::json;
use wellness_tracker::services::FALLBACK_OTP_CODE;

mod common;

async fn seed_account(state: &wellness_tracker::AppState, email: &str) {
    state.db.sign_up(email, "password123").await.unwrap();
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let (app, state) = common::create_test_app();
    seed_account(&state, "ada@example.com").await;

    let (status, body) = common::post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "ada@example.com", "password": "wrongwrong" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_with_unknown_email() {
    let (app, _) = common::create_test_app();

    let (status, body) = common::post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "nobody@example.com", "password": "password123" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_credentials");
}

#[tokio::test]
async fn test_login_enters_otp_stage_with_minimal_view() {
    let (app, state) = common::create_test_app();
    seed_account(&state, "ada@example.com").await;

    let (status, body) = common::post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "ada@example.com", "password": "password123" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "awaiting_otp");
    assert_eq!(body["user"]["email"], "ada@example.com");
    // Points and names only load after verification.
    assert!(body["user"].get("points").is_none());
    // The code itself never rides along in the response.
    assert!(body.get("code").is_none());
}

#[tokio::test]
async fn test_wrong_code_allows_retry() {
    let (app, state) = common::create_test_app();
    seed_account(&state, "ada@example.com").await;

    let (_, login) = common::post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "ada@example.com", "password": "password123" }),
    )
    .await;
    let session_id = login["session_id"].as_str().unwrap();

    // Wrong code: rejected, challenge and session stay live.
    let (status, body) = common::post_json(
        &app,
        "/auth/verify-otp",
        None,
        json!({ "session_id": session_id, "code": "000000" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_otp");

    // Retry with the issued code succeeds.
    let (status, body) = common::post_json(
        &app,
        "/auth/verify-otp",
        None,
        json!({ "session_id": session_id, "code": FALLBACK_OTP_CODE }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn test_verify_loads_account_and_profile() {
    let (app, state) = common::create_test_app();

    // An account with names, points and a stored profile from a previous
    // life.
    let view = state
        .db
        .sign_up("ada@example.com", "password123")
        .await
        .unwrap();
    state
        .db
        .save_initial_details(
            &view.id,
            "Ada",
            "Lovelace",
            wellness_tracker::models::HealthProfile {
                user_id: view.id.clone(),
                age: 36,
                height_cm: 168.0,
                weight_kg: 61.5,
                gender: wellness_tracker::models::Gender::Female,
                fitness_level: wellness_tracker::models::FitnessLevel::Advanced,
                existing_conditions: String::new(),
                allergies: String::new(),
                medications: String::new(),
                preferred_language: "en".to_string(),
            },
        )
        .await
        .unwrap();
    state.db.update_points(&view.id, 45).await.unwrap();

    let (_, login) = common::post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "ada@example.com", "password": "password123" }),
    )
    .await;
    let session_id = login["session_id"].as_str().unwrap();

    let (status, body) = common::post_json(
        &app,
        "/auth/verify-otp",
        None,
        json!({ "session_id": session_id, "code": FALLBACK_OTP_CODE }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["first_name"], "Ada");
    assert_eq!(body["user"]["points"], 45);
    assert_eq!(body["health_profile"]["fitness_level"], "Advanced");

    // The pending session is consumed; a replay is rejected even with the
    // universal fallback code.
    let (status, _) = common::post_json(
        &app,
        "/auth/verify-otp",
        None,
        json!({ "session_id": session_id, "code": FALLBACK_OTP_CODE }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_abandons_pending_session() {
    let (app, state) = common::create_test_app();
    seed_account(&state, "ada@example.com").await;

    let (_, login) = common::post_json(
        &app,
        "/auth/login",
        None,
        json!({ "email": "ada@example.com", "password": "password123" }),
    )
    .await;
    let session_id = login["session_id"].as_str().unwrap();

    let (status, body) = common::post_json(
        &app,
        "/auth/logout",
        None,
        json!({ "session_id": session_id }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    // The abandoned session no longer verifies.
    let (status, _) = common::post_json(
        &app,
        "/auth/verify-otp",
        None,
        json!({ "session_id": session_id, "code": FALLBACK_OTP_CODE }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
