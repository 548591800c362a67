// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Authentication routes: signup, login, OTP verification, intake.
//!
//! These drive the pre-authenticated stages of the auth flow. Login issues
//! an OTP challenge and parks the client in an `AwaitingOtp` session;
//! signup parks it in `AwaitingProfile` (no OTP on first signup). Both
//! paths end by exchanging the pending session for a signed JWT.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{AccountView, FitnessLevel, Gender, HealthProfile};
use crate::routes::api::UserResponse;
use crate::session::AuthStage;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/login", post(log_in))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/profile", post(complete_profile))
        .route("/auth/logout", post(log_out))
}

fn validated<T: Validate>(payload: &T) -> Result<()> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

fn issue_jwt(state: &AppState, user_id: &str) -> Result<String> {
    create_jwt(user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))
}

/// A pre-authenticated flow position: the client holds the session id and
/// presents it to the stage's follow-up endpoint.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PendingAuthResponse {
    pub session_id: String,
    pub stage: String,
    pub user: AccountView,
}

/// Terminal flow response: the session token plus the loaded account.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AuthCompleteResponse {
    pub token: String,
    pub user: UserResponse,
    pub health_profile: Option<HealthProfile>,
}

// ─── Signup ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SignUpRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
    pub confirm_password: String,
}

/// Create an account and enter the intake stage.
///
/// New accounts skip the OTP challenge; the asymmetry with login is
/// intentional.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SignUpRequest>,
) -> Result<Json<PendingAuthResponse>> {
    validated(&payload)?;

    if payload.password != payload.confirm_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    let user = state.db.sign_up(&payload.email, &payload.password).await?;

    let session_id = state.sessions.begin(AuthStage::AwaitingProfile {
        user_id: user.id.clone(),
        email: user.email.clone(),
    })?;

    Ok(Json(PendingAuthResponse {
        session_id,
        stage: "awaiting_profile".to_string(),
        user,
    }))
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Check credentials and enter the OTP stage.
///
/// Invalid credentials surface as an error with no OTP issued; the client
/// stays logged out. The issued code travels out-of-band and is never part
/// of the response.
async fn log_in(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<PendingAuthResponse>> {
    let user = state.db.sign_in(&payload.email, &payload.password).await?;

    state.otp.issue(&payload.email).await;

    let session_id = state.sessions.begin(AuthStage::AwaitingOtp {
        email: payload.email,
    })?;

    Ok(Json(PendingAuthResponse {
        session_id,
        stage: "awaiting_otp".to_string(),
        user,
    }))
}

// ─── OTP Verification ────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub session_id: String,
    pub code: String,
}

/// Exchange a valid one-time code for an authenticated session.
///
/// On a bad code both the pending session and the challenge stay live, so
/// the client may retry.
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<AuthCompleteResponse>> {
    let Some(AuthStage::AwaitingOtp { email }) = state.sessions.get(&payload.session_id) else {
        return Err(AppError::InvalidToken);
    };

    state.otp.verify(&email, &payload.code)?;

    let account = state
        .db
        .get_account_by_email(&email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let health_profile = state.db.get_health_profile(&account.id).await?;

    state.sessions.complete(&payload.session_id);
    let token = issue_jwt(&state, &account.id)?;

    tracing::info!(user_id = %account.id, "Login completed");

    Ok(Json(AuthCompleteResponse {
        token,
        user: UserResponse::from(&account),
        health_profile,
    }))
}

// ─── Intake ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CompleteProfileRequest {
    pub session_id: String,
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(range(min = 1, max = 130))]
    pub age: u32,
    #[validate(range(min = 30.0, max = 260.0))]
    pub height_cm: f64,
    #[validate(range(min = 2.0, max = 500.0))]
    pub weight_kg: f64,
    pub gender: Gender,
    pub fitness_level: FitnessLevel,
    #[serde(default)]
    pub existing_conditions: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub medications: String,
    #[serde(default)]
    pub preferred_language: String,
}

/// Submit the intake form and finish the signup flow.
async fn complete_profile(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CompleteProfileRequest>,
) -> Result<Json<AuthCompleteResponse>> {
    let Some(AuthStage::AwaitingProfile { user_id, .. }) = state.sessions.get(&payload.session_id)
    else {
        return Err(AppError::InvalidToken);
    };

    validated(&payload)?;

    let profile = HealthProfile {
        user_id: user_id.clone(),
        age: payload.age,
        height_cm: payload.height_cm,
        weight_kg: payload.weight_kg,
        gender: payload.gender,
        fitness_level: payload.fitness_level,
        existing_conditions: payload.existing_conditions,
        allergies: payload.allergies,
        medications: payload.medications,
        preferred_language: payload.preferred_language,
    };

    let account = state
        .db
        .save_initial_details(&user_id, &payload.first_name, &payload.last_name, profile)
        .await?;
    let health_profile = state.db.get_health_profile(&user_id).await?;

    state.sessions.complete(&payload.session_id);
    let token = issue_jwt(&state, &account.id)?;

    tracing::info!(user_id = %account.id, "Signup completed");

    Ok(Json(AuthCompleteResponse {
        token,
        user: UserResponse::from(&account),
        health_profile,
    }))
}

// ─── Logout ──────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct LogoutRequest {
    /// Pending session to abandon, for sign-out mid-flow
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Sign out. Authenticated sessions end when the client discards its
/// token; a pending session id, when provided, is dropped here.
async fn log_out(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LogoutRequest>,
) -> Json<LogoutResponse> {
    if let Some(session_id) = payload.session_id {
        state.sessions.abandon(&session_id);
    }

    Json(LogoutResponse { success: true })
}
