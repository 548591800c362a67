// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    completion_points, Account, DailyMetricEntry, GameSession, GameType, HealthProfile,
    Recommendation, GAME_COMPLETION_POINTS, METRICS_SUBMISSION_POINTS,
};
use crate::time_utils::{format_utc_rfc3339, local_day};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/settings", put(update_settings))
        .route("/api/games", post(complete_game))
        .route("/api/metrics/today", get(metrics_today))
        .route("/api/metrics", post(submit_metrics))
        .route(
            "/api/recommendations",
            get(get_recommendations).put(save_recommendations),
        )
        .route("/api/recommendations/generate", post(generate_recommendations))
}

/// Map request-payload validation failures onto the error taxonomy.
fn validated<T: Validate>(payload: &T) -> Result<()> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))
}

// ─── User Profile ────────────────────────────────────────────

/// Current user response.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub points: u32,
}

impl From<&Account> for UserResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            email: account.email.clone(),
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            points: account.points,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user: UserResponse,
    pub health_profile: Option<HealthProfile>,
}

/// Get current user profile and health data.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let account = state
        .db
        .get_account(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let health_profile = state.db.get_health_profile(&user.user_id).await?;

    Ok(Json(MeResponse {
        user: UserResponse::from(&account),
        health_profile,
    }))
}

// ─── Settings ────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct SettingsRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    /// New password; leave absent to keep the current one
    #[validate(length(min = 8, message = "New password must be at least 8 characters long"))]
    pub password: Option<String>,
    pub confirm_password: Option<String>,
}

/// Update account details (names, email, password).
async fn update_settings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SettingsRequest>,
) -> Result<Json<UserResponse>> {
    validated(&payload)?;

    if payload.password.is_some() && payload.password != payload.confirm_password {
        return Err(AppError::Validation(
            "New passwords do not match".to_string(),
        ));
    }

    let patch = crate::models::AccountPatch {
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        password: payload.password,
    };

    let account = state.db.update_details(&user.user_id, &patch).await?;
    Ok(Json(UserResponse::from(&account)))
}

// ─── Points Protocol ─────────────────────────────────────────

/// Result of an earning event: how much was credited and the new balance.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PointsAwardResponse {
    pub points_earned: u32,
    pub points_total: u32,
}

/// Read-current-total, compute, overwrite. Single writer per account;
/// concurrent earners on two devices are last-writer-wins.
async fn credit_points(
    state: &AppState,
    user_id: &str,
    earned: u32,
) -> Result<PointsAwardResponse> {
    let account = state
        .db
        .get_account(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let new_total = account.points + earned;
    state.db.update_points(user_id, new_total).await?;

    Ok(PointsAwardResponse {
        points_earned: earned,
        points_total: new_total,
    })
}

// ─── Games ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct GameRequest {
    pub game_type: GameType,
    pub score: u32,
}

/// Record a completed game session and award the flat completion bonus.
async fn complete_game(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<GameRequest>,
) -> Result<Json<PointsAwardResponse>> {
    state
        .db
        .append_game_session(GameSession {
            user_id: user.user_id.clone(),
            game_type: payload.game_type,
            score: payload.score,
            timestamp: format_utc_rfc3339(chrono::Utc::now()),
        })
        .await?;

    let award = credit_points(&state, &user.user_id, GAME_COMPLETION_POINTS).await?;

    tracing::info!(
        user_id = %user.user_id,
        game_type = ?payload.game_type,
        score = payload.score,
        "Game session recorded"
    );
    Ok(Json(award))
}

// ─── Daily Metrics ───────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MetricsGateResponse {
    pub submitted: bool,
    pub date: String,
}

/// Whether today's metrics have already been logged.
async fn metrics_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MetricsGateResponse>> {
    let today = local_day();
    let submitted = state.db.has_submitted_on(&user.user_id, &today).await?;

    Ok(Json(MetricsGateResponse {
        submitted,
        date: today,
    }))
}

#[derive(Deserialize, Validate)]
pub struct MetricsRequest {
    #[validate(range(min = 20, max = 250))]
    pub heart_rate: Option<u32>,
    pub steps: Option<u32>,
    #[validate(range(min = 0.0, max = 24.0))]
    pub sleep_hours: Option<f64>,
    pub breathing_rate: Option<u32>,
    pub distance_travelled_km: Option<f64>,
    pub calories_burnt_kcal: Option<u32>,
}

/// Log today's metrics and award the submission bonus.
///
/// The one-entry-per-day gate lives here, not in the store: check, then
/// append.
async fn submit_metrics(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<MetricsRequest>,
) -> Result<Json<PointsAwardResponse>> {
    validated(&payload)?;

    let today = local_day();
    if state.db.has_submitted_on(&user.user_id, &today).await? {
        return Err(AppError::Validation(
            "Metrics already submitted today".to_string(),
        ));
    }

    state
        .db
        .append_metrics(DailyMetricEntry {
            user_id: user.user_id.clone(),
            date: today,
            heart_rate: payload.heart_rate,
            steps: payload.steps,
            sleep_hours: payload.sleep_hours,
            breathing_rate: payload.breathing_rate,
            distance_travelled_km: payload.distance_travelled_km,
            calories_burnt_kcal: payload.calories_burnt_kcal,
        })
        .await?;

    let award = credit_points(&state, &user.user_id, METRICS_SUBMISSION_POINTS).await?;
    Ok(Json(award))
}

// ─── Recommendations ─────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<Recommendation>,
}

/// Get the current goal batch.
async fn get_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RecommendationsResponse>> {
    let recommendations = state.db.get_recommendations(&user.user_id).await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// Generate a fresh goal batch, replacing the current one.
///
/// Destructive: progress on the old batch is forfeited.
async fn generate_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<RecommendationsResponse>> {
    let profile = state
        .db
        .get_health_profile(&user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Validation("Health data is not available to generate goals".to_string())
        })?;

    let drafts = state.goals.generate(&profile).await;
    let recommendations = state
        .db
        .replace_recommendations(&user.user_id, drafts)
        .await?;

    Ok(Json(RecommendationsResponse { recommendations }))
}

#[derive(Deserialize)]
pub struct SaveRecommendationsRequest {
    pub recommendations: Vec<Recommendation>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SaveRecommendationsResponse {
    pub points_earned: u32,
    pub points_total: u32,
    pub recommendations: Vec<Recommendation>,
}

/// Save completion edits and credit points for new completions.
///
/// The diff runs against the batch as currently persisted, re-read here,
/// not against whatever baseline the client started from. A stale client
/// copy therefore cannot re-earn a completion already recorded elsewhere.
async fn save_recommendations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<SaveRecommendationsRequest>,
) -> Result<Json<SaveRecommendationsResponse>> {
    let persisted = state.db.get_recommendations(&user.user_id).await?;

    // Only the owner's records are writable; edits whose id is not in the
    // persisted batch are dropped.
    let edited: Vec<Recommendation> = payload
        .recommendations
        .into_iter()
        .filter(|rec| persisted.iter().any(|p| p.id == rec.id))
        .collect();

    let points_earned = completion_points(&persisted, &edited);
    state.db.update_recommendation_statuses(&edited).await?;

    let points_total = if points_earned > 0 {
        credit_points(&state, &user.user_id, points_earned)
            .await?
            .points_total
    } else {
        state
            .db
            .get_account(&user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?
            .points
    };

    let recommendations = state.db.get_recommendations(&user.user_id).await?;

    tracing::info!(
        user_id = %user.user_id,
        points_earned,
        "Recommendation edits saved"
    );

    Ok(Json(SaveRecommendationsResponse {
        points_earned,
        points_total,
        recommendations,
    }))
}
