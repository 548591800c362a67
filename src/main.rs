// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Wellness-Tracker API Server
//!
//! Tracks daily health metrics, mini-game rewards and AI-generated goals
//! behind an OTP-verified login flow.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wellness_tracker::{
    config::Config,
    db::JsonDb,
    services::{GoalService, OtpService},
    session::SessionManager,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Wellness-Tracker API");

    // Open the JSON database document
    let db = JsonDb::open(&config.db_path)
        .await
        .expect("Failed to open database document");

    // OTP channel; degrades to the local fallback code without a webhook
    let otp = OtpService::new(config.otp_webhook_url.clone());
    if config.otp_webhook_url.is_none() {
        tracing::warn!("OTP_WEBHOOK_URL not set, OTP channel will use the local fallback code");
    }

    // Goal generation; degrades to the built-in list without an API key
    let goals = GoalService::new(config.gemini_api_key.clone());
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set, goal generation will use the built-in list");
    }

    // Pending auth-session tracking
    let sessions = SessionManager::new();

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        sessions,
        otp,
        goals,
    });

    // Build router
    let app = wellness_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wellness_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
