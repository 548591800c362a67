// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Wellness-Tracker: personal health tracking with a points economy
//!
//! This crate provides the backend API for account/session management,
//! daily metrics, mini-game rewards and AI-generated health goals.

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod session;
pub mod time_utils;

use config::Config;
use db::JsonDb;
use services::{GoalService, OtpService};
use session::SessionManager;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: JsonDb,
    pub sessions: SessionManager,
    pub otp: OtpService,
    pub goals: GoalService,
}
