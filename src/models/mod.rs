// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod game;
pub mod health;
pub mod metrics;
pub mod recommendation;

pub use account::{Account, AccountPatch, AccountView};
pub use game::{GameSession, GameType, GAME_COMPLETION_POINTS};
pub use health::{FitnessLevel, Gender, HealthProfile};
pub use metrics::{DailyMetricEntry, METRICS_SUBMISSION_POINTS};
pub use recommendation::{completion_points, Difficulty, GoalCategory, GoalDraft, Recommendation};
