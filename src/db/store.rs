// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JSON document store with typed operations.
//!
//! Provides high-level operations for:
//! - Accounts (identity, credentials, points)
//! - Health profiles (intake data)
//! - Game sessions (append-only)
//! - Recommendations (per-user batches)
//! - Daily metrics (append-only journal)
//!
//! The five collections are serialized to disk as one JSON document, in
//! full, after every mutation; there are no partial or delta writes.
//! Access is serialized through an async `RwLock`. The store assumes a
//! single writer per account: point totals and recommendation batches are
//! last-writer-wins with no version token. Any future multi-device
//! requirement needs a versioned or transactional update here.

use crate::error::AppError;
use crate::ids::new_id;
use crate::models::{
    Account, AccountPatch, AccountView, DailyMetricEntry, GameSession, GoalDraft, HealthProfile,
    Recommendation,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;

/// The durable collection set, written wholesale on every mutation.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    /// Accounts keyed by email (case-sensitive)
    #[serde(default)]
    accounts: HashMap<String, Account>,
    /// Health profiles keyed by user id
    #[serde(default)]
    health_profiles: HashMap<String, HealthProfile>,
    #[serde(default)]
    game_sessions: Vec<GameSession>,
    #[serde(default)]
    recommendations: Vec<Recommendation>,
    #[serde(default)]
    daily_metrics: Vec<DailyMetricEntry>,
}

/// File-backed JSON database client.
///
/// The only collaborator that touches durable storage; handlers hold
/// transient copies of records and re-fetch after mutations.
#[derive(Clone)]
pub struct JsonDb {
    inner: Arc<RwLock<Collections>>,
    path: Option<PathBuf>,
}

/// Verbatim credential comparison (constant-time).
fn secret_matches(stored: &str, submitted: &str) -> bool {
    stored.as_bytes().ct_eq(submitted.as_bytes()).into()
}

impl JsonDb {
    /// Open (or create) the database document at `path`.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(json) => serde_json::from_str(&json)
                .map_err(|e| AppError::Database(format!("Corrupt database document: {}", e)))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Collections::default(),
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to read database document: {}",
                    e
                )))
            }
        };

        tracing::info!(path = %path.display(), accounts = data.accounts.len(), "Database opened");

        Ok(Self {
            inner: Arc::new(RwLock::new(data)),
            path: Some(path),
        })
    }

    /// Create an in-memory store for testing (nothing touches disk).
    pub fn new_in_memory() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Collections::default())),
            path: None,
        }
    }

    /// Write the full collection set back to disk.
    async fn persist(&self, data: &Collections) -> Result<(), AppError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Database(format!("Failed to create data dir: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(data)
            .map_err(|e| AppError::Database(format!("Failed to serialize database: {}", e)))?;

        tokio::fs::write(path, json)
            .await
            .map_err(|e| AppError::Database(format!("Failed to write database document: {}", e)))
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Create an account for a new email.
    ///
    /// Accounts start with zero points and blank names; names are filled in
    /// at intake. Returns the minimal `{id, email}` view.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AccountView, AppError> {
        let mut data = self.inner.write().await;

        if data.accounts.contains_key(email) {
            return Err(AppError::DuplicateAccount);
        }

        let account = Account {
            id: new_id()?,
            email: email.to_string(),
            password: password.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            points: 0,
        };
        let view = AccountView::from(&account);

        data.accounts.insert(email.to_string(), account);
        self.persist(&data).await?;

        tracing::info!(user_id = %view.id, "Account created");
        Ok(view)
    }

    /// Check credentials for an existing account.
    ///
    /// A missing account and a wrong password are indistinguishable to the
    /// caller. Returns the `{id, email}` view only; the full account loads
    /// after the OTP step.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AccountView, AppError> {
        let data = self.inner.read().await;

        let account = data
            .accounts
            .get(email)
            .ok_or(AppError::InvalidCredentials)?;

        if !secret_matches(&account.password, password) {
            return Err(AppError::InvalidCredentials);
        }

        Ok(AccountView::from(account))
    }

    /// Get an account by its opaque id.
    pub async fn get_account(&self, user_id: &str) -> Result<Option<Account>, AppError> {
        let data = self.inner.read().await;
        Ok(data
            .accounts
            .values()
            .find(|a| a.id == user_id)
            .cloned())
    }

    /// Get an account by its email key.
    pub async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let data = self.inner.read().await;
        Ok(data.accounts.get(email).cloned())
    }

    /// Complete intake: set names, reset points to zero and create the
    /// health profile in one write.
    pub async fn save_initial_details(
        &self,
        user_id: &str,
        first_name: &str,
        last_name: &str,
        profile: HealthProfile,
    ) -> Result<Account, AppError> {
        let mut data = self.inner.write().await;

        let account = data
            .accounts
            .values_mut()
            .find(|a| a.id == user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        account.first_name = first_name.to_string();
        account.last_name = last_name.to_string();
        account.points = 0;
        let updated = account.clone();

        data.health_profiles.insert(user_id.to_string(), profile);
        self.persist(&data).await?;

        tracing::info!(user_id, "Intake details saved");
        Ok(updated)
    }

    /// Apply a partial update to an account, field by field.
    ///
    /// An email change migrates the storage key; the new email must not
    /// belong to another account.
    pub async fn update_details(
        &self,
        user_id: &str,
        patch: &AccountPatch,
    ) -> Result<Account, AppError> {
        let mut data = self.inner.write().await;

        let old_email = data
            .accounts
            .values()
            .find(|a| a.id == user_id)
            .map(|a| a.email.clone())
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;

        if let Some(new_email) = &patch.email {
            if *new_email != old_email && data.accounts.contains_key(new_email) {
                return Err(AppError::DuplicateAccount);
            }
        }

        let Some(mut account) = data.accounts.remove(&old_email) else {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        };

        if let Some(first_name) = &patch.first_name {
            account.first_name = first_name.clone();
        }
        if let Some(last_name) = &patch.last_name {
            account.last_name = last_name.clone();
        }
        if let Some(email) = &patch.email {
            account.email = email.clone();
        }
        if let Some(password) = &patch.password {
            account.password = password.clone();
        }

        let updated = account.clone();
        data.accounts.insert(account.email.clone(), account);
        self.persist(&data).await?;

        tracing::info!(user_id, "Account details updated");
        Ok(updated)
    }

    /// Overwrite an account's point balance with a new total.
    ///
    /// Not a delta: callers read the current total, compute the new one and
    /// write it back. Idempotent by construction. A missing user is a
    /// silent no-op.
    pub async fn update_points(&self, user_id: &str, new_total: u32) -> Result<(), AppError> {
        let mut data = self.inner.write().await;

        let Some(account) = data.accounts.values_mut().find(|a| a.id == user_id) else {
            return Ok(());
        };
        account.points = new_total;

        self.persist(&data).await?;
        tracing::debug!(user_id, points = new_total, "Points updated");
        Ok(())
    }

    // ─── Health Profile Operations ───────────────────────────────

    /// Get the health profile for a user, if intake has completed.
    pub async fn get_health_profile(
        &self,
        user_id: &str,
    ) -> Result<Option<HealthProfile>, AppError> {
        let data = self.inner.read().await;
        Ok(data.health_profiles.get(user_id).cloned())
    }

    /// Replace a user's health profile wholesale.
    pub async fn set_health_profile(&self, profile: HealthProfile) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.health_profiles
            .insert(profile.user_id.clone(), profile);
        self.persist(&data).await
    }

    // ─── Game Session Operations ─────────────────────────────────

    /// Record a completed game session. Sessions are append-only.
    pub async fn append_game_session(&self, session: GameSession) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.game_sessions.push(session);
        self.persist(&data).await
    }

    // ─── Recommendation Operations ───────────────────────────────

    /// Get the current recommendation batch for a user.
    pub async fn get_recommendations(
        &self,
        user_id: &str,
    ) -> Result<Vec<Recommendation>, AppError> {
        let data = self.inner.read().await;
        Ok(data
            .recommendations
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Replace a user's recommendation batch with freshly-created records.
    ///
    /// Deletes all prior recommendations for the user first. Destructive
    /// and irreversible: regenerating goals forfeits progress on the old
    /// batch.
    pub async fn replace_recommendations(
        &self,
        user_id: &str,
        drafts: Vec<GoalDraft>,
    ) -> Result<Vec<Recommendation>, AppError> {
        let mut data = self.inner.write().await;

        data.recommendations.retain(|r| r.user_id != user_id);

        let mut batch = Vec::with_capacity(drafts.len());
        for draft in drafts {
            batch.push(Recommendation {
                id: new_id()?,
                user_id: user_id.to_string(),
                goal: draft.goal,
                category: draft.category,
                difficulty: draft.difficulty,
                is_completed: false,
            });
        }

        data.recommendations.extend(batch.iter().cloned());
        self.persist(&data).await?;

        tracing::info!(user_id, count = batch.len(), "Recommendation batch replaced");
        Ok(batch)
    }

    /// Write edited recommendation records back by id.
    ///
    /// Records whose id is not stored are ignored; completion accounting
    /// happens in the calling flow before this write.
    pub async fn update_recommendation_statuses(
        &self,
        edited: &[Recommendation],
    ) -> Result<(), AppError> {
        let mut data = self.inner.write().await;

        for rec in edited {
            if let Some(stored) = data.recommendations.iter_mut().find(|r| r.id == rec.id) {
                *stored = rec.clone();
            }
        }

        self.persist(&data).await
    }

    // ─── Daily Metrics Operations ────────────────────────────────

    /// Whether the user already has an entry for the given calendar day.
    ///
    /// Exact string equality on `YYYY-MM-DD`; the submitting flow is
    /// responsible for calling this before `append_metrics`.
    pub async fn has_submitted_on(&self, user_id: &str, day: &str) -> Result<bool, AppError> {
        let data = self.inner.read().await;
        Ok(data
            .daily_metrics
            .iter()
            .any(|m| m.user_id == user_id && m.date == day))
    }

    /// Append one day's metrics. The store does not enforce per-day
    /// uniqueness.
    pub async fn append_metrics(&self, entry: DailyMetricEntry) -> Result<(), AppError> {
        let mut data = self.inner.write().await;
        data.daily_metrics.push(entry);
        self.persist(&data).await
    }
}
