// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pending auth-flow session tracking.
//!
//! The login flow moves through four stages: logged out, awaiting the
//! one-time code, awaiting the intake form (new accounts only) and
//! authenticated. Signup skips the OTP challenge and goes straight to the
//! intake stage; login skips intake. The asymmetry is deliberate and
//! matches the account lifecycles (an account can only reach login after
//! its intake has run once).
//!
//! The two pre-authenticated stages are tracked here against opaque
//! session ids. The authenticated stage is not: it is carried by a signed
//! JWT (`middleware::auth`), and signing out is the client discarding the
//! token. One `SessionManager` lives in `AppState`; it is injected, never
//! a process-wide global.

use crate::error::AppError;
use crate::ids::new_id;
use dashmap::DashMap;

/// A pending (pre-authenticated) stage of the auth flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStage {
    /// Credentials accepted; waiting on the emailed one-time code.
    AwaitingOtp { email: String },
    /// Account created; waiting on the health-profile intake form.
    AwaitingProfile { user_id: String, email: String },
}

/// Tracks pending auth sessions by opaque id.
#[derive(Default)]
pub struct SessionManager {
    pending: DashMap<String, AuthStage>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a pending stage, returning the opaque session id the client
    /// must present to advance.
    pub fn begin(&self, stage: AuthStage) -> Result<String, AppError> {
        let session_id = new_id()?;
        self.pending.insert(session_id.clone(), stage);
        Ok(session_id)
    }

    /// Look up a live pending session without consuming it.
    ///
    /// A failed OTP or intake attempt leaves the session (and any live
    /// challenge) in place so the client can retry.
    pub fn get(&self, session_id: &str) -> Option<AuthStage> {
        self.pending.get(session_id).map(|s| s.value().clone())
    }

    /// Complete a pending session, removing and returning its stage.
    pub fn complete(&self, session_id: &str) -> Option<AuthStage> {
        self.pending.remove(session_id).map(|(_, stage)| stage)
    }

    /// Drop a pending session without completing it (sign-out mid-flow).
    pub fn abandon(&self, session_id: &str) {
        self.pending.remove(session_id);
    }
}
