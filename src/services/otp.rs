// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-time passcode issuance and verification.
//!
//! Codes come from an external delivery webhook that emails the user and
//! returns the code it sent. Delivery failure never blocks the login flow:
//! the channel degrades to a fixed local code instead. Challenges live
//! in-process only; at most one per email, replaced on re-issue, consumed
//! on first successful verification.

use anyhow::Context;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Code issued when delivery fails, and accepted unconditionally as a
/// universal master code. Existing preview deployments depend on the
/// master-code behavior, so removing it is a compatibility break rather
/// than a cleanup.
pub const FALLBACK_OTP_CODE: &str = "123456";

/// A live challenge for one email.
#[derive(Debug, Clone)]
struct OtpChallenge {
    code: String,
    issued_at: DateTime<Utc>,
}

/// Issues, delivers and verifies one-time passcodes.
pub struct OtpService {
    http: reqwest::Client,
    webhook_url: Option<String>,
    challenges: DashMap<String, OtpChallenge>,
}

fn code_matches(expected: &str, submitted: &str) -> bool {
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}

impl OtpService {
    /// Create the service. With no webhook URL configured every issuance
    /// uses the local fallback code.
    pub fn new(webhook_url: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            webhook_url,
            challenges: DashMap::new(),
        }
    }

    /// Issue a code for `email`, replacing any prior challenge.
    ///
    /// Tries the delivery webhook first; on any failure stores the fixed
    /// fallback code so the flow can proceed.
    pub async fn issue(&self, email: &str) -> String {
        let code = match self.deliver(email).await {
            Ok(code) => code,
            Err(err) => {
                tracing::warn!(error = %err, "OTP delivery failed, using local fallback code");
                FALLBACK_OTP_CODE.to_string()
            }
        };

        self.challenges.insert(
            email.to_string(),
            OtpChallenge {
                code: code.clone(),
                issued_at: Utc::now(),
            },
        );

        tracing::info!(email, "OTP challenge issued");
        code
    }

    /// Fetch a code from the delivery webhook: GET `{url}{email}`, code
    /// returned as plain text.
    async fn deliver(&self, email: &str) -> anyhow::Result<String> {
        let base = self
            .webhook_url
            .as_deref()
            .context("no OTP delivery webhook configured")?;

        let url = format!("{}{}", base, urlencoding::encode(email));
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            anyhow::bail!("delivery webhook returned {}", response.status());
        }

        let code = response.text().await?.trim().to_string();
        if code.is_empty() {
            anyhow::bail!("delivery webhook returned an empty code");
        }
        Ok(code)
    }

    /// Verify a submitted code for `email`.
    ///
    /// Accepts the most recently issued code or the universal fallback
    /// code, the latter regardless of challenge state. Success consumes
    /// the challenge (single-use); failure leaves it live for retry.
    pub fn verify(&self, email: &str, submitted: &str) -> Result<(), AppError> {
        let matches_challenge = self
            .challenges
            .get(email)
            .map(|challenge| code_matches(&challenge.code, submitted))
            .unwrap_or(false);

        if !matches_challenge && !code_matches(FALLBACK_OTP_CODE, submitted) {
            if let Some(challenge) = self.challenges.get(email) {
                tracing::debug!(
                    email,
                    issued_at = %challenge.issued_at,
                    "OTP verification failed, challenge stays live"
                );
            }
            return Err(AppError::InvalidOtp);
        }

        self.challenges.remove(email);
        Ok(())
    }
}
