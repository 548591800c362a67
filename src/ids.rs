// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Opaque identifier generation.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Generate an opaque random identifier (32 hex chars).
///
/// Used for account ids, recommendation ids and pending-session ids.
/// Identifiers are stable handles assigned at creation and never reused.
pub fn new_id() -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("system RNG unavailable")))?;
    Ok(hex::encode(bytes))
}
