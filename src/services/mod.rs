// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod goals;
pub mod otp;

pub use goals::GoalService;
pub use otp::{OtpService, FALLBACK_OTP_CODE};
