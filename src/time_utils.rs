// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, Local, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Today's calendar day as `YYYY-MM-DD` in the server's local timezone.
///
/// The daily-metrics gate compares these strings for exact equality; there
/// is deliberately no timezone normalization beyond "whatever local
/// resolves to".
pub fn local_day() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
