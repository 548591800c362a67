//! Daily metrics journal entries.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Award for submitting the daily metrics form.
pub const METRICS_SUBMISSION_POINTS: u32 = 25;

/// One day's self-reported metrics for one user.
///
/// At most one entry per `(user_id, date)`. The store appends blindly; the
/// submitting flow checks the gate first (`has_submitted_on`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyMetricEntry {
    pub user_id: String,
    /// Local calendar day, `YYYY-MM-DD`
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breathing_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_travelled_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_burnt_kcal: Option<u32>,
}
