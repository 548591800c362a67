//! Goal recommendations and the save-changes points reconciliation.
//!
//! A user's recommendations form one batch: regenerating goals replaces the
//! whole batch and forfeits progress on the old one. Saving edits earns
//! points for completion transitions only, diffed against the freshly
//! fetched persisted batch rather than whatever baseline the editor
//! started from, so a stale client copy cannot double-credit.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GoalCategory {
    Diet,
    Exercise,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    General,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Points credited when a goal of this difficulty is completed.
    pub fn points(self) -> u32 {
        match self {
            Difficulty::Easy => 10,
            Difficulty::Medium => 25,
            Difficulty::Hard => 50,
        }
    }
}

/// A goal as produced by the generation collaborator, before it is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalDraft {
    pub goal: String,
    pub category: GoalCategory,
    pub difficulty: Difficulty,
}

/// An actionable health goal with a difficulty tier and a point reward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Recommendation {
    pub id: String,
    pub user_id: String,
    pub goal: String,
    pub category: GoalCategory,
    pub difficulty: Difficulty,
    pub is_completed: bool,
}

/// Points earned by an edited batch relative to the persisted baseline.
///
/// Only records that are incomplete in `persisted` and complete in
/// `edited` earn their difficulty points. A record that was already
/// complete contributes nothing, and unchecking a completed goal neither
/// earns nor refunds. The asymmetry is intentional.
pub fn completion_points(persisted: &[Recommendation], edited: &[Recommendation]) -> u32 {
    edited
        .iter()
        .filter(|rec| rec.is_completed)
        .filter(|rec| {
            persisted
                .iter()
                .any(|p| p.id == rec.id && !p.is_completed)
        })
        .map(|rec| rec.difficulty.points())
        .sum()
}
