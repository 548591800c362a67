//! Mini-game sessions from the engagement module.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Flat award for completing any game session, regardless of score.
pub const GAME_COMPLETION_POINTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum GameType {
    Clicker,
    Memory,
}

/// One completed game, append-only and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSession {
    pub user_id: String,
    pub game_type: GameType,
    /// Raw score as reported by the game; recorded verbatim
    pub score: u32,
    /// Completion time (RFC3339)
    pub timestamp: String,
}
