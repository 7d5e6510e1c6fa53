use serde::{Deserialize, Serialize};

/// A player's review of a game (spec §3). At most one per (game-id, player);
/// resubmission mutates the existing row in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: u64,
    pub game_id: String,
    pub user: String,
    pub rating: i64,
    pub comment: String,
    pub timestamp: i64,
}
