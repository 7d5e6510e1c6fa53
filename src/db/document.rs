//! The in-memory document the DB service persists as one JSON file
//! (spec §4.2).

use crate::model::{DeveloperAccount, Game, PlayerAccount, Review};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "Users_Dev", default)]
    pub users_dev: HashMap<String, DeveloperAccount>,
    #[serde(rename = "Users_Player", default)]
    pub users_player: HashMap<String, PlayerAccount>,
    #[serde(rename = "Games", default)]
    pub games: HashMap<String, Game>,
    #[serde(rename = "Reviews", default)]
    pub reviews: HashMap<u64, Review>,
    /// Monotonic id counters, keyed by kind: "room", "review", "timestamp".
    #[serde(rename = "_counters", default)]
    pub counters: HashMap<String, u64>,
}

impl Document {
    /// Allocate the next id for `kind`, starting at 1.
    pub fn next_id(&mut self, kind: &str) -> u64 {
        let counter = self.counters.entry(kind.to_string()).or_insert(0);
        *counter += 1;
        *counter
    }

    /// Find a review by (game_id, user), if one exists.
    pub fn find_review(&self, game_id: &str, user: &str) -> Option<&Review> {
        self.reviews
            .values()
            .find(|r| r.game_id == game_id && r.user == user)
    }

    pub fn find_review_mut(&mut self, game_id: &str, user: &str) -> Option<&mut Review> {
        self.reviews
            .values_mut()
            .find(|r| r.game_id == game_id && r.user == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_id_starts_at_one_and_increments() {
        let mut doc = Document::default();
        assert_eq!(doc.next_id("room"), 1);
        assert_eq!(doc.next_id("room"), 2);
        assert_eq!(doc.next_id("review"), 1);
    }

    #[test]
    fn serializes_with_documented_collection_names() {
        let doc = Document::default();
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json.get("Users_Dev").is_some());
        assert!(json.get("Users_Player").is_some());
        assert!(json.get("Games").is_some());
        assert!(json.get("Reviews").is_some());
        assert!(json.get("_counters").is_some());
    }
}
