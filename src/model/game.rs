use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// An immutable upload record appended on every `UPLOAD_INIT` (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    pub file_path: String,
    pub timestamp: u64,
}

/// A catalogue entry (spec §3).
///
/// `game_id` is the canonical key: the display name lowercased with spaces
/// turned to underscores. `average_rating` is derived from
/// `rating_sum`/`rating_count` and is not itself persisted; it is
/// recomputed on every serialization so clients always see a fresh value
/// on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct Game {
    pub game_id: String,
    pub author: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub min_players: u32,
    pub max_players: u32,
    pub latest_version: String,
    pub versions: Vec<VersionEntry>,
    #[serde(default)]
    pub rating_sum: i64,
    #[serde(default)]
    pub rating_count: i64,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
}

fn default_is_active() -> bool {
    true
}

impl Serialize for Game {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Game", 13)?;
        state.serialize_field("game_id", &self.game_id)?;
        state.serialize_field("author", &self.author)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("type", &self.type_label)?;
        state.serialize_field("min_players", &self.min_players)?;
        state.serialize_field("max_players", &self.max_players)?;
        state.serialize_field("latest_version", &self.latest_version)?;
        state.serialize_field("versions", &self.versions)?;
        state.serialize_field("rating_sum", &self.rating_sum)?;
        state.serialize_field("rating_count", &self.rating_count)?;
        state.serialize_field("average_rating", &self.average_rating())?;
        state.serialize_field("is_active", &self.is_active)?;
        state.end()
    }
}

impl Game {
    /// `rating_sum / rating_count`, or `0.0` when no reviews exist yet.
    pub fn average_rating(&self) -> f64 {
        if self.rating_count > 0 {
            self.rating_sum as f64 / self.rating_count as f64
        } else {
            0.0
        }
    }

    /// Canonicalize a display name into a `game_id`: lowercase, spaces to
    /// underscores.
    pub fn canonical_id(name: &str) -> String {
        name.trim().to_lowercase().replace(' ', "_")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn average_rating_is_zero_with_no_reviews() {
        let game = Game {
            game_id: "demo".into(),
            author: "alice".into(),
            name: "Demo".into(),
            description: "d".into(),
            type_label: "CLI".into(),
            min_players: 1,
            max_players: 2,
            latest_version: "1.0".into(),
            versions: vec![],
            rating_sum: 0,
            rating_count: 0,
            is_active: true,
        };
        assert_eq!(game.average_rating(), 0.0);
    }

    #[test]
    fn canonical_id_lowercases_and_replaces_spaces() {
        assert_eq!(Game::canonical_id("My Cool Game"), "my_cool_game");
    }

    proptest! {
        #[test]
        fn canonical_id_never_contains_uppercase_or_spaces(raw in proptest::collection::vec(any::<char>(), 0..=32)) {
            let name: String = raw.into_iter().collect();
            let id = Game::canonical_id(&name);
            prop_assert!(!id.chars().any(|c| c.is_uppercase() || c == ' '));
        }

        #[test]
        fn canonical_id_is_idempotent(raw in proptest::collection::vec(any::<char>(), 0..=32)) {
            let name: String = raw.into_iter().collect();
            let once = Game::canonical_id(&name);
            let twice = Game::canonical_id(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
