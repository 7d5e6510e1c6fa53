use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;

/// A player's transient status (spec §3). Persisted as a plain string on
/// the wire and in the DB document (`"Idle"`, `"In Room <id>"`,
/// `"Playing"`), matching the original's untyped representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerStatus {
    Idle,
    InRoom(String),
    Playing,
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::InRoom(room_id) => write!(f, "In Room {room_id}"),
            Self::Playing => write!(f, "Playing"),
        }
    }
}

impl Serialize for PlayerStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for PlayerStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Idle" => Self::Idle,
            "Playing" => Self::Playing,
            other => match other.strip_prefix("In Room ") {
                Some(room_id) => Self::InRoom(room_id.to_string()),
                None => {
                    return Err(serde::de::Error::custom(format!(
                        "invalid player status '{other}'"
                    )))
                }
            },
        })
    }
}

/// A registered player account (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerAccount {
    pub username: String,
    pub password: String,
    pub created_at: u64,
    #[serde(default)]
    pub status: PlayerStatus,
    /// Game ids the player has ever entered a room for; gates review submission.
    #[serde(default)]
    pub play_history: HashSet<String>,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_in_room_status() {
        let status = PlayerStatus::InRoom("a1b2c3d4".to_string());
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"In Room a1b2c3d4\"");
        let parsed: PlayerStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, status);
    }

    #[test]
    fn rejects_unknown_status_string() {
        let result: Result<PlayerStatus, _> = serde_json::from_str("\"Confused\"");
        assert!(result.is_err());
    }
}
