//! Developer service command envelope (spec §4.3).

use serde::{Deserialize, Serialize};

/// Catalogue metadata supplied with `UPLOAD_INIT`; forwarded to the DB
/// service's `Games.upload` action alongside a freshly appended
/// `VersionEntry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub min_players: u32,
    pub max_players: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum DevCommand {
    #[serde(rename = "LOGIN")]
    Login { user: String, password: String },

    #[serde(rename = "REGISTER")]
    Register { user: String, password: String },

    #[serde(rename = "UPLOAD_INIT")]
    UploadInit {
        game_id: String,
        version: String,
        file_size: u64,
        metadata: GameMetadata,
    },

    #[serde(rename = "LIST_MY_GAMES")]
    ListMyGames,

    #[serde(rename = "OFFSHELF")]
    Offshelf { game_id: String },

    #[serde(rename = "LIST_REVIEWS")]
    ListReviews { game_id: String },
}

impl DevCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "LOGIN",
            Self::Register { .. } => "REGISTER",
            Self::UploadInit { .. } => "UPLOAD_INIT",
            Self::ListMyGames => "LIST_MY_GAMES",
            Self::Offshelf { .. } => "OFFSHELF",
            Self::ListReviews { .. } => "LIST_REVIEWS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_upload_init_with_nested_metadata() {
        let json = serde_json::json!({
            "type": "UPLOAD_INIT",
            "game_id": "demo",
            "version": "1.0",
            "file_size": 42,
            "metadata": {
                "name": "Demo",
                "description": "d",
                "type": "CLI",
                "min_players": 1,
                "max_players": 2
            }
        });
        let cmd: DevCommand = serde_json::from_value(json).unwrap();
        match cmd {
            DevCommand::UploadInit { game_id, file_size, metadata, .. } => {
                assert_eq!(game_id, "demo");
                assert_eq!(file_size, 42);
                assert_eq!(metadata.type_label, "CLI");
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn parses_tagless_variants() {
        let cmd: DevCommand = serde_json::from_value(serde_json::json!({"type": "LIST_MY_GAMES"})).unwrap();
        assert_eq!(cmd.name(), "LIST_MY_GAMES");
    }
}
