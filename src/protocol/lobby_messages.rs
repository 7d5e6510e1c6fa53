//! Lobby service command envelope (spec §4.4).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum LobbyCommand {
    #[serde(rename = "LOGIN")]
    Login { user: String, password: String },

    #[serde(rename = "REGISTER")]
    Register { user: String, password: String },

    #[serde(rename = "LIST_GAMES")]
    ListGames,

    #[serde(rename = "DOWNLOAD_GAME")]
    DownloadGame { game_id: String },

    #[serde(rename = "SUBMIT_REVIEW")]
    SubmitReview {
        game_id: String,
        rating: i64,
        comment: String,
    },

    #[serde(rename = "LIST_REVIEWS")]
    ListReviews { game_id: String },

    #[serde(rename = "LIST_ONLINE")]
    ListOnline,

    #[serde(rename = "CREATE_ROOM")]
    CreateRoom {
        game_id: String,
        game_version: String,
    },

    #[serde(rename = "JOIN_ROOM")]
    JoinRoom {
        room_id: String,
        game_version: String,
    },

    #[serde(rename = "ROOM_STATUS")]
    RoomStatus { room_id: String },

    #[serde(rename = "START_GAME")]
    StartGame { room_id: String },

    #[serde(rename = "LEAVE_ROOM")]
    LeaveRoom { room_id: String },
}

impl LobbyCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Login { .. } => "LOGIN",
            Self::Register { .. } => "REGISTER",
            Self::ListGames => "LIST_GAMES",
            Self::DownloadGame { .. } => "DOWNLOAD_GAME",
            Self::SubmitReview { .. } => "SUBMIT_REVIEW",
            Self::ListReviews { .. } => "LIST_REVIEWS",
            Self::ListOnline => "LIST_ONLINE",
            Self::CreateRoom { .. } => "CREATE_ROOM",
            Self::JoinRoom { .. } => "JOIN_ROOM",
            Self::RoomStatus { .. } => "ROOM_STATUS",
            Self::StartGame { .. } => "START_GAME",
            Self::LeaveRoom { .. } => "LEAVE_ROOM",
        }
    }
}

/// Public projection of a room exposed via `LIST_ONLINE` (spec §4.4).
#[derive(Debug, Clone, Serialize)]
pub struct RoomSummary {
    pub id: String,
    pub game_id: String,
    pub host: String,
    pub player_count: usize,
    pub status: String,
}

/// Public projection of an online player exposed via `LIST_ONLINE`.
#[derive(Debug, Clone, Serialize)]
pub struct OnlinePlayerSummary {
    pub user: String,
    pub status: String,
}
