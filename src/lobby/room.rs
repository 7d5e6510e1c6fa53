//! The Room state machine (spec §3, §4.4): `WAITING -> PLAYING -> CLOSED`,
//! never re-entering an earlier state.

use tokio::sync::oneshot;

/// A room's lifecycle state. `Closed` is terminal and is never observed
/// from outside [`super::state::LobbyState`] — a closed room is removed
/// from the room map in the same step that would otherwise transition it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomStatus {
    Waiting,
    Playing,
}

impl RoomStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::Playing => "PLAYING",
        }
    }
}

/// A runtime Room (spec §3). Never persisted; owned exclusively by the
/// Lobby service's in-memory room map.
pub struct Room {
    pub id: String,
    pub game_id: String,
    pub game_version: String,
    pub min_players: u32,
    pub max_players: u32,
    pub status: RoomStatus,
    pub host: String,
    pub port: u16,
    pub token: String,
    /// Host first, per spec §3's invariant.
    pub players: Vec<String>,
    /// Consumed exactly once to ask the room's supervisor task
    /// (spawned in [`super::state::LobbyState::create_room`]) to kill the
    /// child process. `None` once a kill has already been requested.
    pub kill: Option<oneshot::Sender<()>>,
}

impl Room {
    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }
}
