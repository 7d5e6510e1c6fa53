//! Process-wide Lobby state (spec §4.4): the online-player map and the
//! room map. Both live behind one `tokio::sync::Mutex`, modeling the
//! source's single-event-loop discipline (spec §5, §9) as one
//! linearisation point rather than requiring literal single-thread
//! execution.

use super::process;
use super::room::{Room, RoomStatus};
use crate::model::PlayerStatus;
use crate::protocol::{OnlinePlayerSummary, RoomSummary};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::process::Child;
use tokio::sync::{oneshot, Mutex};
use uuid::Uuid;

struct Inner {
    online: HashMap<String, PlayerStatus>,
    rooms: HashMap<String, Room>,
}

pub struct LobbyState {
    inner: Mutex<Inner>,
    port_range_start: u16,
    port_range_end: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("this username already has an active session")]
    AlreadyLoggedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreateRoomError {
    #[error("the game-server child process failed to start")]
    LaunchFail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinRoomError {
    #[error("no room exists with this id")]
    RoomNotFound,
    #[error("the requested version does not match the room's bound version")]
    VersionMismatch,
    #[error("the room has reached its maximum player count")]
    RoomFull,
    #[error("the room is no longer accepting joins")]
    GameAlreadyStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartGameError {
    #[error("no room exists with this id")]
    RoomNotFound,
    #[error("only the host may start the game")]
    NotHost,
    #[error("fewer than min_players are present")]
    NeedMorePlayers,
}

pub struct RoomJoinInfo {
    pub room_id: String,
    pub game_id: String,
    pub port: u16,
    pub token: String,
}

pub struct RoomStatusView {
    pub status: &'static str,
    pub players: Vec<String>,
    pub min_players: u32,
    pub max_players: u32,
}

impl LobbyState {
    pub fn new(port_range_start: u16, port_range_end: u16) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                online: HashMap::new(),
                rooms: HashMap::new(),
            }),
            port_range_start,
            port_range_end,
        })
    }

    /// spec §4.4 `LOGIN`: rejects with `ALREADY_LOGGED_IN` if the username
    /// already appears in the online map (spec §9, duplicate-login
    /// semantics kept verbatim).
    pub async fn login(&self, user: &str) -> Result<(), LoginError> {
        let mut inner = self.inner.lock().await;
        if inner.online.contains_key(user) {
            return Err(LoginError::AlreadyLoggedIn);
        }
        inner.online.insert(user.to_string(), PlayerStatus::Idle);
        Ok(())
    }

    pub async fn is_online(&self, user: &str) -> bool {
        self.inner.lock().await.online.contains_key(user)
    }

    pub async fn list_online(&self) -> Vec<OnlinePlayerSummary> {
        let inner = self.inner.lock().await;
        inner
            .online
            .iter()
            .map(|(user, status)| OnlinePlayerSummary {
                user: user.clone(),
                status: status.to_string(),
            })
            .collect()
    }

    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let inner = self.inner.lock().await;
        inner
            .rooms
            .values()
            .map(|room| RoomSummary {
                id: room.id.clone(),
                game_id: room.game_id.clone(),
                host: room.host.clone(),
                player_count: room.players.len(),
                status: room.status.as_str().to_string(),
            })
            .collect()
    }

    pub async fn room_status(&self, room_id: &str) -> Option<RoomStatusView> {
        let inner = self.inner.lock().await;
        inner.rooms.get(room_id).map(|room| RoomStatusView {
            status: room.status.as_str(),
            players: room.players.clone(),
            min_players: room.min_players,
            max_players: room.max_players,
        })
    }

    /// spec §4.4 transition 1 (`CREATE_ROOM`). The caller has already
    /// resolved the game and checked `game_version == latest_version`;
    /// this allocates runtime resources, spawns the child, and registers
    /// the room.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_room(
        self: &Arc<Self>,
        host: &str,
        game_id: &str,
        game_version: &str,
        min_players: u32,
        max_players: u32,
        argv_builder: impl FnOnce(u16, &str, &str) -> Vec<String>,
        cwd: PathBuf,
    ) -> Result<RoomJoinInfo, CreateRoomError> {
        let mut inner = self.inner.lock().await;

        let room_id = loop {
            let candidate = random_room_id();
            if !inner.rooms.contains_key(&candidate) {
                break candidate;
            }
        };

        let in_use: std::collections::HashSet<u16> =
            inner.rooms.values().map(|room| room.port).collect();
        let Some(port) = process::allocate_port(self.port_range_start, self.port_range_end, &in_use)
        else {
            return Err(CreateRoomError::LaunchFail);
        };

        let token = Uuid::new_v4().to_string();
        let argv = argv_builder(port, &token, &room_id);

        let child: Child = match process::spawn_game_server(&argv, &cwd) {
            Ok(child) => child,
            Err(error) => {
                tracing::warn!(%game_id, %error, "failed to spawn game-server child");
                return Err(CreateRoomError::LaunchFail);
            }
        };

        let (kill_tx, kill_rx) = oneshot::channel();
        inner.rooms.insert(
            room_id.clone(),
            Room {
                id: room_id.clone(),
                game_id: game_id.to_string(),
                game_version: game_version.to_string(),
                min_players,
                max_players,
                status: RoomStatus::Waiting,
                host: host.to_string(),
                port,
                token: token.clone(),
                players: vec![host.to_string()],
                kill: Some(kill_tx),
            },
        );
        inner
            .online
            .insert(host.to_string(), PlayerStatus::InRoom(room_id.clone()));
        drop(inner);

        process::supervise(self.clone(), room_id.clone(), child, kill_rx);

        Ok(RoomJoinInfo {
            room_id,
            game_id: game_id.to_string(),
            port,
            token,
        })
    }

    /// spec §4.4 transition 2 (`JOIN_ROOM`).
    pub async fn join_room(
        &self,
        user: &str,
        room_id: &str,
        game_version: &str,
    ) -> Result<RoomJoinInfo, JoinRoomError> {
        let mut inner = self.inner.lock().await;
        let room = inner
            .rooms
            .get_mut(room_id)
            .ok_or(JoinRoomError::RoomNotFound)?;

        if game_version != room.game_version {
            return Err(JoinRoomError::VersionMismatch);
        }
        // ROOM_FULL is checked before GAME_ALREADY_STARTED (spec.md's
        // documented order; matches the original's `len(players) >=
        // max_players` check preceding its `status != WAITING` check), so a
        // room that is simultaneously PLAYING and at capacity reports
        // ROOM_FULL.
        if room.is_full() {
            return Err(JoinRoomError::RoomFull);
        }
        if room.status != RoomStatus::Waiting {
            return Err(JoinRoomError::GameAlreadyStarted);
        }

        room.players.push(user.to_string());
        let info = RoomJoinInfo {
            room_id: room_id.to_string(),
            game_id: room.game_id.clone(),
            port: room.port,
            token: room.token.clone(),
        };
        inner
            .online
            .insert(user.to_string(), PlayerStatus::InRoom(room_id.to_string()));
        Ok(info)
    }

    /// spec §4.4 transition 3 (`START_GAME`). The supervisor task
    /// watching the child was already spawned at room creation (see
    /// `create_room`'s doc comment and `process::supervise`), so this
    /// only flips status and player states.
    pub async fn start_game(&self, user: &str, room_id: &str) -> Result<(), StartGameError> {
        let mut inner = self.inner.lock().await;
        let room = inner
            .rooms
            .get_mut(room_id)
            .ok_or(StartGameError::RoomNotFound)?;

        if room.host != user {
            return Err(StartGameError::NotHost);
        }
        if (room.players.len() as u32) < room.min_players {
            return Err(StartGameError::NeedMorePlayers);
        }

        room.status = RoomStatus::Playing;
        let players = room.players.clone();
        for player in players {
            inner.online.insert(player, PlayerStatus::Playing);
        }
        Ok(())
    }

    /// spec §4.4 transition 4 (`LEAVE_ROOM`). Matches the source's
    /// behaviour of answering `OK` even when the room no longer exists
    /// (the client is treated as already having left).
    pub async fn leave_room(&self, user: &str, room_id: &str) {
        let mut inner = self.inner.lock().await;
        let Some(room) = inner.rooms.get_mut(room_id) else {
            return;
        };

        let was_member = room.players.iter().any(|p| p == user);
        if was_member {
            room.players.retain(|p| p != user);
            inner.online.insert(user.to_string(), PlayerStatus::Idle);
        }

        let is_host = room.host == user;
        let is_empty = room.players.is_empty();
        if is_host || is_empty {
            self.destroy_room_locked(&mut inner, room_id);
        }
    }

    /// Invoked by the room's supervisor task when the child exits, from
    /// either `WAITING` or `PLAYING` (spec §4.4 transition 5). A no-op if
    /// the room was already torn down by an explicit `LEAVE_ROOM`.
    pub async fn on_child_exit(&self, room_id: &str) {
        let mut inner = self.inner.lock().await;
        self.destroy_room_locked(&mut inner, room_id);
    }

    /// spec §4.4 transition 6 (client disconnect): removes the user from
    /// the online map; destroys any room they hosted; silently removes
    /// them from any room they were a guest in (and destroys that room
    /// too if they were its last remaining player, per the "last player
    /// leaves" invariant in spec §3).
    pub async fn on_disconnect(&self, user: &str) {
        let mut inner = self.inner.lock().await;
        inner.online.remove(user);

        let affected: Vec<String> = inner
            .rooms
            .iter()
            .filter(|(_, room)| room.host == user || room.players.iter().any(|p| p == user))
            .map(|(id, _)| id.clone())
            .collect();

        for room_id in affected {
            let Some(room) = inner.rooms.get_mut(&room_id) else {
                continue;
            };
            let is_host = room.host == user;
            room.players.retain(|p| p != user);
            let is_empty = room.players.is_empty();
            if is_host || is_empty {
                self.destroy_room_locked(&mut inner, &room_id);
            }
        }
    }

    /// Removes `room_id` if present, signals its supervisor to kill the
    /// child, and resets every remaining member's status to `Idle`.
    fn destroy_room_locked(&self, inner: &mut Inner, room_id: &str) {
        let Some(mut room) = inner.rooms.remove(room_id) else {
            return;
        };
        if let Some(kill) = room.kill.take() {
            let _ = kill.send(());
        }
        for player in &room.players {
            inner.online.insert(player.clone(), PlayerStatus::Idle);
        }
    }
}

fn random_room_id() -> String {
    let bytes: [u8; 4] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn login_rejects_duplicate_username() {
        let state = LobbyState::new(20000, 20010);
        state.login("alice").await.unwrap();
        let result = state.login("alice").await;
        assert_eq!(result, Err(LoginError::AlreadyLoggedIn));
    }

    #[tokio::test]
    async fn join_room_not_found_fails() {
        let state = LobbyState::new(20000, 20010);
        let result = state.join_room("bob", "missing", "1.0").await;
        assert!(matches!(result, Err(JoinRoomError::RoomNotFound)));
    }

    #[tokio::test]
    async fn leave_room_on_unknown_room_is_a_no_op() {
        let state = LobbyState::new(20000, 20010);
        // Must not panic; matches the source's "answer OK regardless" behaviour.
        state.leave_room("ghost", "missing").await;
    }
}
