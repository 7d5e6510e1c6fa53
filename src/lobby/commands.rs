//! Per-connection command dispatch for the Lobby service (spec §4.4).

use super::state::{CreateRoomError, JoinRoomError, LobbyState, StartGameError};
use crate::bundle;
use crate::db_client::DbClient;
use crate::launch::build_server_argv;
use crate::model::Game;
use crate::protocol::{codec, Collection, LobbyCommand, Response, ReasonCode};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

pub struct Context {
    pub db: DbClient,
    pub state: Arc<LobbyState>,
    pub storage_dir: PathBuf,
}

#[derive(Default)]
pub struct Session {
    pub user: Option<String>,
}

/// Handle one decoded command end to end: issues any DB/room-state calls,
/// and writes exactly one response (plus, for `DOWNLOAD_GAME`, the raw
/// archive bytes that follow it — spec §4.1 transport-mode switch).
pub async fn dispatch<S>(
    cmd: LobbyCommand,
    session: &mut Session,
    ctx: &Context,
    stream: &mut S,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let name = cmd.name();

    match cmd {
        LobbyCommand::Login { user, password } => {
            if ctx.state.is_online(&user).await {
                return respond_fail(stream, name, ReasonCode::AlreadyLoggedIn).await;
            }
            match call_db(
                ctx,
                Collection::UsersPlayer,
                "auth",
                json!({"user": user, "password": password}),
            )
            .await
            {
                Err(reason) => respond_fail(stream, name, reason).await,
                Ok(_) => match ctx.state.login(&user).await {
                    Err(_) => respond_fail(stream, name, ReasonCode::AlreadyLoggedIn).await,
                    Ok(()) => {
                        session.user = Some(user);
                        respond_ok(stream, name, Map::new()).await
                    }
                },
            }
        }

        LobbyCommand::Register { user, password } => {
            match call_db(
                ctx,
                Collection::UsersPlayer,
                "register",
                json!({"user": user, "password": password}),
            )
            .await
            {
                Ok(_) => respond_ok(stream, name, Map::new()).await,
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        LobbyCommand::ListGames => {
            match call_db(ctx, Collection::Games, "list", json!({"include_inactive": false})).await {
                Ok(payload) => respond_ok(stream, name, payload).await,
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        LobbyCommand::DownloadGame { game_id } => {
            download_game(&game_id, ctx, name, stream).await
        }

        LobbyCommand::SubmitReview { game_id, rating, comment } => {
            let Some(user) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            let rating = rating.clamp(1, 5);
            match call_db(
                ctx,
                Collection::Reviews,
                "submit",
                json!({"user": user, "game_id": game_id, "rating": rating, "comment": comment}),
            )
            .await
            {
                Ok(_) => respond_ok(stream, name, Map::new()).await,
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        LobbyCommand::ListReviews { game_id } => {
            match call_db(ctx, Collection::Reviews, "list", json!({"game_id": game_id})).await {
                Ok(payload) => respond_ok(stream, name, payload).await,
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        LobbyCommand::ListOnline => {
            let users = ctx.state.list_online().await;
            let rooms = ctx.state.list_rooms().await;
            let mut payload = Map::new();
            payload.insert("users".to_string(), serde_json::to_value(users)?);
            payload.insert("rooms".to_string(), serde_json::to_value(rooms)?);
            respond_ok(stream, name, payload).await
        }

        LobbyCommand::CreateRoom { game_id, game_version } => {
            let Some(user) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            create_room(&user, &game_id, &game_version, ctx, name, stream).await
        }

        LobbyCommand::JoinRoom { room_id, game_version } => {
            let Some(user) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            match ctx.state.join_room(&user, &room_id, &game_version).await {
                Ok(info) => {
                    if let Err(error) = call_db(
                        ctx,
                        Collection::UsersPlayer,
                        "record_play",
                        json!({"user": user, "game_id": info.game_id}),
                    )
                    .await
                    {
                        warn!(%user, %room_id, ?error, "failed to record play on join");
                    }
                    let payload = obj([
                        ("room_id", json!(info.room_id)),
                        ("port", json!(info.port)),
                        ("token", json!(info.token)),
                        ("host", json!("127.0.0.1")),
                    ]);
                    respond_ok(stream, name, payload).await
                }
                Err(JoinRoomError::RoomNotFound) => respond_fail(stream, name, ReasonCode::RoomNotFound).await,
                Err(JoinRoomError::VersionMismatch) => respond_fail(stream, name, ReasonCode::VersionMismatch).await,
                Err(JoinRoomError::RoomFull) => respond_fail(stream, name, ReasonCode::RoomFull).await,
                Err(JoinRoomError::GameAlreadyStarted) => {
                    respond_fail(stream, name, ReasonCode::GameAlreadyStarted).await
                }
            }
        }

        LobbyCommand::RoomStatus { room_id } => match ctx.state.room_status(&room_id).await {
            Some(view) => {
                let payload = obj([
                    ("status", json!(view.status)),
                    ("players", json!(view.players)),
                    ("min_players", json!(view.min_players)),
                ]);
                respond_ok(stream, name, payload).await
            }
            None => respond_fail(stream, name, ReasonCode::RoomNotFound).await,
        },

        LobbyCommand::StartGame { room_id } => {
            let Some(user) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            match ctx.state.start_game(&user, &room_id).await {
                Ok(()) => respond_ok(stream, name, Map::new()).await,
                Err(StartGameError::RoomNotFound) => respond_fail(stream, name, ReasonCode::RoomNotFound).await,
                Err(StartGameError::NotHost) => respond_fail(stream, name, ReasonCode::NotHost).await,
                Err(StartGameError::NeedMorePlayers) => {
                    respond_fail(stream, name, ReasonCode::NeedMorePlayers).await
                }
            }
        }

        LobbyCommand::LeaveRoom { room_id } => {
            if let Some(user) = session.user.clone() {
                ctx.state.leave_room(&user, &room_id).await;
            }
            respond_ok(stream, name, Map::new()).await
        }
    }
}

async fn create_room<S>(
    user: &str,
    game_id: &str,
    game_version: &str,
    ctx: &Context,
    name: &'static str,
    stream: &mut S,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let game: Game = match call_db(ctx, Collection::Games, "get", json!({"game_id": game_id})).await {
        Ok(payload) => match payload.get("data").cloned().map(serde_json::from_value) {
            Some(Ok(game)) => game,
            _ => return respond_fail(stream, name, ReasonCode::GameNotFound).await,
        },
        Err(_) => return respond_fail(stream, name, ReasonCode::GameNotFound).await,
    };

    if game_version != game.latest_version {
        return respond_fail(stream, name, ReasonCode::VersionMismatch).await;
    }

    let manifest = match bundle::load_manifest(&ctx.storage_dir, game_id, game_version).await {
        Ok(manifest) => manifest,
        Err(error) => {
            warn!(%game_id, %game_version, %error, "failed to load bundle manifest");
            return respond_fail(stream, name, ReasonCode::LaunchFail).await;
        }
    };
    let cwd = bundle::version_dir(&ctx.storage_dir, game_id, game_version);

    let server_cmd = manifest.server_cmd.clone();
    let result = ctx
        .state
        .create_room(
            user,
            game_id,
            game_version,
            game.min_players,
            game.max_players,
            |port, token, room_id| build_server_argv(&server_cmd, port, token, room_id),
            cwd,
        )
        .await;

    match result {
        Ok(info) => {
            if let Err(error) =
                call_db(ctx, Collection::UsersPlayer, "record_play", json!({"user": user, "game_id": game_id})).await
            {
                warn!(%user, %game_id, ?error, "failed to record play on room creation");
            }
            let payload = obj([
                ("room_id", json!(info.room_id)),
                ("port", json!(info.port)),
                ("token", json!(info.token)),
                ("min_players", json!(game.min_players)),
                ("host", json!("127.0.0.1")),
            ]);
            respond_ok(stream, name, payload).await
        }
        Err(CreateRoomError::LaunchFail) => respond_fail(stream, name, ReasonCode::LaunchFail).await,
    }
}

async fn download_game<S>(
    game_id: &str,
    ctx: &Context,
    name: &'static str,
    stream: &mut S,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let game: Game = match call_db(ctx, Collection::Games, "get", json!({"game_id": game_id})).await {
        Ok(payload) => match payload.get("data").cloned().map(serde_json::from_value) {
            Some(Ok(game)) => game,
            _ => return respond_fail(stream, name, ReasonCode::GameNotFound).await,
        },
        Err(_) => return respond_fail(stream, name, ReasonCode::GameNotFound).await,
    };

    let Some(entry) = game.versions.iter().find(|v| v.version == game.latest_version) else {
        return respond_fail(stream, name, ReasonCode::VersionNotFound).await;
    };

    let archive_path = bundle::archive_path(&ctx.storage_dir, game_id, &entry.version);
    let bytes = match tokio::fs::read(&archive_path).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(path = %archive_path.display(), %error, "archive file missing on disk");
            return respond_fail(stream, name, ReasonCode::FileMissing).await;
        }
    };

    let filename = format!("{game_id}_{}.zip", entry.version);
    let payload = obj([
        ("size", json!(bytes.len())),
        ("version", json!(entry.version)),
        ("filename", json!(filename)),
    ]);
    let response = Response::ok(name, payload);
    codec::write_frame(stream, &response).await?;
    codec::write_raw(stream, &bytes).await?;
    Ok(())
}

/// Issues one `{collection, action, data}` DB round trip, collapsing
/// transport failure and a structured `FAIL` into a single `ReasonCode`
/// (spec §7: propagate the underlying reason if present, else `DB_ERROR`).
async fn call_db(
    ctx: &Context,
    collection: Collection,
    action: &str,
    data: Value,
) -> Result<Map<String, Value>, ReasonCode> {
    match ctx.db.call(collection, action, data).await {
        Ok(resp) if resp.ok => Ok(resp.payload),
        Ok(resp) => Err(resp.reason.unwrap_or(ReasonCode::DbError)),
        Err(error) => {
            warn!(%error, "db round trip failed");
            Err(ReasonCode::DbError)
        }
    }
}

fn obj<const N: usize>(fields: [(&'static str, Value); N]) -> Map<String, Value> {
    fields.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

async fn respond_ok<S>(stream: &mut S, name: &'static str, payload: Map<String, Value>) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin,
{
    codec::write_frame(stream, &Response::ok(name, payload)).await
}

async fn respond_fail<S>(stream: &mut S, name: &'static str, reason: ReasonCode) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin,
{
    codec::write_frame(stream, &Response::fail(name, reason)).await
}
