//! Per-connection command dispatch for the Developer service (spec §4.3).

use super::upload;
use crate::bundle;
use crate::db_client::DbClient;
use crate::model::Game;
use crate::protocol::{codec, Collection, DevCommand, ReasonCode, Response};
use serde_json::{json, Map, Value};
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::warn;

pub struct Context {
    pub db: DbClient,
    pub storage_dir: PathBuf,
}

#[derive(Default)]
pub struct Session {
    pub user: Option<String>,
}

pub async fn dispatch<S>(
    cmd: DevCommand,
    session: &mut Session,
    ctx: &Context,
    stream: &mut S,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let name = cmd.name();

    match cmd {
        DevCommand::Login { user, password } => {
            match call_db(
                ctx,
                Collection::UsersDev,
                "auth",
                json!({"user": user, "password": password}),
            )
            .await
            {
                Ok(_) => {
                    session.user = Some(user);
                    respond_ok(stream, name, Map::new()).await
                }
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        DevCommand::Register { user, password } => {
            match call_db(
                ctx,
                Collection::UsersDev,
                "register",
                json!({"user": user, "password": password}),
            )
            .await
            {
                Ok(_) => respond_ok(stream, name, Map::new()).await,
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        DevCommand::UploadInit { game_id, version, file_size, metadata } => {
            let Some(author) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            // spec §3: game-id is canonical (name lowercased, spaces to
            // underscores) — enforce it here rather than trusting the
            // client-supplied id verbatim, so the catalogue key and the
            // on-disk bundle path (§4.5) never diverge from the invariant.
            let game_id = Game::canonical_id(&game_id);
            upload_init(&author, &game_id, &version, file_size, metadata, ctx, stream).await
        }

        DevCommand::ListMyGames => {
            let Some(author) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            match call_db(ctx, Collection::Games, "list", json!({"include_inactive": true})).await {
                Ok(payload) => {
                    let games: Vec<Game> = payload
                        .get("games")
                        .cloned()
                        .map(serde_json::from_value)
                        .transpose()?
                        .unwrap_or_default();
                    let mine: Vec<Game> = games.into_iter().filter(|g| g.author == author).collect();
                    let mut out = Map::new();
                    out.insert("games".to_string(), serde_json::to_value(mine)?);
                    respond_ok(stream, name, out).await
                }
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }

        DevCommand::Offshelf { game_id } => {
            let Some(author) = session.user.clone() else {
                return respond_fail(stream, name, ReasonCode::NotAuthenticated).await;
            };
            offshelf(&author, &game_id, ctx, name, stream).await
        }

        DevCommand::ListReviews { game_id } => {
            match call_db(ctx, Collection::Reviews, "list", json!({"game_id": game_id})).await {
                Ok(payload) => respond_ok(stream, name, payload).await,
                Err(reason) => respond_fail(stream, name, reason).await,
            }
        }
    }
}

/// spec §4.3 `UPLOAD_INIT`: create the version directory, announce
/// `READY_TO_RECV`, consume exactly `file_size` raw bytes (spec §4.1's
/// transport-mode switch), extract the archive, then register the
/// catalogue entry and answer with a separate `UPLOAD_COMPLETE` frame.
async fn upload_init<S>(
    author: &str,
    game_id: &str,
    version: &str,
    file_size: u64,
    metadata: crate::protocol::GameMetadata,
    ctx: &Context,
    stream: &mut S,
) -> anyhow::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let version_dir = bundle::version_dir(&ctx.storage_dir, game_id, version);
    tokio::fs::create_dir_all(&version_dir).await?;
    let archive_path = bundle::archive_path(&ctx.storage_dir, game_id, version);

    let ready = Response::ready_to_recv("UPLOAD_INIT", obj([("game_id", json!(game_id))]));
    codec::write_frame(stream, &ready).await?;

    let bytes = codec::read_raw(stream, file_size).await?;
    tokio::fs::write(&archive_path, &bytes).await?;

    if let Err(error) = upload::extract_zip(archive_path.clone(), version_dir.clone()).await {
        warn!(%game_id, %version, %error, "zip extraction failed");
        return respond_fail(stream, "UPLOAD_COMPLETE", ReasonCode::BadZip).await;
    }

    let timestamp = chrono::Utc::now().timestamp() as u64;
    let upload_data = json!({
        "game_id": game_id,
        "metadata": {
            "author": author,
            "name": metadata.name,
            "description": metadata.description,
            "type": metadata.type_label,
            "min_players": metadata.min_players,
            "max_players": metadata.max_players,
        },
        "version_info": {
            "version": version,
            "file_path": archive_path.to_string_lossy(),
            "timestamp": timestamp,
        },
    });

    if let Err(reason) = call_db(ctx, Collection::Games, "upload", upload_data).await {
        warn!(%game_id, %version, ?reason, "db rejected catalogue upload");
        return respond_fail(stream, "UPLOAD_COMPLETE", reason).await;
    }

    respond_ok(stream, "UPLOAD_COMPLETE", Map::new()).await
}

/// spec §9's explicit recommendation: verify `game.author == author`
/// before honoring `OFFSHELF`, rejecting with `NOT_OWNER` otherwise (the
/// source has a known gap here — see DESIGN.md).
async fn offshelf<S>(
    author: &str,
    game_id: &str,
    ctx: &Context,
    name: &'static str,
    stream: &mut S,
) -> anyhow::Result<()>
where
    S: AsyncWrite + Unpin,
{
    let game: Game = match call_db(ctx, Collection::Games, "get", json!({"game_id": game_id})).await {
        Ok(payload) => match payload.get("data").cloned().map(serde_json::from_value) {
            Some(Ok(game)) => game,
            _ => return respond_fail(stream, name, ReasonCode::GameNotFound).await,
        },
        Err(reason) => return respond_fail(stream, name, reason).await,
    };

    if game.author != author {
        return respond_fail(stream, name, ReasonCode::NotOwner).await;
    }

    match call_db(
        ctx,
        Collection::Games,
        "set_active",
        json!({"game_id": game_id, "is_active": false}),
    )
    .await
    {
        Ok(_) => respond_ok(stream, name, Map::new()).await,
        Err(reason) => respond_fail(stream, name, reason).await,
    }
}

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
