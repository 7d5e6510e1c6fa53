//! The Lobby service's accept loop and per-connection handler (spec §4.4,
//! §5: one task per connection, suspending only at I/O boundaries).

use super::commands::{self, Context, Session};
use super::state::LobbyState;
use crate::config::LobbyConfig;
use crate::db_client::DbClient;
use crate::protocol::{codec, FramePayload, LobbyCommand, ReasonCode, Response};
use serde::de::Error as _;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, instrument, warn};

/// Bind and serve the Lobby service until the process is terminated.
pub async fn run(config: LobbyConfig, max_frame_size: usize) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "lobby service listening");

    let state = LobbyState::new(config.port_range_start, config.port_range_end);
    let ctx = Arc::new(Context {
        db: DbClient::new(config.db.host.clone(), config.db.port, max_frame_size),
        state,
        storage_dir: PathBuf::from(config.storage_dir.clone()),
    });
    let idle_timeout = idle_timeout_duration(config.idle_timeout_secs);

    loop {
        let (stream, addr) = listener.accept().await?;
        let ctx = ctx.clone();
        tokio::spawn(async move {
            info!(%addr, "lobby client connected");
            if let Err(error) = handle_connection(stream, ctx.clone(), max_frame_size, idle_timeout).await {
                warn!(%addr, %error, "lobby connection ended with error");
            }
        });
    }
}

fn idle_timeout_duration(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

#[instrument(skip(stream, ctx))]
async fn handle_connection(
    mut stream: TcpStream,
    ctx: Arc<Context>,
    max_frame_size: usize,
    idle_timeout: Option<Duration>,
) -> anyhow::Result<()> {
    let mut session = Session::default();

    loop {
        let read = codec::read_frame(&mut stream, max_frame_size);
        let frame = match idle_timeout {
            Some(duration) => match tokio::time::timeout(duration, read).await {
                Ok(result) => result?,
                Err(_) => {
                    info!("lobby connection idle timeout, closing");
                    break;
                }
            },
            None => read.await?,
        };

        let Some(payload) = frame else {
            break;
        };

        let cmd = match payload {
            FramePayload::Json(value) => serde_json::from_value::<LobbyCommand>(value),
            FramePayload::Text(text) => Err(serde::de::Error::custom(format!(
                "expected a JSON command envelope, got raw text: {text}"
            ))),
        };

        match cmd {
            Ok(cmd) => {
                commands::dispatch(cmd, &mut session, &ctx, &mut stream).await?;
            }
            Err(error) => {
                warn!(%error, "failed to parse lobby command");
                codec::write_frame(&mut stream, &Response::fail("UNKNOWN", ReasonCode::UnknownCmd)).await?;
            }
        }
    }

    if let Some(user) = session.user.take() {
        ctx.state.on_disconnect(&user).await;
    }
    Ok(())
}
