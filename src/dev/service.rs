//! The Developer service's accept loop and per-connection handler (spec
//! §4.3).

use super::commands::{self, Context, Session};
use crate::config::DevConfig;
use crate::db_client::DbClient;
use crate::protocol::{codec, DevCommand, FramePayload, ReasonCode, Response};
use serde::de::Error as _;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, instrument, warn};

/// Bind and serve the Developer service until the process is terminated.
pub async fn run(config: DevConfig, max_frame_size: usize) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, "developer service listening");

    let ctx = Arc::new(Context {
        db: DbClient::new(config.db.host.clone(), config.db.port, max_frame_size),
        storage_dir: PathBuf::from(config.storage_dir.clone()),
    });

    loop {
        let (stream, addr) = listener.accept().await?;
        let ctx = ctx.clone();
        tokio::spawn(async move {
            info!(%addr, "developer client connected");
            if let Err(error) = handle_connection(stream, ctx, max_frame_size).await {
                warn!(%addr, %error, "developer connection ended with error");
            }
        });
    }
}

#[instrument(skip(stream, ctx))]
async fn handle_connection(mut stream: TcpStream, ctx: Arc<Context>, max_frame_size: usize) -> anyhow::Result<()> {
    let mut session = Session::default();

    loop {
        let Some(payload) = codec::read_frame(&mut stream, max_frame_size).await? else {
            break;
        };

        let cmd = match payload {
            FramePayload::Json(value) => serde_json::from_value::<DevCommand>(value),
            FramePayload::Text(text) => Err(serde_json::Error::custom(format!(
                "expected a JSON command envelope, got raw text: {text}"
            ))),
        };

        match cmd {
            Ok(cmd) => {
                commands::dispatch(cmd, &mut session, &ctx, &mut stream).await?;
            }
            Err(error) => {
                warn!(%error, "failed to parse developer command");
                codec::write_frame(&mut stream, &Response::fail("UNKNOWN", ReasonCode::UnknownCmd)).await?;
            }
        }
    }

    Ok(())
}
