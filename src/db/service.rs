//! The DB service's accept loop (spec §4.2): one task per connection,
//! each request dispatched against the shared [`Store`] under its lock.

use super::actions::dispatch;
use super::store::Store;
use crate::config::DbConfig;
use crate::protocol::{codec, DbRequest, DbResponse, FramePayload, ReasonCode};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, instrument, warn};

/// Bind and serve the DB service until the process is terminated.
pub async fn run(config: DbConfig, max_frame_size: usize) -> anyhow::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!(port = config.port, file = %config.file, "db service listening");

    let store = Arc::new(Store::load(config.file.clone()));

    loop {
        let (stream, addr) = listener.accept().await?;
        let store = store.clone();
        tokio::spawn(async move {
            info!(%addr, "db client connected");
            if let Err(error) = handle_connection(stream, store, max_frame_size).await {
                warn!(%addr, %error, "db connection ended with error");
            }
        });
    }
}

#[instrument(skip(stream, store))]
async fn handle_connection(mut stream: TcpStream, store: Arc<Store>, max_frame_size: usize) -> anyhow::Result<()> {
    loop {
        let Some(payload) = codec::read_frame(&mut stream, max_frame_size).await? else {
            break;
        };

        let value = match payload {
            FramePayload::Json(value) => value,
            FramePayload::Text(text) => {
                warn!(text, "db service received a non-JSON frame");
                codec::write_frame(&mut stream, &DbResponse::fail(ReasonCode::UnknownCmd)).await?;
                continue;
            }
        };

        let Ok(request) = serde_json::from_value::<DbRequest>(value) else {
            warn!("db service received a malformed request frame");
            codec::write_frame(&mut stream, &DbResponse::fail(ReasonCode::UnknownCmd)).await?;
            continue;
        };

        let response = dispatch(&store, request).await;
        codec::write_frame(&mut stream, &response).await?;
    }

    Ok(())
}
