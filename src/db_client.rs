//! Short-lived framed connections to the DB service, one per request,
//! wrapped in [`crate::retry::RetryExecutor`] (spec §4.2, §2 control flow).
//!
//! Both the Developer and Lobby services are DB clients; they share this
//! helper rather than each hand-rolling a connect-send-recv dance.

use crate::protocol::{codec, Collection, DbRequest, DbResponse};
use crate::retry::{RetryConfig, RetryExecutor};
use serde_json::Value;
use tokio::net::TcpStream;
use tracing::instrument;

#[derive(Clone)]
pub struct DbClient {
    host: String,
    port: u16,
    max_frame_size: usize,
    retry: RetryConfig,
}

impl DbClient {
    pub fn new(host: impl Into<String>, port: u16, max_frame_size: usize) -> Self {
        Self {
            host: host.into(),
            port,
            max_frame_size,
            retry: RetryConfig::db_call(),
        }
    }

    /// Open a fresh connection, send one `{collection, action, data}`
    /// request, read the response, and close. Retried on transport
    /// failure (not on a structured `FAIL` from the DB, which is a valid
    /// business-logic response, not a transport error).
    #[instrument(skip(self, data), fields(collection = ?collection, action))]
    pub async fn call(&self, collection: Collection, action: &str, data: Value) -> anyhow::Result<DbResponse> {
        let executor = RetryExecutor::new(self.retry.clone());
        executor
            .execute(action, || self.round_trip(collection, action, data.clone()))
            .await
    }

    async fn round_trip(
        &self,
        collection: Collection,
        action: &str,
        data: Value,
    ) -> anyhow::Result<DbResponse> {
        let mut stream = TcpStream::connect((self.host.as_str(), self.port)).await?;
        let request = DbRequest::new(collection, action, data);
        codec::write_frame(&mut stream, &request).await?;

        let frame = codec::read_frame(&mut stream, self.max_frame_size)
            .await?
            .ok_or_else(|| anyhow::anyhow!("db service closed the connection before responding"))?;

        frame.into_json()
    }
}
