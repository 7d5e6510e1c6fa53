//! Lobby service configuration.

use super::db::DbClientConfig;
use super::defaults::{
    default_idle_timeout_secs, default_lobby_port, default_port_range_end,
    default_port_range_start, default_storage_dir,
};
use serde::{Deserialize, Serialize};

/// Configuration for `gamedock-lobby`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LobbyConfig {
    /// TCP port the lobby service listens on.
    #[serde(default = "default_lobby_port")]
    pub port: u16,
    /// Root directory for bundle storage, shared with the developer service.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// How to reach the DB service for auth/catalogue/review round trips.
    #[serde(default)]
    pub db: DbClientConfig,
    /// Inclusive start of the port range handed out to spawned game servers.
    #[serde(default = "default_port_range_start")]
    pub port_range_start: u16,
    /// Inclusive end of the port range handed out to spawned game servers.
    #[serde(default = "default_port_range_end")]
    pub port_range_end: u16,
    /// Idle read timeout per client connection, in seconds. `0` disables it.
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            port: default_lobby_port(),
            storage_dir: default_storage_dir(),
            db: DbClientConfig::default(),
            port_range_start: default_port_range_start(),
            port_range_end: default_port_range_end(),
            idle_timeout_secs: default_idle_timeout_secs(),
        }
    }
}
