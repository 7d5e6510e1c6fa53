//! Developer service configuration.

use super::db::DbClientConfig;
use super::defaults::{default_dev_port, default_storage_dir};
use serde::{Deserialize, Serialize};

/// Configuration for `gamedock-dev`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DevConfig {
    /// TCP port the developer service listens on.
    #[serde(default = "default_dev_port")]
    pub port: u16,
    /// Root directory for bundle storage (`<storage>/<game_id>/<version>/`).
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,
    /// How to reach the DB service for account/catalogue round trips.
    #[serde(default)]
    pub db: DbClientConfig,
}

impl Default for DevConfig {
    fn default() -> Self {
        Self {
            port: default_dev_port(),
            storage_dir: default_storage_dir(),
            db: DbClientConfig::default(),
        }
    }
}
