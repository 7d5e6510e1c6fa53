//! DB service configuration.

use super::defaults::{default_db_file, default_db_host, default_db_port};
use serde::{Deserialize, Serialize};

/// Configuration for `gamedock-db`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DbConfig {
    /// TCP port the DB service listens on.
    #[serde(default = "default_db_port")]
    pub port: u16,
    /// Path to the JSON document on disk, relative to the CWD unless absolute.
    #[serde(default = "default_db_file")]
    pub file: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            port: default_db_port(),
            file: default_db_file(),
        }
    }
}

/// How the Developer/Lobby services reach the DB service.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DbClientConfig {
    #[serde(default = "default_db_host")]
    pub host: String,
    #[serde(default = "default_db_port")]
    pub port: u16,
}

impl Default for DbClientConfig {
    fn default() -> Self {
        Self {
            host: default_db_host(),
            port: default_db_port(),
        }
    }
}
