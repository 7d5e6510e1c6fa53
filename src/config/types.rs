//! Root configuration types.
//!
//! All three binaries (`gamedock-db`, `gamedock-dev`, `gamedock-lobby`) load
//! the same [`Config`] document and read only the section(s) relevant to
//! them; this keeps one `config.json`/env-var surface for the whole
//! deployment instead of three divergent ones.

use super::db::DbConfig;
use super::dev::DevConfig;
use super::lobby::LobbyConfig;
use super::logging::LoggingConfig;
use super::protocol::ProtocolConfig;
use serde::{Deserialize, Serialize};

/// Root configuration struct for gamedock.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub dev: DevConfig,
    #[serde(default)]
    pub lobby: LobbyConfig,
    #[serde(default)]
    pub protocol: ProtocolConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}
