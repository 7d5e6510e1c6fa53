//! Configuration module for gamedock.
//!
//! Provides layered configuration for all three services (DB, Developer,
//! Lobby) from one `config.json`/env-var surface:
//! - JSON configuration files
//! - Environment variable overrides (`GAMEDOCK__SECTION__FIELD`)
//! - Stdin input
//! - Sensible defaults
//!
//! # Module Structure
//!
//! - [`types`]: Root `Config` struct
//! - [`db`]: DB service configuration, plus the client view other services use
//! - [`dev`]: Developer service configuration
//! - [`lobby`]: Lobby service configuration
//! - [`protocol`]: Frame codec limits shared by all three services
//! - [`logging`]: Logging configuration
//! - [`loader`]: Configuration loading functions
//! - [`validation`]: Configuration validation functions
//! - [`defaults`]: Default value functions

pub mod db;
pub mod defaults;
pub mod dev;
pub mod lobby;
pub mod loader;
pub mod logging;
pub mod protocol;
pub mod types;
pub mod validation;

pub use db::{DbClientConfig, DbConfig};
pub use dev::DevConfig;
pub use lobby::LobbyConfig;
pub use loader::load;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use protocol::ProtocolConfig;
pub use types::Config;
pub use validation::validate_config;
