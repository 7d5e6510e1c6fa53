//! Default value functions for configuration fields.
//!
//! Organized by section so the `#[serde(default = ...)]` attributes across
//! `config/*.rs` have a single source of truth.

use super::logging::LogFormat;

// =============================================================================
// DB service
// =============================================================================

pub const fn default_db_port() -> u16 {
    9401
}

pub fn default_db_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_db_file() -> String {
    "db.json".to_string()
}

// =============================================================================
// Developer service
// =============================================================================

pub const fn default_dev_port() -> u16 {
    9402
}

pub fn default_storage_dir() -> String {
    "storage".to_string()
}

// =============================================================================
// Lobby service
// =============================================================================

pub const fn default_lobby_port() -> u16 {
    9403
}

pub const fn default_port_range_start() -> u16 {
    20000
}

pub const fn default_port_range_end() -> u16 {
    30000
}

pub const fn default_idle_timeout_secs() -> u64 {
    0
}

// =============================================================================
// Protocol / framing
// =============================================================================

pub const fn default_max_frame_size() -> usize {
    1024 * 1024
}

// =============================================================================
// Logging
// =============================================================================

pub fn default_log_dir() -> String {
    "logs".to_string()
}

pub fn default_log_filename() -> String {
    "gamedock.log".to_string()
}

pub fn default_rotation() -> String {
    "daily".to_string()
}

pub const fn default_enable_file_logging() -> bool {
    false
}

pub const fn default_log_format() -> LogFormat {
    LogFormat::Text
}
