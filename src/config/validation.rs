//! Configuration validation functions.

use super::Config;

/// Validate invariants that the layered loader (env/file overrides) can't
/// enforce through `serde` defaults alone.
pub fn validate_config(config: &Config) -> anyhow::Result<()> {
    if config.protocol.max_frame_size == 0 {
        anyhow::bail!("protocol.max_frame_size must be greater than zero");
    }

    if config.lobby.port_range_start >= config.lobby.port_range_end {
        anyhow::bail!(
            "lobby.port_range_start ({}) must be less than lobby.port_range_end ({})",
            config.lobby.port_range_start,
            config.lobby.port_range_end
        );
    }

    if config.dev.storage_dir.trim().is_empty() {
        anyhow::bail!("dev.storage_dir must not be empty");
    }

    if config.lobby.storage_dir.trim().is_empty() {
        anyhow::bail!("lobby.storage_dir must not be empty");
    }

    if config.db.file.trim().is_empty() {
        anyhow::bail!("db.file must not be empty");
    }

    Ok(())
}
