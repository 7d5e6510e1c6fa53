//! On-disk bundle layout: `<storage>/<game_id>/<version>/` (spec §4.5,
//! Bundle Layout).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// `game_config.json`, read from the extracted version directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameManifest {
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub description: String,
    pub min_players: u32,
    pub max_players: u32,
    /// Argv prefix Lobby appends `--port/--token/--room-id` to when
    /// spawning the game-server child.
    pub server_cmd: Vec<String>,
    /// Argv prefix the player client invokes locally, appended with
    /// `--host/--port/--token/--room-id`.
    pub run_cmd: Vec<String>,
}

pub const MANIFEST_FILENAME: &str = "game_config.json";

/// `<storage>/<game_id>/<version>/`
pub fn version_dir(storage_root: &Path, game_id: &str, version: &str) -> PathBuf {
    storage_root.join(game_id).join(version)
}

/// `<storage>/<game_id>/<version>/game_<version>.zip`, the archive path
/// the Developer service writes uploads to (spec §4.3).
pub fn archive_path(storage_root: &Path, game_id: &str, version: &str) -> PathBuf {
    version_dir(storage_root, game_id, version).join(format!("game_{version}.zip"))
}

pub fn manifest_path(storage_root: &Path, game_id: &str, version: &str) -> PathBuf {
    version_dir(storage_root, game_id, version).join(MANIFEST_FILENAME)
}

/// Load and parse the manifest for (`game_id`, `version`) out of
/// `storage_root`.
pub async fn load_manifest(
    storage_root: &Path,
    game_id: &str,
    version: &str,
) -> anyhow::Result<GameManifest> {
    let path = manifest_path(storage_root, game_id, version);
    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| anyhow::anyhow!("reading manifest at {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_nest_under_game_id_then_version() {
        let root = Path::new("/storage");
        assert_eq!(
            version_dir(root, "demo", "1.0"),
            PathBuf::from("/storage/demo/1.0")
        );
        assert_eq!(
            archive_path(root, "demo", "1.0"),
            PathBuf::from("/storage/demo/1.0/game_1.0.zip")
        );
    }
}
