//! Child-process spawn and supervision for game-server rooms (spec §4.4,
//! §5 "child processes"), grounded in
//! `examples/original_source/server/lobby_server.py`'s
//! `start_game_server`/`monitor_game_process`, generalized from a single
//! `asyncio.create_task` fired at `START_GAME` into a supervisor spawned
//! at room creation — so a child that dies during `WAITING` is torn down
//! the same way as one that dies during `PLAYING` (spec §4.4 edge cases).

use super::state::LobbyState;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::{Child, Command};
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Spawn the game-server child with `cwd` set to the bundle's version
/// directory (spec §4.4 transition 1).
pub fn spawn_game_server(argv: &[String], cwd: &Path) -> std::io::Result<Child> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| std::io::Error::other("server_cmd must not be empty"))?;
    Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
}

/// Spawn a task that awaits either the child's natural exit or an
/// explicit kill request, then tears down the owning room exactly once.
///
/// Runs for the room's entire lifetime (spec §4.4 edge case: a child that
/// dies during `WAITING` is destroyed the same way as one that dies
/// during `PLAYING`).
pub fn supervise(state: Arc<LobbyState>, room_id: String, mut child: Child, kill_rx: oneshot::Receiver<()>) {
    tokio::spawn(async move {
        tokio::select! {
            result = child.wait() => {
                match result {
                    Ok(status) => info!(%room_id, %status, "game-server child exited"),
                    Err(error) => warn!(%room_id, %error, "error waiting on game-server child"),
                }
            }
            _ = kill_rx => {
                if let Err(error) = child.kill().await {
                    warn!(%room_id, %error, "failed to kill game-server child");
                }
                info!(%room_id, "game-server child killed on room teardown");
            }
        }
        state.on_child_exit(&room_id).await;
    });
}

/// Generate an unused port in `[start, end]`, retrying a bounded number of
/// times against the set of ports the lobby has already handed out
/// (spec §5: "port allocation is retried on failure").
pub fn allocate_port(start: u16, end: u16, in_use: &std::collections::HashSet<u16>) -> Option<u16> {
    if start > end {
        return None;
    }
    let span = (end - start) as u32 + 1;
    for _ in 0..64 {
        let offset = rand::random::<u32>() % span;
        let candidate = start + offset as u16;
        if !in_use.contains(&candidate) {
            return Some(candidate);
        }
    }
    // Random probing above is the common case; fall back to a linear scan
    // so a near-exhausted range still finds the rare free slot deterministically.
    (start..=end).find(|candidate| !in_use.contains(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_port_avoids_in_use_set() {
        let mut in_use = std::collections::HashSet::new();
        for p in 20000..20010 {
            in_use.insert(p);
        }
        let port = allocate_port(20000, 20010, &in_use).unwrap();
        assert_eq!(port, 20010);
    }

    #[test]
    fn allocate_port_returns_none_when_range_exhausted() {
        let mut in_use = std::collections::HashSet::new();
        for p in 20000..=20005 {
            in_use.insert(p);
        }
        assert!(allocate_port(20000, 20005, &in_use).is_none());
    }
}
