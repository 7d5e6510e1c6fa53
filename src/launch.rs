//! The launch contract: the argv surface a game-server child must accept,
//! and the matching argv handed to the player-side game client (spec §4.5).

/// Append `--port <port> --token <token> --room-id <id>` to the bundle's
/// `server_cmd` prefix, producing the full argv for spawning the
/// game-server child.
pub fn build_server_argv(server_cmd: &[String], port: u16, token: &str, room_id: &str) -> Vec<String> {
    let mut argv = server_cmd.to_vec();
    argv.push("--port".to_string());
    argv.push(port.to_string());
    argv.push("--token".to_string());
    argv.push(token.to_string());
    argv.push("--room-id".to_string());
    argv.push(room_id.to_string());
    argv
}

/// Append `--host <lobby-host> --port <port> --token <token> --room-id <id>`
/// to the bundle's `run_cmd` prefix, producing the argv the player invokes
/// locally for the game's client.
pub fn build_run_argv(
    run_cmd: &[String],
    host: &str,
    port: u16,
    token: &str,
    room_id: &str,
) -> Vec<String> {
    let mut argv = run_cmd.to_vec();
    argv.push("--host".to_string());
    argv.push(host.to_string());
    argv.push("--port".to_string());
    argv.push(port.to_string());
    argv.push("--token".to_string());
    argv.push(token.to_string());
    argv.push("--room-id".to_string());
    argv.push(room_id.to_string());
    argv
}
