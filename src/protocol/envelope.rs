//! Generic response envelope shared by the Developer and Lobby services:
//! `{"type": "<CMD>", "status": "OK"|"FAIL", reason?, ...payload}`
//! (spec §6).

use super::reason::ReasonCode;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Ok,
    Fail,
    /// Sent by `UPLOAD_INIT` before the connection switches to raw
    /// byte-stream mode for the archive payload (spec §4.1, §4.3).
    ReadyToRecv,
}

/// A response frame: echoes the command's `type`, carries `status`, and
/// flattens either the success payload or a `reason` alongside it.
#[derive(Debug, Clone, Serialize)]
pub struct Response {
    #[serde(rename = "type")]
    pub command: &'static str,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Response {
    pub fn ok(command: &'static str, payload: Map<String, Value>) -> Self {
        Self {
            command,
            status: Status::Ok,
            reason: None,
            payload,
        }
    }

    pub fn ok_empty(command: &'static str) -> Self {
        Self::ok(command, Map::new())
    }

    pub fn fail(command: &'static str, reason: ReasonCode) -> Self {
        Self {
            command,
            status: Status::Fail,
            reason: Some(reason),
            payload: Map::new(),
        }
    }

    pub fn ready_to_recv(command: &'static str, payload: Map<String, Value>) -> Self {
        Self {
            command,
            status: Status::ReadyToRecv,
            reason: None,
            payload,
        }
    }
}
