//! Wire shapes for the DB service: `{collection, action, data}` requests,
//! `{ok, ...payload|reason}` responses (spec §4.2).

use super::reason::ReasonCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The four top-level collections the DB service owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collection {
    #[serde(rename = "Users_Dev")]
    UsersDev,
    #[serde(rename = "Users_Player")]
    UsersPlayer,
    #[serde(rename = "Games")]
    Games,
    #[serde(rename = "Reviews")]
    Reviews,
}

/// A framed request sent to the DB service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbRequest {
    pub collection: Collection,
    pub action: String,
    #[serde(default)]
    pub data: Value,
}

impl DbRequest {
    pub fn new(collection: Collection, action: impl Into<String>, data: Value) -> Self {
        Self {
            collection,
            action: action.into(),
            data,
        }
    }
}

/// A framed response from the DB service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<ReasonCode>,
    #[serde(flatten, default)]
    pub payload: Map<String, Value>,
}

impl DbResponse {
    pub fn ok(payload: Map<String, Value>) -> Self {
        Self {
            ok: true,
            reason: None,
            payload,
        }
    }

    pub fn ok_empty() -> Self {
        Self::ok(Map::new())
    }

    pub fn fail(reason: ReasonCode) -> Self {
        Self {
            ok: false,
            reason: Some(reason),
            payload: Map::new(),
        }
    }

    /// Deserialize the payload fields into `T`, failing loudly if this
    /// response was a `FAIL` (callers must check `ok` first in practice,
    /// but this guards against misuse).
    pub fn into_payload<T: serde::de::DeserializeOwned>(self) -> anyhow::Result<T> {
        if !self.ok {
            anyhow::bail!(
                "cannot extract payload from a failed DB response (reason: {:?})",
                self.reason
            );
        }
        Ok(serde_json::from_value(Value::Object(self.payload))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_serializes_to_documented_strings() {
        assert_eq!(
            serde_json::to_string(&Collection::UsersDev).unwrap(),
            "\"Users_Dev\""
        );
        assert_eq!(
            serde_json::to_string(&Collection::UsersPlayer).unwrap(),
            "\"Users_Player\""
        );
    }

    #[test]
    fn fail_response_omits_payload_keys() {
        let resp = DbResponse::fail(ReasonCode::UserNotFound);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], false);
        assert_eq!(json["reason"], "USER_NOT_FOUND");
    }

    #[test]
    fn ok_response_flattens_payload_alongside_ok() {
        let mut payload = Map::new();
        payload.insert("play_history".to_string(), serde_json::json!(["demo"]));
        let resp = DbResponse::ok(payload);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["play_history"], serde_json::json!(["demo"]));
        assert!(json.get("reason").is_none());
    }
}
