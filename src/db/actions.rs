//! The per-collection action table (spec §4.2).

use super::document::Document;
use super::store::Store;
use crate::model::{DeveloperAccount, Game, PlayerAccount, PlayerStatus, Review, VersionEntry};
use crate::protocol::{Collection, DbRequest, DbResponse, ReasonCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Dispatch one `{collection, action, data}` request against `store`,
/// persisting under the same lock as the mutation. Unknown
/// collection/action combinations fall back to `UNKNOWN_CMD`.
pub async fn dispatch(store: &Store, request: DbRequest) -> DbResponse {
    let mut document = store.lock().await;
    let (response, mutated) = match request.collection {
        Collection::UsersDev => users_dev(&mut document, &request.action, request.data),
        Collection::UsersPlayer => users_player(&mut document, &request.action, request.data),
        Collection::Games => games(&mut document, &request.action, request.data),
        Collection::Reviews => reviews(&mut document, &request.action, request.data),
    };
    if mutated {
        store.persist(&document);
    }
    response
}

fn unknown() -> (DbResponse, bool) {
    (DbResponse::fail(ReasonCode::UnknownCmd), false)
}

fn payload_of(value: Value) -> (DbResponse, bool) {
    match value {
        Value::Object(map) => (DbResponse::ok(map), false),
        other => {
            let mut map = Map::new();
            map.insert("value".to_string(), other);
            (DbResponse::ok(map), false)
        }
    }
}

#[derive(Deserialize)]
struct UserCredentials {
    user: String,
    password: String,
}

fn users_dev(document: &mut Document, action: &str, data: Value) -> (DbResponse, bool) {
    match action {
        "register" => {
            let Ok(creds) = serde_json::from_value::<UserCredentials>(data) else {
                return unknown();
            };
            if document.users_dev.contains_key(&creds.user) {
                return (DbResponse::fail(ReasonCode::AccountExists), false);
            }
            let created_at = document.next_id("timestamp");
            document.users_dev.insert(
                creds.user.clone(),
                DeveloperAccount {
                    username: creds.user,
                    password: creds.password,
                    created_at,
                },
            );
            (DbResponse::ok_empty(), true)
        }
        "auth" => {
            let Ok(creds) = serde_json::from_value::<UserCredentials>(data) else {
                return unknown();
            };
            match document.users_dev.get(&creds.user) {
                None => (DbResponse::fail(ReasonCode::UserNotFound), false),
                Some(account) if account.password != creds.password => {
                    (DbResponse::fail(ReasonCode::WrongPassword), false)
                }
                Some(_) => (DbResponse::ok_empty(), false),
            }
        }
        "get" => {
            let user = data.get("user").and_then(Value::as_str).unwrap_or_default();
            match document.users_dev.get(user) {
                Some(account) => payload_of(json!({ "data": account })),
                None => (DbResponse::fail(ReasonCode::UserNotFound), false),
            }
        }
        _ => unknown(),
    }
}

fn users_player(document: &mut Document, action: &str, data: Value) -> (DbResponse, bool) {
    match action {
        "register" => {
            let Ok(creds) = serde_json::from_value::<UserCredentials>(data) else {
                return unknown();
            };
            if document.users_player.contains_key(&creds.user) {
                return (DbResponse::fail(ReasonCode::AccountExists), false);
            }
            let created_at = document.next_id("timestamp");
            document.users_player.insert(
                creds.user.clone(),
                PlayerAccount {
                    username: creds.user,
                    password: creds.password,
                    created_at,
                    status: PlayerStatus::Idle,
                    play_history: Default::default(),
                },
            );
            (DbResponse::ok_empty(), true)
        }
        "auth" => {
            let Ok(creds) = serde_json::from_value::<UserCredentials>(data) else {
                return unknown();
            };
            match document.users_player.get(&creds.user) {
                None => (DbResponse::fail(ReasonCode::UserNotFound), false),
                Some(account) if account.password != creds.password => {
                    (DbResponse::fail(ReasonCode::WrongPassword), false)
                }
                Some(account) => {
                    let history: Vec<&String> = account.play_history.iter().collect();
                    payload_of(json!({ "play_history": history }))
                }
            }
        }
        "record_play" => {
            let user = data.get("user").and_then(Value::as_str).unwrap_or_default();
            let game_id = data.get("game_id").and_then(Value::as_str).unwrap_or_default();
            let mut mutated = false;
            if let Some(account) = document.users_player.get_mut(user) {
                mutated = account.play_history.insert(game_id.to_string());
            }
            (DbResponse::ok_empty(), mutated)
        }
        "get" => {
            let user = data.get("user").and_then(Value::as_str).unwrap_or_default();
            match document.users_player.get(user) {
                Some(account) => payload_of(json!({ "data": account })),
                None => (DbResponse::fail(ReasonCode::UserNotFound), false),
            }
        }
        _ => unknown(),
    }
}

#[derive(Deserialize)]
struct UploadData {
    game_id: String,
    metadata: GameUploadMetadata,
    #[serde(default)]
    version_info: Option<VersionEntry>,
}

#[derive(Deserialize)]
struct GameUploadMetadata {
    author: String,
    name: String,
    description: String,
    #[serde(rename = "type")]
    type_label: String,
    min_players: u32,
    max_players: u32,
}

fn games(document: &mut Document, action: &str, data: Value) -> (DbResponse, bool) {
    match action {
        "upload" => {
            let Ok(upload) = serde_json::from_value::<UploadData>(data) else {
                return unknown();
            };
            let entry = document
                .games
                .entry(upload.game_id.clone())
                .or_insert_with(|| Game {
                    game_id: upload.game_id.clone(),
                    author: upload.metadata.author.clone(),
                    name: upload.metadata.name.clone(),
                    description: upload.metadata.description.clone(),
                    type_label: upload.metadata.type_label.clone(),
                    min_players: upload.metadata.min_players,
                    max_players: upload.metadata.max_players,
                    latest_version: String::new(),
                    versions: Vec::new(),
                    rating_sum: 0,
                    rating_count: 0,
                    is_active: true,
                });

            entry.author = upload.metadata.author;
            entry.name = upload.metadata.name;
            entry.description = upload.metadata.description;
            entry.type_label = upload.metadata.type_label;
            entry.min_players = upload.metadata.min_players;
            entry.max_players = upload.metadata.max_players;
            entry.is_active = true;

            if let Some(version_info) = upload.version_info {
                entry.latest_version = version_info.version.clone();
                entry.versions.push(version_info);
            }

            (DbResponse::ok_empty(), true)
        }
        "list" => {
            let include_inactive = data
                .get("include_inactive")
                .and_then(Value::as_bool)
                .unwrap_or(false);
            let games: Vec<&Game> = document
                .games
                .values()
                .filter(|g| include_inactive || g.is_active)
                .collect();
            payload_of(json!({ "games": games }))
        }
        "set_active" => {
            let game_id = data.get("game_id").and_then(Value::as_str).unwrap_or_default();
            let is_active = data.get("is_active").and_then(Value::as_bool).unwrap_or(false);
            match document.games.get_mut(game_id) {
                Some(game) => {
                    game.is_active = is_active;
                    (DbResponse::ok_empty(), true)
                }
                None => (DbResponse::fail(ReasonCode::GameNotFound), false),
            }
        }
        "get" => {
            let game_id = data.get("game_id").and_then(Value::as_str).unwrap_or_default();
            match document.games.get(game_id) {
                Some(game) => payload_of(json!({ "data": game })),
                None => (DbResponse::fail(ReasonCode::GameNotFound), false),
            }
        }
        _ => unknown(),
    }
}

#[derive(Deserialize)]
struct ReviewSubmission {
    game_id: String,
    user: String,
    rating: i64,
    comment: String,
}

fn reviews(document: &mut Document, action: &str, data: Value) -> (DbResponse, bool) {
    match action {
        "submit" => {
            let Ok(submission) = serde_json::from_value::<ReviewSubmission>(data) else {
                return unknown();
            };

            let played = document
                .users_player
                .get(&submission.user)
                .map(|account| account.play_history.contains(&submission.game_id))
                .unwrap_or(false);
            if !played {
                return (DbResponse::fail(ReasonCode::MustPlayFirst), false);
            }

            let timestamp = chrono::Utc::now().timestamp();

            if let Some(existing) = document.find_review_mut(&submission.game_id, &submission.user)
            {
                let old_rating = existing.rating;
                existing.rating = submission.rating;
                existing.comment = submission.comment;
                existing.timestamp = timestamp;

                if let Some(game) = document.games.get_mut(&submission.game_id) {
                    game.rating_sum += submission.rating - old_rating;
                }
                return (DbResponse::ok_empty(), true);
            }

            let id = document.next_id("review");
            document.reviews.insert(
                id,
                Review {
                    id,
                    game_id: submission.game_id.clone(),
                    user: submission.user,
                    rating: submission.rating,
                    comment: submission.comment,
                    timestamp,
                },
            );

            if let Some(game) = document.games.get_mut(&submission.game_id) {
                game.rating_sum += submission.rating;
                game.rating_count += 1;
            }

            (DbResponse::ok_empty(), true)
        }
        "list" => {
            let game_id = data.get("game_id").and_then(Value::as_str).unwrap_or_default();
            let reviews: Vec<&Review> = document
                .reviews
                .values()
                .filter(|r| r.game_id == game_id)
                .collect();
            payload_of(json!({ "reviews": reviews }))
        }
        _ => unknown(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::DbRequest;
    use tempfile::tempdir;

    async fn store() -> Store {
        let dir = tempdir().unwrap();
        Store::load(dir.path().join("db.json"))
    }

    #[tokio::test]
    async fn register_then_duplicate_register_is_account_exists() {
        let store = store().await;
        let req = DbRequest::new(
            Collection::UsersDev,
            "register",
            json!({"user": "alice", "password": "p"}),
        );
        let resp = dispatch(&store, req.clone()).await;
        assert!(resp.ok);

        let resp = dispatch(&store, req).await;
        assert!(!resp.ok);
        assert_eq!(resp.reason, Some(ReasonCode::AccountExists));
    }

    #[tokio::test]
    async fn auth_rejects_wrong_password() {
        let store = store().await;
        dispatch(
            &store,
            DbRequest::new(
                Collection::UsersPlayer,
                "register",
                json!({"user": "bob", "password": "p"}),
            ),
        )
        .await;

        let resp = dispatch(
            &store,
            DbRequest::new(
                Collection::UsersPlayer,
                "auth",
                json!({"user": "bob", "password": "wrong"}),
            ),
        )
        .await;
        assert_eq!(resp.reason, Some(ReasonCode::WrongPassword));
    }

    #[tokio::test]
    async fn upload_creates_then_republishes_existing_game() {
        let store = store().await;
        let upload = |version: &str| {
            json!({
                "game_id": "demo",
                "metadata": {
                    "author": "alice",
                    "name": "Demo",
                    "description": "d",
                    "type": "CLI",
                    "min_players": 1,
                    "max_players": 2,
                },
                "version_info": {"version": version, "file_path": "x.zip", "timestamp": 1},
            })
        };
        dispatch(&store, DbRequest::new(Collection::Games, "upload", upload("1.0"))).await;
        dispatch(
            &store,
            DbRequest::new(Collection::Games, "set_active", json!({"game_id": "demo", "is_active": false})),
        )
        .await;
        dispatch(&store, DbRequest::new(Collection::Games, "upload", upload("1.1"))).await;

        let doc = store.lock().await;
        let game = doc.games.get("demo").unwrap();
        assert_eq!(game.latest_version, "1.1");
        assert_eq!(game.versions.len(), 2);
        assert!(game.is_active);
    }

    #[tokio::test]
    async fn review_requires_play_history() {
        let store = store().await;
        dispatch(
            &store,
            DbRequest::new(
                Collection::UsersPlayer,
                "register",
                json!({"user": "carol", "password": "p"}),
            ),
        )
        .await;

        let resp = dispatch(
            &store,
            DbRequest::new(
                Collection::Reviews,
                "submit",
                json!({"game_id": "demo", "user": "carol", "rating": 5, "comment": "good"}),
            ),
        )
        .await;
        assert_eq!(resp.reason, Some(ReasonCode::MustPlayFirst));
    }

    #[tokio::test]
    async fn resubmitted_review_adjusts_sum_without_changing_count() {
        let store = store().await;
        dispatch(
            &store,
            DbRequest::new(
                Collection::UsersPlayer,
                "register",
                json!({"user": "carol", "password": "p"}),
            ),
        )
        .await;
        dispatch(
            &store,
            DbRequest::new(
                Collection::UsersPlayer,
                "record_play",
                json!({"user": "carol", "game_id": "demo"}),
            ),
        )
        .await;
        dispatch(
            &store,
            DbRequest::new(
                Collection::Games,
                "upload",
                json!({
                    "game_id": "demo",
                    "metadata": {
                        "author": "alice", "name": "Demo", "description": "d",
                        "type": "CLI", "min_players": 1, "max_players": 2,
                    },
                }),
            ),
        )
        .await;

        dispatch(
            &store,
            DbRequest::new(
                Collection::Reviews,
                "submit",
                json!({"game_id": "demo", "user": "carol", "rating": 5, "comment": "good"}),
            ),
        )
        .await;
        dispatch(
            &store,
            DbRequest::new(
                Collection::Reviews,
                "submit",
                json!({"game_id": "demo", "user": "carol", "rating": 3, "comment": "meh"}),
            ),
        )
        .await;

        let doc = store.lock().await;
        let game = doc.games.get("demo").unwrap();
        assert_eq!(game.rating_count, 1);
        assert_eq!(game.rating_sum, 3);
    }
}
