//! Concurrency properties from spec §5/§8: DB mutations are globally
//! serialized, and the rating invariant holds under concurrent writers.


use serde_json::json;
use test_helpers::{FrameClient, Harness};

#[tokio::test]
async fn concurrent_registrations_all_succeed_without_lost_updates() {
    let harness = Harness::start().await;

    let mut handles = Vec::new();
    for i in 0..20 {
        let db_port = harness.db_port;
        handles.push(tokio::spawn(async move {
            let mut client = FrameClient::connect(db_port).await;
            client
                .send(json!({"collection": "Users_Player", "action": "register", "data": {"user": format!("player{i}"), "password": "p"}}))
                .await
        }));
    }

    for handle in handles {
        let resp = handle.await.unwrap();
        assert_eq!(resp["ok"], true);
    }

    let mut client = FrameClient::connect(harness.db_port).await;
    for i in 0..20 {
        let resp = client
            .send(json!({"collection": "Users_Player", "action": "get", "data": {"user": format!("player{i}")}}))
            .await;
        assert_eq!(resp["ok"], true, "player{i} should have been persisted");
    }
}

#[tokio::test]
async fn concurrent_review_submissions_keep_rating_sum_consistent() {
    let harness = Harness::start().await;
    let mut setup = FrameClient::connect(harness.db_port).await;

    setup
        .send(json!({
            "collection": "Games", "action": "upload",
            "data": {"game_id": "demo", "metadata": {"author": "alice", "name": "Demo", "description": "d", "type": "CLI", "min_players": 1, "max_players": 99}},
        }))
        .await;

    let reviewers: Vec<String> = (0..15).map(|i| format!("reviewer{i}")).collect();
    for user in &reviewers {
        setup
            .send(json!({"collection": "Users_Player", "action": "register", "data": {"user": user, "password": "p"}}))
            .await;
        setup
            .send(json!({"collection": "Users_Player", "action": "record_play", "data": {"user": user, "game_id": "demo"}}))
            .await;
    }

    let mut handles = Vec::new();
    for (i, user) in reviewers.iter().cloned().enumerate() {
        let db_port = harness.db_port;
        let rating = (i % 5) as i64 + 1;
        handles.push(tokio::spawn(async move {
            let mut client = FrameClient::connect(db_port).await;
            client
                .send(json!({"collection": "Reviews", "action": "submit", "data": {"game_id": "demo", "user": user, "rating": rating, "comment": "c"}}))
                .await
        }));
    }
    for handle in handles {
        let resp = handle.await.unwrap();
        assert_eq!(resp["ok"], true);
    }

    let resp = setup
        .send(json!({"collection": "Games", "action": "get", "data": {"game_id": "demo"}}))
        .await;
    let game = &resp["data"];
    let rating_count = game["rating_count"].as_i64().unwrap();
    let rating_sum = game["rating_sum"].as_i64().unwrap();
    assert_eq!(rating_count, reviewers.len() as i64);

    let expected_sum: i64 = (0..reviewers.len()).map(|i| (i % 5) as i64 + 1).sum();
    assert_eq!(rating_sum, expected_sum);

    // Invariant from spec §8: average_rating * rating_count == rating_sum.
    let average = rating_sum as f64 / rating_count as f64;
    assert!((average * rating_count as f64 - rating_sum as f64).abs() < 1e-9);
}

#[tokio::test]
async fn db_file_is_always_valid_json_after_concurrent_writes() {
    let harness = Harness::start().await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let db_port = harness.db_port;
        handles.push(tokio::spawn(async move {
            let mut client = FrameClient::connect(db_port).await;
            client
                .send(json!({
                    "collection": "Games", "action": "upload",
                    "data": {"game_id": format!("game{i}"), "metadata": {"author": "alice", "name": "G", "description": "d", "type": "CLI", "min_players": 1, "max_players": 2}},
                }))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let contents = tokio::fs::read_to_string(&harness.db_file).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents)
        .expect("db file must always be valid JSON, never partially written");
    assert!(parsed.get("Games").is_some());
}
