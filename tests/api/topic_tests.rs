use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, TestApp, ADMIN_PASSWORD};

#[tokio::test]
async fn topics_listing_is_public_and_includes_global() {
    let app = TestApp::new().await;

    let response = app.get("/api/topics").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let slugs: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["slug"].as_str())
        .collect();
    assert!(slugs.contains(&"global"));
}

#[tokio::test]
async fn topic_creation_requires_admin_token() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/topics", json!({"name": "Random"}))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .post_json_auth("/api/topics", json!({"name": "Random"}), "not-the-password")
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_creates_topic_with_slug() {
    let app = TestApp::new().await;

    let response = app
        .post_json_auth(
            "/api/topics",
            json!({"name": "Night Owls", "backgroundColor": "#101020"}),
            ADMIN_PASSWORD,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Night Owls");
    assert_eq!(body["slug"], "night-owls");
    assert_eq!(body["backgroundColor"], "#101020");
}

#[tokio::test]
async fn duplicate_topic_slug_conflicts() {
    let app = TestApp::new().await;
    app.create_topic("Random", "random").await;

    let response = app
        .post_json_auth("/api/topics", json!({"name": "Random"}), ADMIN_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn admin_updates_topic_partially() {
    let app = TestApp::new().await;
    let topic = app.create_topic("Random", "random").await;

    let response = app
        .patch_json_auth(
            &format!("/api/topics/{}", topic.id),
            json!({"textColor": "#eeeeee"}),
            ADMIN_PASSWORD,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["name"], "Random");
    assert_eq!(body["textColor"], "#eeeeee");
}

#[tokio::test]
async fn global_topic_cannot_be_deleted() {
    let app = TestApp::new().await;
    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();

    let response = app
        .delete_auth(&format!("/api/topics/{}", global.id), ADMIN_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn topic_delete_cascades_messages() {
    let app = TestApp::new().await;
    let user = app.create_user("alice", "wonderland", 4821).await;
    let topic = app.create_topic("Random", "random").await;
    app.store
        .messages
        .create(&burrow_chat::domain::NewMessage {
            content: "doomed".into(),
            sender_id: user.id,
            sender_handle: user.handle,
            topic_id: topic.id,
        })
        .await
        .unwrap();

    let response = app
        .delete_auth(&format!("/api/topics/{}", topic.id), ADMIN_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let leftover = app.store.messages.recent(topic.id, 50).await.unwrap();
    assert!(leftover.is_empty());
}
