use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, TestApp, ADMIN_PASSWORD};

#[tokio::test]
async fn announcements_are_publicly_listed_newest_first() {
    let app = TestApp::new().await;

    for content in ["first", "second"] {
        let response = app
            .post_json_auth(
                "/api/announcements",
                json!({"content": content}),
                ADMIN_PASSWORD,
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.get("/api/announcements").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let contents: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["content"].as_str())
        .collect();
    assert_eq!(contents, vec!["second", "first"]);
}

#[tokio::test]
async fn announcement_creation_requires_admin() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/api/announcements", json!({"content": "hello"}))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
