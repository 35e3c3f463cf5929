use axum::http::StatusCode;
use serde_json::json;

use crate::common::{body_json, TestApp, ADMIN_PASSWORD};

#[tokio::test]
async fn user_listing_requires_admin() {
    let app = TestApp::new().await;

    let response = app.get("/api/admin/users").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.get_auth("/api/admin/users", "wrong").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.get_auth("/api/admin/users", ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admin_creates_and_deletes_user() {
    let app = TestApp::new().await;

    let response = app
        .post_json_auth(
            "/api/admin/users",
            json!({"username": "dave", "password": "secret1"}),
            ADMIN_PASSWORD,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let id = body["id"].as_i64().unwrap();

    let response = app
        .delete_auth(&format!("/api/admin/users/{}", id), ADMIN_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn admin_accounts_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app
        .store
        .users
        .find_by_username("admin")
        .await
        .unwrap()
        .unwrap();

    let response = app
        .delete_auth(&format!("/api/admin/users/{}", admin.id), ADMIN_PASSWORD)
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn user_responses_never_leak_password_digests() {
    let app = TestApp::new().await;
    app.create_user("alice", "wonderland", 4821).await;

    let response = app.get_auth("/api/admin/users", ADMIN_PASSWORD).await;
    let body = body_json(response).await;
    for user in body.as_array().unwrap() {
        assert!(user.get("passwordDigest").is_none());
        assert!(user.get("password_digest").is_none());
    }
}
