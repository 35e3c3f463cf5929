use pretty_assertions::assert_eq;
use serde_json::json;

use burrow_chat::application::services::{AuthService, Claim, Verdict};
use burrow_chat::presentation::websocket::ServerEvent;

use crate::common::{FakeClient, TestApp, ADMIN_PASSWORD};

async fn admin_conn(app: &TestApp) -> FakeClient {
    let admin = app
        .store
        .users
        .find_by_username("admin")
        .await
        .unwrap()
        .unwrap();
    FakeClient::join(&app.gateway, admin.id, ADMIN_PASSWORD).await
}

#[tokio::test]
async fn ban_terminates_every_connection_of_the_target() {
    let app = TestApp::new().await;
    let bob = app.create_user("bob", "builder", 9001).await;

    let mut admin = admin_conn(&app).await;
    let mut bob_one = FakeClient::join(&app.gateway, bob.id, "builder").await;
    let mut bob_two = FakeClient::join(&app.gateway, bob.id, "builder").await;
    admin.drain();
    bob_one.drain();
    bob_two.drain();

    app.gateway.ban_user(&admin.conn_id, 9001, None).await;

    // Both of bob's connections get a terminal error and the kick signal.
    for conn in [&mut bob_one, &mut bob_two] {
        let error = conn
            .recv_until(|e| matches!(e, ServerEvent::Error(_)))
            .await;
        assert_eq!(error, ServerEvent::Error("You have been banned.".into()));
        assert!(conn.was_kicked().await);
    }

    // The topic group saw the notice, and the count dropped to the admin.
    let notice = admin
        .recv_until(|e| matches!(e, ServerEvent::SystemMessage { .. }))
        .await;
    assert_eq!(
        notice,
        ServerEvent::SystemMessage {
            content: "User #9001 has been banned.".into()
        }
    );
    let count = admin
        .recv_until(|e| matches!(e, ServerEvent::UserCount(_)))
        .await;
    assert_eq!(count, ServerEvent::UserCount(1));

    assert!(!app.gateway.is_connected(&bob_one.conn_id));
    assert!(!app.gateway.is_connected(&bob_two.conn_id));

    // Subsequent login is refused with the suspension verdict.
    let auth = AuthService::new(app.store.users.clone(), app.store.bans.clone());
    let verdict = auth
        .verify(Claim::Username("bob".into()), "builder")
        .await
        .unwrap();
    assert!(matches!(verdict, Verdict::Banned));
}

#[tokio::test]
async fn repeat_ban_is_a_noop() {
    let app = TestApp::new().await;
    let bob = app.create_user("bob", "builder", 9001).await;
    let admin = admin_conn(&app).await;

    app.gateway.ban_user(&admin.conn_id, 9001, None).await;
    app.gateway.ban_user(&admin.conn_id, 9001, Some("again")).await;

    assert!(app.store.bans.is_banned(bob.id).await.unwrap());
}

#[tokio::test]
async fn ban_of_unknown_handle_is_ignored() {
    let app = TestApp::new().await;
    let mut admin = admin_conn(&app).await;
    admin.drain();

    app.gateway.ban_user(&admin.conn_id, 7777, None).await;

    assert!(admin.drain().is_empty());
}

#[tokio::test]
async fn non_admins_cannot_ban() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let bob = app.create_user("bob", "builder", 9001).await;

    let alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    let mut bob_conn = FakeClient::join(&app.gateway, bob.id, "builder").await;
    bob_conn.drain();

    app.gateway.ban_user(&alice_conn.conn_id, 9001, None).await;

    assert!(bob_conn.drain().is_empty());
    assert!(!app.store.bans.is_banned(bob.id).await.unwrap());
    assert!(app.gateway.is_connected(&bob_conn.conn_id));
}

#[tokio::test]
async fn banned_user_cannot_rejoin() {
    let app = TestApp::new().await;
    let bob = app.create_user("bob", "builder", 9001).await;
    let admin = admin_conn(&app).await;

    app.gateway.ban_user(&admin.conn_id, 9001, None).await;

    let (joined, mut conn) = FakeClient::connect(&app.gateway, bob.id, "builder").await;
    assert!(!joined);
    assert_eq!(
        conn.recv().await,
        ServerEvent::Error("Your account has been suspended".into())
    );
}

#[tokio::test]
async fn clear_topic_notifies_only_that_group() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let random = app.create_topic("Random", "random").await;

    let mut admin = admin_conn(&app).await;
    let mut alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    app.gateway.switch_topic(&alice_conn.conn_id, random.id).await;
    alice_conn
        .recv_until(|e| matches!(e, ServerEvent::MessageHistory(_)))
        .await;

    app.gateway
        .send_message(&admin.conn_id, "global stays", json!(1), None)
        .await;
    admin.drain();
    alice_conn.drain();

    // Clearing an empty topic is not an error.
    app.gateway.clear_topic(&admin.conn_id, random.id).await;

    assert_eq!(
        alice_conn.recv().await,
        ServerEvent::MessageHistory(Vec::new())
    );
    assert_eq!(
        alice_conn.recv().await,
        ServerEvent::SystemMessage {
            content: "Chat cleared by admin.".into()
        }
    );
    // The admin sits in the global topic and hears nothing.
    assert!(admin.drain().is_empty());

    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();
    let global_history = app.store.messages.recent(global.id, 50).await.unwrap();
    assert_eq!(global_history.len(), 1);
    assert_eq!(global_history[0].content, "global stays");
}

#[tokio::test]
async fn clear_requires_admin() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();

    let mut alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    app.gateway
        .send_message(&alice_conn.conn_id, "keep me", json!(1), None)
        .await;
    alice_conn.drain();

    app.gateway.clear_topic(&alice_conn.conn_id, global.id).await;

    assert!(alice_conn.drain().is_empty());
    assert_eq!(app.store.messages.recent(global.id, 50).await.unwrap().len(), 1);
}
