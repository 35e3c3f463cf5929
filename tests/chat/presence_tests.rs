use burrow_chat::presentation::websocket::ServerEvent;

use crate::common::{FakeClient, TestApp};

#[tokio::test]
async fn join_replays_history_then_broadcasts_count() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;

    let (joined, mut conn) = FakeClient::connect(&app.gateway, alice.id, "wonderland").await;
    assert!(joined);

    assert!(matches!(conn.recv().await, ServerEvent::MessageHistory(_)));
    assert_eq!(conn.recv().await, ServerEvent::UserCount(1));
}

#[tokio::test]
async fn join_with_wrong_password_is_refused() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;

    let (joined, mut conn) = FakeClient::connect(&app.gateway, alice.id, "nope").await;
    assert!(!joined);
    assert_eq!(
        conn.recv().await,
        ServerEvent::Error("Invalid credentials".into())
    );
    assert_eq!(app.gateway.online_count(), 0);
}

#[tokio::test]
async fn count_tracks_connections_across_disconnects() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let bob = app.create_user("bob", "builder", 9001).await;

    let mut alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    let bob_conn = FakeClient::join(&app.gateway, bob.id, "builder").await;
    let bob_again = FakeClient::join(&app.gateway, bob.id, "builder").await;
    assert_eq!(app.gateway.online_count(), 3);
    alice_conn.drain();

    app.gateway.disconnect(&bob_conn.conn_id).await;
    let count = alice_conn
        .recv_until(|e| matches!(e, ServerEvent::UserCount(2)))
        .await;
    assert_eq!(count, ServerEvent::UserCount(2));

    app.gateway.disconnect(&bob_again.conn_id).await;
    assert_eq!(app.gateway.online_count(), 1);
}

#[tokio::test]
async fn switching_topics_is_exclusive() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let random = app.create_topic("Random", "random").await;
    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();

    let mut conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    assert_eq!(app.gateway.room_of(&conn.conn_id), Some(global.id));

    app.gateway.switch_topic(&conn.conn_id, random.id).await;
    assert!(matches!(
        conn.recv_until(|e| matches!(e, ServerEvent::MessageHistory(_)))
            .await,
        ServerEvent::MessageHistory(_)
    ));
    assert_eq!(app.gateway.room_of(&conn.conn_id), Some(random.id));
}

#[tokio::test]
async fn switching_to_unknown_topic_is_ignored() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();

    let mut conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    conn.drain();

    app.gateway.switch_topic(&conn.conn_id, 999).await;

    assert!(conn.drain().is_empty());
    assert_eq!(app.gateway.room_of(&conn.conn_id), Some(global.id));
}

#[tokio::test]
async fn events_from_unregistered_connections_are_ignored() {
    let app = TestApp::new().await;
    app.create_user("alice", "wonderland", 4821).await;

    // No panic, no effect.
    app.gateway
        .send_message("ghost", "boo", serde_json::json!(1), None)
        .await;
    app.gateway.typing("ghost", None);
    app.gateway.disconnect("ghost").await;
    assert_eq!(app.gateway.online_count(), 0);
}
