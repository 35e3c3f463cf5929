use serde_json::json;

use burrow_chat::presentation::websocket::ServerEvent;

use crate::common::{FakeClient, TestApp};

#[tokio::test]
async fn sender_gets_ack_and_peers_get_broadcast() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let bob = app.create_user("bob", "builder", 9001).await;
    app.create_topic("Random", "random").await;
    let carol = app.create_user("carol", "gardens", 3344).await;
    let random = app.store.topics.find_by_slug("random").await.unwrap().unwrap();

    let mut alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    let mut bob_conn = FakeClient::join(&app.gateway, bob.id, "builder").await;
    let mut carol_conn = FakeClient::join(&app.gateway, carol.id, "gardens").await;
    app.gateway.switch_topic(&carol_conn.conn_id, random.id).await;
    carol_conn
        .recv_until(|e| matches!(e, ServerEvent::MessageHistory(_)))
        .await;
    carol_conn.drain();
    alice_conn.drain();
    bob_conn.drain();

    app.gateway
        .send_message(&alice_conn.conn_id, "hello", json!("draft-1"), None)
        .await;

    // Sender: ack with the correlation token, no receiveMessage.
    let ack = alice_conn.recv().await;
    match ack {
        ServerEvent::MessageAck { temp_id, message } => {
            assert_eq!(temp_id, json!("draft-1"));
            assert_eq!(message.content, "hello");
            assert_eq!(message.sender_handle, 4821);
        }
        other => panic!("expected ack, got {:?}", other),
    }
    assert!(alice_conn
        .drain()
        .iter()
        .all(|e| !matches!(e, ServerEvent::ReceiveMessage(_))));

    // Topic peer: exactly one receiveMessage.
    match bob_conn.recv().await {
        ServerEvent::ReceiveMessage(record) => {
            assert_eq!(record.content, "hello");
            assert_eq!(record.sender_handle, 4821);
        }
        other => panic!("expected broadcast, got {:?}", other),
    }

    // Other topic: nothing.
    assert!(carol_conn.drain().is_empty());
}

#[tokio::test]
async fn empty_messages_are_dropped_without_ack() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let mut conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    conn.drain();

    app.gateway
        .send_message(&conn.conn_id, "   ", json!(1), None)
        .await;

    assert!(conn.drain().is_empty());
}

#[tokio::test]
async fn history_replays_most_recent_oldest_first() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;

    let mut conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    for i in 0..60 {
        app.gateway
            .send_message(&conn.conn_id, &format!("msg {}", i), json!(i), None)
            .await;
    }
    let (_, mut reconnect) = FakeClient::connect(&app.gateway, alice.id, "wonderland").await;
    let history = reconnect
        .recv_until(|e| matches!(e, ServerEvent::MessageHistory(_)))
        .await;
    match history {
        ServerEvent::MessageHistory(records) => {
            assert_eq!(records.len(), 50);
            assert_eq!(records.first().unwrap().content, "msg 10");
            assert_eq!(records.last().unwrap().content, "msg 59");
            assert!(records.windows(2).all(|w| w[0].id < w[1].id));
        }
        other => panic!("expected history, got {:?}", other),
    }
}

#[tokio::test]
async fn sender_can_delete_own_message_and_group_is_notified() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let bob = app.create_user("bob", "builder", 9001).await;
    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();

    let mut alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    let mut bob_conn = FakeClient::join(&app.gateway, bob.id, "builder").await;
    alice_conn.drain();

    app.gateway
        .send_message(&alice_conn.conn_id, "oops", json!(1), None)
        .await;
    let message_id = match alice_conn
        .recv_until(|e| matches!(e, ServerEvent::MessageAck { .. }))
        .await
    {
        ServerEvent::MessageAck { message, .. } => message.id,
        _ => unreachable!(),
    };
    bob_conn.drain();

    app.gateway
        .delete_message(&alice_conn.conn_id, message_id, global.id)
        .await;

    assert_eq!(
        bob_conn.recv().await,
        ServerEvent::MessageDeleted { message_id }
    );
    // The requester's group includes the requester.
    assert_eq!(
        alice_conn.recv().await,
        ServerEvent::MessageDeleted { message_id }
    );
    assert!(app
        .store
        .messages
        .find_by_id(message_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn peers_cannot_delete_each_others_messages() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let bob = app.create_user("bob", "builder", 9001).await;
    let global = app.store.topics.find_by_slug("global").await.unwrap().unwrap();

    let mut alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    let mut bob_conn = FakeClient::join(&app.gateway, bob.id, "builder").await;

    app.gateway
        .send_message(&alice_conn.conn_id, "mine", json!(1), None)
        .await;
    let message_id = match alice_conn
        .recv_until(|e| matches!(e, ServerEvent::MessageAck { .. }))
        .await
    {
        ServerEvent::MessageAck { message, .. } => message.id,
        _ => unreachable!(),
    };
    bob_conn.drain();

    app.gateway
        .delete_message(&bob_conn.conn_id, message_id, global.id)
        .await;

    assert!(bob_conn.drain().is_empty());
    assert!(app
        .store
        .messages
        .find_by_id(message_id)
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn typing_pulse_reaches_topic_peers_only() {
    let app = TestApp::new().await;
    let alice = app.create_user("alice", "wonderland", 4821).await;
    let bob = app.create_user("bob", "builder", 9001).await;

    let alice_conn = FakeClient::join(&app.gateway, alice.id, "wonderland").await;
    let mut bob_conn = FakeClient::join(&app.gateway, bob.id, "builder").await;
    bob_conn.drain();

    app.gateway.typing(&alice_conn.conn_id, None);
    assert_eq!(
        bob_conn.recv().await,
        ServerEvent::UserTyping {
            connection_id: alice_conn.conn_id.clone()
        }
    );

    app.gateway.stop_typing(&alice_conn.conn_id, None);
    assert_eq!(
        bob_conn.recv().await,
        ServerEvent::UserStopTyping {
            connection_id: alice_conn.conn_id.clone()
        }
    );
}
