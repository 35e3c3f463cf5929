//! Common Test Utilities
//!
//! A test application over an in-memory SQLite store, plus channel-backed
//! fake connections for driving the chat gateway without real sockets.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, Response},
    Router,
};
use tokio::sync::{mpsc, Notify};
use tokio::time::timeout;
use tower::ServiceExt;

use burrow_chat::application::services::{
    digest, AnnouncementService, AuthService, TopicService, UserService,
};
use burrow_chat::config::{
    AdminSettings, CorsSettings, DatabaseSettings, ServerSettings, Settings, WebSocketSettings,
};
use burrow_chat::domain::{NewTopic, NewUser, Role, Topic, User};
use burrow_chat::infrastructure::{database, Store};
use burrow_chat::presentation::http::create_router;
use burrow_chat::presentation::websocket::{ChatGateway, ServerEvent};
use burrow_chat::startup::{seed, AppState};

pub const ADMIN_PASSWORD: &str = "admin123";

pub fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseSettings {
            engine: "sqlite".into(),
            url: "sqlite::memory:".into(),
            max_connections: 1,
            min_connections: 1,
            acquire_timeout: 5,
        },
        admin: AdminSettings {
            username: "admin".into(),
            password: ADMIN_PASSWORD.into(),
        },
        cors: CorsSettings {
            allowed_origins: Vec::new(),
        },
        websocket: WebSocketSettings {
            join_timeout_secs: 5,
            history_limit: 50,
        },
        environment: "test".into(),
    }
}

/// Test application with direct access to the store and gateway.
pub struct TestApp {
    pub router: Router,
    pub store: Store,
    pub gateway: Arc<ChatGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        let settings = test_settings();
        let store = database::connect_in_memory()
            .await
            .expect("in-memory store");
        seed(&store, &settings).await.expect("seed");

        let gateway = Arc::new(ChatGateway::new(&store, settings.websocket.history_limit));
        let state = AppState {
            auth: AuthService::new(store.users.clone(), store.bans.clone()),
            users: UserService::new(store.users.clone()),
            topics: TopicService::new(store.topics.clone()),
            announcements: AnnouncementService::new(store.announcements.clone()),
            store: store.clone(),
            gateway: gateway.clone(),
            settings: Arc::new(settings),
        };
        let router = create_router(state);

        Self {
            router,
            store,
            gateway,
        }
    }

    /// Insert a user with a fixed handle, bypassing random assignment.
    pub async fn create_user(&self, username: &str, password: &str, handle: i64) -> User {
        self.store
            .users
            .create(&NewUser {
                username: username.to_string(),
                password_digest: digest(password),
                role: Role::User,
                handle,
            })
            .await
            .expect("create user")
    }

    /// Insert a topic directly.
    pub async fn create_topic(&self, name: &str, slug: &str) -> Topic {
        self.store
            .topics
            .create(&NewTopic {
                name: name.to_string(),
                slug: slug.to_string(),
                description: None,
                background_color: None,
                text_color: None,
                accent_color: None,
                username_color: None,
                animation: None,
                creator_id: None,
            })
            .await
            .expect("create topic")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn get_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value) -> Response<Body> {
        self.request_json("POST", uri, body, None).await
    }

    pub async fn post_json_auth(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> Response<Body> {
        self.request_json("POST", uri, body, Some(token)).await
    }

    pub async fn patch_json_auth(
        &self,
        uri: &str,
        body: serde_json::Value,
        token: &str,
    ) -> Response<Body> {
        self.request_json("PATCH", uri, body, Some(token)).await
    }

    pub async fn delete_auth(&self, uri: &str, token: &str) -> Response<Body> {
        self.router
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(uri)
                    .header("Authorization", format!("Bearer {}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn request_json(
        &self,
        method: &str,
        uri: &str,
        body: serde_json::Value,
        token: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        self.router
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap()
    }
}

/// Deserialize a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A channel-backed stand-in for one WebSocket connection.
pub struct FakeClient {
    pub conn_id: String,
    rx: mpsc::UnboundedReceiver<ServerEvent>,
    kick: Arc<Notify>,
}

impl FakeClient {
    /// Run the join handshake. The client is returned either way so failed
    /// joins can assert on the terminal error event.
    pub async fn connect(
        gateway: &ChatGateway,
        user_id: i64,
        password: &str,
    ) -> (bool, FakeClient) {
        let (tx, rx) = mpsc::unbounded_channel();
        let kick = Arc::new(Notify::new());
        let conn_id = uuid::Uuid::new_v4().to_string();

        let joined = gateway
            .join(&conn_id, user_id, password, tx, kick.clone())
            .await;
        (joined, FakeClient { conn_id, rx, kick })
    }

    /// Join and consume the initial history replay.
    pub async fn join(gateway: &ChatGateway, user_id: i64, password: &str) -> FakeClient {
        let (joined, mut client) = Self::connect(gateway, user_id, password).await;
        assert!(joined, "join should succeed");
        client
            .recv_until(|e| matches!(e, ServerEvent::MessageHistory(_)))
            .await;
        client
    }

    pub async fn recv(&mut self) -> ServerEvent {
        timeout(Duration::from_secs(1), self.rx.recv())
            .await
            .expect("timed out waiting for event")
            .expect("event channel closed")
    }

    /// Receive events until one matches, discarding the rest.
    pub async fn recv_until<F>(&mut self, pred: F) -> ServerEvent
    where
        F: Fn(&ServerEvent) -> bool,
    {
        loop {
            let event = self.recv().await;
            if pred(&event) {
                return event;
            }
        }
    }

    /// Assert no event of interest is pending.
    pub fn drain(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }

    /// True when the connection was told to close by the server.
    pub async fn was_kicked(&self) -> bool {
        timeout(Duration::from_millis(200), self.kick.notified())
            .await
            .is_ok()
    }
}
