//! Application Startup
//!
//! Application building, startup seeding and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;

use crate::application::services::{
    AnnouncementService, AuthService, TopicService, UserService,
};
use crate::config::Settings;
use crate::domain::{NewTopic, Role, GLOBAL_SLUG};
use crate::infrastructure::{database, Store};
use crate::presentation::http::routes;
use crate::presentation::websocket::ChatGateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub gateway: Arc<ChatGateway>,
    pub settings: Arc<Settings>,
    pub auth: AuthService,
    pub users: UserService,
    pub topics: TopicService,
    pub announcements: AnnouncementService,
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        let store = database::connect(&settings.database).await?;
        tracing::info!(engine = %settings.database.engine, "Storage connected");

        seed(&store, &settings).await?;

        let gateway = Arc::new(ChatGateway::new(&store, settings.websocket.history_limit));

        let state = AppState {
            auth: AuthService::new(store.users.clone(), store.bans.clone()),
            users: UserService::new(store.users.clone()),
            topics: TopicService::new(store.topics.clone()),
            announcements: AnnouncementService::new(store.announcements.clone()),
            store,
            gateway,
            settings: Arc::new(settings.clone()),
        };

        let router = routes::create_router(state);

        let addr: SocketAddr = settings.server_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// Ensure the seed admin account and the global topic exist.
pub async fn seed(store: &Store, settings: &Settings) -> Result<()> {
    let username = settings.admin.username.trim().to_lowercase();
    if store.users.find_by_username(&username).await?.is_none() {
        let users = UserService::new(store.users.clone());
        let admin = users
            .create_user(&username, &settings.admin.password, Role::Admin)
            .await?;
        tracing::info!(user_id = admin.id, username = %admin.username, "Seed admin created");
    }

    if store.topics.find_by_slug(GLOBAL_SLUG).await?.is_none() {
        let topic = store
            .topics
            .create(&NewTopic {
                name: "Global".to_string(),
                slug: GLOBAL_SLUG.to_string(),
                description: Some("The default room everyone lands in".to_string()),
                background_color: None,
                text_color: None,
                accent_color: None,
                username_color: None,
                animation: None,
                creator_id: None,
            })
            .await?;
        tracing::info!(topic_id = topic.id, "Global topic created");
    }

    Ok(())
}
