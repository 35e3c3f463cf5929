//! Route Configuration
//!
//! Configures all HTTP routes and the WebSocket endpoint.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::presentation::middleware::{admin_guard, create_cors_layer};
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes(state.clone()))
        .route("/ws", get(ws_handler))
        .route("/health", get(handlers::health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer(&state.settings.cors))
        .with_state(state)
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/register", post(handlers::auth::register))
        // Topic and announcement mutations carry their own admin check so
        // the read side of the same paths stays public.
        .route(
            "/topics",
            get(handlers::topic::list_topics).post(handlers::topic::create_topic),
        )
        .route(
            "/topics/{id}",
            axum::routing::patch(handlers::topic::update_topic)
                .delete(handlers::topic::delete_topic),
        )
        .route(
            "/announcements",
            get(handlers::announcement::list_announcements)
                .post(handlers::announcement::create_announcement),
        )
        .nest("/admin", admin_routes(state))
}

/// User administration, behind the admin guard middleware.
fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route("/users/{id}", delete(handlers::user::delete_user))
        .route_layer(middleware::from_fn_with_state(state, admin_guard))
}
