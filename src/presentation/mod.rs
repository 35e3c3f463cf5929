//! Presentation Layer
//!
//! HTTP routes and the WebSocket chat gateway.

pub mod http;
pub mod middleware;
pub mod websocket;
