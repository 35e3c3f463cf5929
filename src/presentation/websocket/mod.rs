//! WebSocket Layer
//!
//! Real-time messaging and presence coordination: the wire events, the
//! connection registry, the topic room router, the chat gateway that
//! orchestrates them, and the transport handler.

pub mod events;
pub mod gateway;
pub mod handler;
pub mod registry;
pub mod rooms;

pub use events::{ClientEvent, MessageRecord, ServerEvent};
pub use gateway::ChatGateway;
pub use handler::ws_handler;
pub use registry::{ConnectionRegistry, Identity};
pub use rooms::RoomRouter;
