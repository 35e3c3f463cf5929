//! Chat Gateway Behavior Tests
//!
//! Drive the gateway with channel-backed fake connections against an
//! in-memory store.

mod message_tests;
mod moderation_tests;
mod presence_tests;
