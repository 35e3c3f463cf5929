//! # Infrastructure Layer
//!
//! Implementations of the domain's repository traits against concrete
//! storage engines, plus connection management.

pub mod database;
pub mod repositories;

pub use repositories::Store;
