//! # Application Layer
//!
//! Business services orchestrating the domain, plus HTTP DTOs.

pub mod dto;
pub mod services;
