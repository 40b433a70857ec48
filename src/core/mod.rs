//! # Core Module
//!
//! Configuration, error taxonomy and response payloads shared by the routing layer.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Add router errors and tagged response payloads
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod error;
pub mod payload;

// Re-export commonly used items
pub use config::Config;
pub use error::RouterError;
pub use payload::{FileAttachment, MessageReference, Payload, EPHEMERAL_FLAG};
