//! # Gateway Boundary
//!
//! Everything the routing core needs from the chat platform: inbound event shapes,
//! the outbound transport contract, and the serenity implementation of both.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.3.0

pub mod discord;
pub mod event;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use event::{InboundInteraction, InboundMessage, StructuredOption};
pub use transport::{InteractionReply, MessageHandle, Transport};
