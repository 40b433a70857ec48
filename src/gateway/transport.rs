//! Outbound transport contract
//!
//! The only way the routing core talks back to the platform. The serenity adapter
//! implements it over the HTTP client; tests use a recording implementation.

use anyhow::Result;
use async_trait::async_trait;

use crate::core::payload::Payload;

/// Identifies a message the platform accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageHandle {
    pub id: u64,
    pub channel_id: u64,
}

/// Initial response to an interaction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionReply<'a> {
    Message(&'a Payload),
    /// Acknowledge now, fill in the response later
    Deferred,
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, channel_id: u64, payload: &Payload) -> Result<MessageHandle>;

    /// Consumes the interaction token's single initial response. Returns the created
    /// message when the platform reports one.
    async fn send_interaction_response(
        &self,
        interaction_id: u64,
        token: &str,
        reply: InteractionReply<'_>,
    ) -> Result<Option<MessageHandle>>;

    /// Fill in a deferred initial response
    async fn edit_original_response(
        &self,
        token: &str,
        payload: &Payload,
    ) -> Result<MessageHandle>;

    async fn send_followup(&self, token: &str, payload: &Payload) -> Result<MessageHandle>;

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()>;
}
