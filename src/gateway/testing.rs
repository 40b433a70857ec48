//! Recording transport for unit tests

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use super::transport::{InteractionReply, MessageHandle, Transport};
use crate::core::payload::Payload;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendMessage { channel_id: u64, payload: Payload },
    InteractionResponse { interaction_id: u64, token: String, payload: Option<Payload> },
    EditOriginal { token: String, payload: Payload },
    Followup { token: String, payload: Payload },
    Delete { channel_id: u64, message_id: u64 },
}

/// Records every call and hands out sequential message ids starting at 1000
pub struct RecordingTransport {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    fail: AtomicBool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        RecordingTransport {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1000),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every following call fail
    pub fn fail_all(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<u64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("transport unavailable"));
        }
        self.calls.lock().unwrap().push(call);
        Ok(self.next_id.fetch_add(1, Ordering::SeqCst))
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send_message(&self, channel_id: u64, payload: &Payload) -> Result<MessageHandle> {
        let id = self.record(Call::SendMessage {
            channel_id,
            payload: payload.clone(),
        })?;
        Ok(MessageHandle { id, channel_id })
    }

    async fn send_interaction_response(
        &self,
        interaction_id: u64,
        token: &str,
        reply: InteractionReply<'_>,
    ) -> Result<Option<MessageHandle>> {
        let payload = match reply {
            InteractionReply::Message(payload) => Some(payload.clone()),
            InteractionReply::Deferred => None,
        };
        let deferred = payload.is_none();
        let id = self.record(Call::InteractionResponse {
            interaction_id,
            token: token.to_string(),
            payload,
        })?;
        Ok((!deferred).then_some(MessageHandle { id, channel_id: 0 }))
    }

    async fn edit_original_response(
        &self,
        token: &str,
        payload: &Payload,
    ) -> Result<MessageHandle> {
        let id = self.record(Call::EditOriginal {
            token: token.to_string(),
            payload: payload.clone(),
        })?;
        Ok(MessageHandle { id, channel_id: 0 })
    }

    async fn send_followup(&self, token: &str, payload: &Payload) -> Result<MessageHandle> {
        let id = self.record(Call::Followup {
            token: token.to_string(),
            payload: payload.clone(),
        })?;
        Ok(MessageHandle { id, channel_id: 0 })
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        self.record(Call::Delete {
            channel_id,
            message_id,
        })?;
        Ok(())
    }
}
