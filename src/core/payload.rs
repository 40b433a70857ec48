//! Outbound response payloads
//!
//! A response is one of a fixed set of shapes so the transport can match on it
//! exhaustively. Rich-content blocks (embeds, component rows) are carried as already
//! serialized JSON; building them is the caller's business.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Serialize `message_reference` through a serde wire shape
//! - 1.1.0: Add `Reference` and `Private` wrappers
//! - 1.0.0: Text, embeds, files, components and tts shapes

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Interaction response flag that hides the response from everyone but the invoker
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// An in-memory file uploaded alongside a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// Points a message at the message it replies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageReference {
    pub message_id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub fail_if_not_exists: bool,
}

/// `message_reference` as the gateway expects it; snowflakes travel as strings
#[derive(Debug, Serialize)]
struct ReferenceWire {
    message_id: String,
    channel_id: String,
    guild_id: Option<String>,
    fail_if_not_exists: bool,
}

impl From<&MessageReference> for ReferenceWire {
    fn from(reference: &MessageReference) -> Self {
        ReferenceWire {
            message_id: reference.message_id.to_string(),
            channel_id: reference.channel_id.to_string(),
            guild_id: reference.guild_id.map(|id| id.to_string()),
            fail_if_not_exists: reference.fail_if_not_exists,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Embeds {
        content: Option<String>,
        embeds: Vec<Value>,
    },
    Files {
        content: Option<String>,
        files: Vec<FileAttachment>,
    },
    Components {
        content: Option<String>,
        components: Vec<Value>,
    },
    Tts(String),
    Reference {
        inner: Box<Payload>,
        reference: MessageReference,
    },
    /// Only honoured by interaction responses; messages have no ephemeral state.
    Private(Box<Payload>),
}

impl Payload {
    pub fn text(content: impl Into<String>) -> Self {
        Payload::Text(content.into())
    }

    pub fn embeds(embeds: Vec<Value>) -> Self {
        Payload::Embeds {
            content: None,
            embeds,
        }
    }

    /// Wrap this payload so it is sent as a reply to `reference`
    pub fn reply_to(self, reference: MessageReference) -> Self {
        Payload::Reference {
            inner: Box::new(self),
            reference,
        }
    }

    /// Wrap this payload so interaction responses are ephemeral
    pub fn private(self) -> Self {
        Payload::Private(Box::new(self))
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Payload::Text(content) | Payload::Tts(content) => Some(content.as_str()),
            Payload::Embeds { content, .. }
            | Payload::Files { content, .. }
            | Payload::Components { content, .. } => content.as_deref(),
            Payload::Reference { inner, .. } | Payload::Private(inner) => inner.content(),
        }
    }

    pub fn files(&self) -> &[FileAttachment] {
        match self {
            Payload::Files { files, .. } => files,
            Payload::Reference { inner, .. } | Payload::Private(inner) => inner.files(),
            _ => &[],
        }
    }

    pub fn is_private(&self) -> bool {
        match self {
            Payload::Private(_) => true,
            Payload::Reference { inner, .. } => inner.is_private(),
            _ => false,
        }
    }

    /// True when there is nothing to send: no text, no blocks, no files.
    ///
    /// Contexts skip the platform call entirely for empty payloads.
    pub fn is_empty(&self) -> bool {
        let has_text = self.content().is_some_and(|c| !c.trim().is_empty());
        let has_blocks = match self {
            Payload::Embeds { embeds, .. } => !embeds.is_empty(),
            Payload::Components { components, .. } => !components.is_empty(),
            Payload::Files { files, .. } => !files.is_empty(),
            Payload::Reference { inner, .. } | Payload::Private(inner) => !inner.is_empty(),
            Payload::Text(_) | Payload::Tts(_) => false,
        };
        !has_text && !has_blocks
    }

    /// JSON body for a channel message create call. Files are not included; the
    /// transport uploads them separately.
    pub fn message_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.fill(&mut map, true);
        map
    }

    /// JSON `data` object for an interaction response or follow-up
    pub fn interaction_data_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        self.fill(&mut map, false);
        if self.is_private() {
            map.insert("flags".to_string(), json!(EPHEMERAL_FLAG));
        }
        map
    }

    fn fill(&self, map: &mut Map<String, Value>, with_reference: bool) {
        if let Some(content) = self.content() {
            map.insert("content".to_string(), json!(content));
        }

        match self {
            Payload::Embeds { embeds, .. } => {
                map.insert("embeds".to_string(), Value::Array(embeds.clone()));
            }
            Payload::Components { components, .. } => {
                map.insert("components".to_string(), Value::Array(components.clone()));
            }
            Payload::Tts(_) => {
                map.insert("tts".to_string(), json!(true));
            }
            Payload::Reference { inner, reference } => {
                inner.fill(map, with_reference);
                if with_reference {
                    if let Ok(wire) = serde_json::to_value(ReferenceWire::from(reference)) {
                        map.insert("message_reference".to_string(), wire);
                    }
                }
            }
            Payload::Private(inner) => inner.fill(map, with_reference),
            Payload::Text(_) | Payload::Files { .. } => {}
        }
    }
}

impl From<&str> for Payload {
    fn from(content: &str) -> Self {
        Payload::Text(content.to_string())
    }
}

impl From<String> for Payload {
    fn from(content: String) -> Self {
        Payload::Text(content)
    }
}
