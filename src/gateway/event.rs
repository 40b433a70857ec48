//! Inbound event shapes handed to the routing core
//!
//! Plain data mirrors of what the gateway delivers. The serenity adapter fills these
//! in; tests build them by hand.

use serde_json::Value;

use crate::commands::options::OptionKind;

/// A chat message as seen by the dispatcher
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub id: u64,
    pub channel_id: u64,
    pub guild_id: Option<u64>,
    pub author_id: u64,
    pub author_is_bot: bool,
    pub is_webhook: bool,
    pub content: String,
}

impl InboundMessage {
    /// Bot accounts and webhooks never trigger commands
    pub fn is_automated(&self) -> bool {
        self.author_is_bot || self.is_webhook
    }
}

/// One node of an interaction's typed option tree
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredOption {
    pub name: String,
    pub kind: OptionKind,
    pub value: Option<Value>,
    pub options: Vec<StructuredOption>,
    pub focused: bool,
}

impl StructuredOption {
    pub fn new(name: impl Into<String>, kind: OptionKind, value: Option<Value>) -> Self {
        StructuredOption {
            name: name.into(),
            kind,
            value,
            options: Vec::new(),
            focused: false,
        }
    }

    pub fn with_options(mut self, options: Vec<StructuredOption>) -> Self {
        self.options = options;
        self
    }
}

/// A slash-command (or autocomplete) interaction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundInteraction {
    pub id: u64,
    /// Valid once for the initial response, reusable for follow-ups
    pub token: String,
    pub command_name: Option<String>,
    pub guild_id: Option<u64>,
    pub channel_id: u64,
    pub user_id: u64,
    pub user_is_bot: bool,
    pub options: Vec<StructuredOption>,
}
