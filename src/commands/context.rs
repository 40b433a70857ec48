//! Per-invocation context for command handlers
//!
//! One `Context` is built for every inbound message or interaction. It hides which
//! of the two it came from behind a single option and response contract. The command
//! name and options are derived lazily on first access and cached, so repeated reads
//! always agree.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Unified message/interaction context with lazy option resolution
//! - 1.0.0: Initial implementation with core shared state

use anyhow::Result;
use log::debug;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;

use super::normalizer::{descend, flatten, Descended};
use super::options::OptionDeclaration;
use super::registry::{CommandPath, CommandRegistry};
use super::resolver::OptionResolver;
use super::tokenizer;
use crate::core::error::RouterError;
use crate::core::payload::{MessageReference, Payload};
use crate::gateway::event::{InboundInteraction, InboundMessage};
use crate::gateway::transport::{InteractionReply, MessageHandle, Transport};

/// How long a whispered chat message stays up before it is deleted
pub const DEFAULT_WHISPER_DELAY: Duration = Duration::from_secs(8);

/// What a context is bound to; fixed at construction
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationSource {
    Message(InboundMessage),
    Interaction(InboundInteraction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseState {
    Pending,
    Deferred,
    Responded,
}

#[derive(Debug, Default)]
struct Resolution {
    command_name: Option<String>,
    matched: Option<CommandPath>,
    options: OptionResolver,
}

pub struct Context {
    source: InvocationSource,
    prefix: String,
    registry: Arc<CommandRegistry>,
    transport: Arc<dyn Transport>,
    resolution: OnceLock<Resolution>,
    response_state: Mutex<ResponseState>,
}

impl Context {
    /// Bind a context to exactly one of `message` or `interaction`.
    ///
    /// Supplying neither, or both, is a [`RouterError::Usage`].
    pub fn new(
        registry: Arc<CommandRegistry>,
        transport: Arc<dyn Transport>,
        prefix: &str,
        message: Option<InboundMessage>,
        interaction: Option<InboundInteraction>,
    ) -> Result<Self, RouterError> {
        let source = match (message, interaction) {
            (Some(message), None) => InvocationSource::Message(message),
            (None, Some(interaction)) => InvocationSource::Interaction(interaction),
            (None, None) => {
                return Err(RouterError::Usage(
                    "a context needs either a message or an interaction".to_string(),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(RouterError::Usage(
                    "a context takes a message or an interaction, not both".to_string(),
                ))
            }
        };

        Ok(Context {
            source,
            prefix: prefix.to_string(),
            registry,
            transport,
            resolution: OnceLock::new(),
            response_state: Mutex::new(ResponseState::Pending),
        })
    }

    pub fn for_message(
        registry: Arc<CommandRegistry>,
        transport: Arc<dyn Transport>,
        prefix: &str,
        message: InboundMessage,
    ) -> Self {
        Context {
            source: InvocationSource::Message(message),
            prefix: prefix.to_string(),
            registry,
            transport,
            resolution: OnceLock::new(),
            response_state: Mutex::new(ResponseState::Pending),
        }
    }

    pub fn for_interaction(
        registry: Arc<CommandRegistry>,
        transport: Arc<dyn Transport>,
        interaction: InboundInteraction,
    ) -> Self {
        Context {
            source: InvocationSource::Interaction(interaction),
            prefix: String::new(),
            registry,
            transport,
            resolution: OnceLock::new(),
            response_state: Mutex::new(ResponseState::Pending),
        }
    }

    pub fn source(&self) -> &InvocationSource {
        &self.source
    }

    /// Prefix the message was parsed with; empty for interactions
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn guild_id(&self) -> Option<u64> {
        match &self.source {
            InvocationSource::Message(m) => m.guild_id,
            InvocationSource::Interaction(i) => i.guild_id,
        }
    }

    pub fn channel_id(&self) -> u64 {
        match &self.source {
            InvocationSource::Message(m) => m.channel_id,
            InvocationSource::Interaction(i) => i.channel_id,
        }
    }

    pub fn user_id(&self) -> u64 {
        match &self.source {
            InvocationSource::Message(m) => m.author_id,
            InvocationSource::Interaction(i) => i.user_id,
        }
    }

    pub fn is_bot_author(&self) -> bool {
        match &self.source {
            InvocationSource::Message(m) => m.is_automated(),
            InvocationSource::Interaction(i) => i.user_is_bot,
        }
    }

    pub fn command_name(&self) -> Option<&str> {
        self.resolved().command_name.as_deref()
    }

    /// Sub-command or group path the invocation resolved to, if any
    pub fn matched_path(&self) -> Option<&CommandPath> {
        self.resolved().matched.as_ref()
    }

    pub fn options(&self) -> &OptionResolver {
        &self.resolved().options
    }

    fn resolved(&self) -> &Resolution {
        self.resolution.get_or_init(|| self.resolve())
    }

    fn resolve(&self) -> Resolution {
        match &self.source {
            InvocationSource::Message(message) => {
                let Some((name, tokens)) = tokenizer::parse(&self.prefix, &message.content) else {
                    return Resolution::default();
                };
                let classified = tokenizer::classify(&self.registry, &name, &tokens);
                let descended = descend(&classified.options);
                let schema = self.schema_for(&name, classified.matched.as_ref());

                Resolution {
                    command_name: Some(name),
                    matched: classified.matched,
                    options: OptionResolver::new(classified.options, descended, schema),
                }
            }
            InvocationSource::Interaction(interaction) => {
                let Some(name) = interaction.command_name.clone().filter(|n| !n.is_empty()) else {
                    return Resolution::default();
                };
                let options = flatten(&interaction.options);
                let descended = descend(&options);
                let matched = interaction_path(&name, &descended);
                let schema = self.schema_for(&name, matched.as_ref());

                Resolution {
                    command_name: Some(name),
                    matched,
                    options: OptionResolver::new(options, descended, schema),
                }
            }
        }
    }

    fn schema_for(&self, name: &str, matched: Option<&CommandPath>) -> Vec<OptionDeclaration> {
        matched
            .and_then(|path| self.registry.lookup(path))
            .or_else(|| self.registry.find_command(name))
            .map(|entry| entry.options.clone())
            .unwrap_or_default()
    }

    /// Send a response through the bound source's native mechanism.
    ///
    /// Returns `None` without calling the platform when the payload is empty. For
    /// interactions the first call uses the initial response (or fills in a deferred
    /// one) and later calls become follow-ups.
    pub async fn respond(&self, payload: impl Into<Payload>) -> Result<Option<MessageHandle>> {
        let payload = payload.into();
        if payload.is_empty() {
            debug!("Skipping empty response for '{}'", self.command_name().unwrap_or("?"));
            return Ok(None);
        }

        match &self.source {
            InvocationSource::Message(message) => {
                let handle = self.transport.send_message(message.channel_id, &payload).await?;
                Ok(Some(handle))
            }
            InvocationSource::Interaction(interaction) => {
                let mut state = self.response_state.lock().await;
                let handle = match *state {
                    ResponseState::Pending => {
                        self.transport
                            .send_interaction_response(
                                interaction.id,
                                &interaction.token,
                                InteractionReply::Message(&payload),
                            )
                            .await?
                    }
                    ResponseState::Deferred => Some(
                        self.transport
                            .edit_original_response(&interaction.token, &payload)
                            .await?,
                    ),
                    ResponseState::Responded => Some(
                        self.transport
                            .send_followup(&interaction.token, &payload)
                            .await?,
                    ),
                };
                *state = ResponseState::Responded;
                Ok(handle)
            }
        }
    }

    pub async fn respond_with(&self, content: impl Into<String>) -> Result<Option<MessageHandle>> {
        self.respond(Payload::Text(content.into())).await
    }

    /// Like `respond`, but chat messages are sent as a reply to the invoking message
    pub async fn reply(&self, payload: impl Into<Payload>) -> Result<Option<MessageHandle>> {
        let payload = payload.into();
        match &self.source {
            InvocationSource::Message(message) => {
                let reference = MessageReference {
                    message_id: message.id,
                    channel_id: message.channel_id,
                    guild_id: message.guild_id,
                    fail_if_not_exists: true,
                };
                self.respond(payload.reply_to(reference)).await
            }
            InvocationSource::Interaction(_) => self.respond(payload).await,
        }
    }

    /// Respond so only the invoker sees it: ephemeral for interactions, sent and
    /// deleted after `delay` for chat messages.
    pub async fn whisper(
        &self,
        payload: impl Into<Payload>,
        delay: Duration,
    ) -> Result<Option<MessageHandle>> {
        let payload = payload.into();
        match &self.source {
            InvocationSource::Message(_) => {
                let handle = self.respond(payload).await?;
                if let Some(sent) = handle {
                    sleep(delay).await;
                    self.transport.delete_message(sent.channel_id, sent.id).await?;
                }
                Ok(handle)
            }
            InvocationSource::Interaction(_) => self.respond(payload.private()).await,
        }
    }

    /// Acknowledge an interaction now and respond later.
    ///
    /// Returns `false` without doing anything for message-bound contexts (messages
    /// have no deferred state) and for interactions that were already answered.
    pub async fn defer(&self) -> Result<bool> {
        let InvocationSource::Interaction(interaction) = &self.source else {
            return Ok(false);
        };

        let mut state = self.response_state.lock().await;
        if *state != ResponseState::Pending {
            return Ok(false);
        }

        self.transport
            .send_interaction_response(
                interaction.id,
                &interaction.token,
                InteractionReply::Deferred,
            )
            .await?;
        *state = ResponseState::Deferred;
        Ok(true)
    }
}

fn interaction_path(name: &str, descended: &Descended) -> Option<CommandPath> {
    match (&descended.group, &descended.sub_command) {
        (Some(group), Some(sub_command)) => {
            Some(CommandPath::sub_command_group(name, group.as_str(), sub_command.as_str()))
        }
        (None, Some(sub_command)) => Some(CommandPath::sub_command(name, sub_command.as_str())),
        _ => None,
    }
}
