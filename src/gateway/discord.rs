//! Serenity adapter
//!
//! Converts serenity gateway models into the core's inbound shapes, implements
//! [`Transport`] over serenity's HTTP client, and provides [`CommandMiddleware`], an
//! `EventHandler` that dispatches commands before handing every event on to an inner
//! handler.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Convert autocomplete interactions; contain handler errors at the boundary
//! - 1.1.0: Forward ready events and register application commands
//! - 1.0.0: Message and interaction hooks over the HTTP client

use anyhow::Result;
use log::{debug, error, info, warn};
use serde_json::{json, Value};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::application_command::{
    ApplicationCommandInteraction, CommandDataOption,
};
use serenity::model::application::command::CommandOptionType;
use serenity::model::application::interaction::autocomplete::AutocompleteInteraction;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::{AttachmentType, Message};
use serenity::model::gateway::Ready;
use serenity::prelude::{Context, EventHandler};
use std::borrow::Cow;
use std::sync::Arc;

use super::event::{InboundInteraction, InboundMessage, StructuredOption};
use super::transport::{InteractionReply, MessageHandle, Transport};
use crate::commands::dispatcher::{DispatchOutcome, Dispatcher};
use crate::commands::options::OptionKind;
use crate::commands::registry::CommandRegistry;
use crate::core::payload::Payload;

/// Interaction callback type for a message response
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;
/// Interaction callback type for "thinking..." with the message sent later
const DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE: u8 = 5;

impl From<&Message> for InboundMessage {
    fn from(msg: &Message) -> Self {
        InboundMessage {
            id: msg.id.0,
            channel_id: msg.channel_id.0,
            guild_id: msg.guild_id.map(|g| g.0),
            author_id: msg.author.id.0,
            author_is_bot: msg.author.bot,
            is_webhook: msg.webhook_id.is_some(),
            content: msg.content.clone(),
        }
    }
}

impl From<&CommandDataOption> for StructuredOption {
    fn from(option: &CommandDataOption) -> Self {
        StructuredOption {
            name: option.name.clone(),
            kind: option_kind(option.kind),
            value: option.value.clone(),
            options: option.options.iter().map(StructuredOption::from).collect(),
            focused: option.focused,
        }
    }
}

impl From<&ApplicationCommandInteraction> for InboundInteraction {
    fn from(command: &ApplicationCommandInteraction) -> Self {
        InboundInteraction {
            id: command.id.0,
            token: command.token.clone(),
            command_name: Some(command.data.name.clone()),
            guild_id: command.guild_id.map(|g| g.0),
            channel_id: command.channel_id.0,
            user_id: command.user.id.0,
            user_is_bot: command.user.bot,
            options: command.data.options.iter().map(StructuredOption::from).collect(),
        }
    }
}

/// Autocomplete events are not dispatched; this lets an integration build a
/// `Context` from one and read the focused option itself.
impl From<&AutocompleteInteraction> for InboundInteraction {
    fn from(autocomplete: &AutocompleteInteraction) -> Self {
        InboundInteraction {
            id: autocomplete.id.0,
            token: autocomplete.token.clone(),
            command_name: Some(autocomplete.data.name.clone()),
            guild_id: autocomplete.guild_id.map(|g| g.0),
            channel_id: autocomplete.channel_id.0,
            user_id: autocomplete.user.id.0,
            user_is_bot: autocomplete.user.bot,
            options: autocomplete
                .data
                .options
                .iter()
                .map(StructuredOption::from)
                .collect(),
        }
    }
}

fn option_kind(kind: CommandOptionType) -> OptionKind {
    serde_json::to_value(kind)
        .ok()
        .and_then(|code| code.as_u64())
        .and_then(|code| u8::try_from(code).ok())
        .map_or(OptionKind::Unknown(0), OptionKind::from_code)
}

fn handle_of(msg: &Message) -> MessageHandle {
    MessageHandle {
        id: msg.id.0,
        channel_id: msg.channel_id.0,
    }
}

/// [`Transport`] over serenity's raw HTTP client
#[derive(Clone)]
pub struct SerenityTransport {
    http: Arc<Http>,
}

impl SerenityTransport {
    pub fn new(http: Arc<Http>) -> Self {
        SerenityTransport { http }
    }
}

#[async_trait]
impl Transport for SerenityTransport {
    async fn send_message(&self, channel_id: u64, payload: &Payload) -> Result<MessageHandle> {
        let body = payload.message_json();

        let sent = if payload.files().is_empty() {
            self.http
                .send_message(channel_id, &Value::Object(body))
                .await?
        } else {
            let files: Vec<AttachmentType> = payload
                .files()
                .iter()
                .map(|file| AttachmentType::Bytes {
                    data: Cow::Borrowed(file.data.as_slice()),
                    filename: file.filename.clone(),
                })
                .collect();
            self.http.send_files(channel_id, files, &body).await?
        };

        Ok(handle_of(&sent))
    }

    async fn send_interaction_response(
        &self,
        interaction_id: u64,
        token: &str,
        reply: InteractionReply<'_>,
    ) -> Result<Option<MessageHandle>> {
        let body = match reply {
            InteractionReply::Message(payload) => {
                if !payload.files().is_empty() {
                    warn!("File attachments are not sent with interaction responses");
                }
                json!({
                    "type": CHANNEL_MESSAGE_WITH_SOURCE,
                    "data": payload.interaction_data_json(),
                })
            }
            InteractionReply::Deferred => json!({ "type": DEFERRED_CHANNEL_MESSAGE_WITH_SOURCE }),
        };

        self.http
            .create_interaction_response(interaction_id, token, &body)
            .await?;

        if matches!(reply, InteractionReply::Deferred) {
            return Ok(None);
        }

        // The callback endpoint returns no body; the created message has to be fetched.
        match self.http.get_original_interaction_response(token).await {
            Ok(original) => Ok(Some(handle_of(&original))),
            Err(e) => {
                debug!("Could not fetch original interaction response: {e}");
                Ok(None)
            }
        }
    }

    async fn edit_original_response(
        &self,
        token: &str,
        payload: &Payload,
    ) -> Result<MessageHandle> {
        let body = Value::Object(payload.interaction_data_json());
        let edited = self
            .http
            .edit_original_interaction_response(token, &body)
            .await?;
        Ok(handle_of(&edited))
    }

    async fn send_followup(&self, token: &str, payload: &Payload) -> Result<MessageHandle> {
        let body = Value::Object(payload.interaction_data_json());
        let sent = self.http.create_followup_message(token, &body).await?;
        Ok(handle_of(&sent))
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<()> {
        self.http.delete_message(channel_id, message_id).await?;
        Ok(())
    }
}

/// Inner handler for a middleware that has nothing to forward to
pub struct NoInner;

#[async_trait]
impl EventHandler for NoInner {}

/// `EventHandler` that routes commands, then forwards every event to `inner`
pub struct CommandMiddleware<H> {
    dispatcher: Arc<Dispatcher>,
    inner: H,
}

/// Install the command dispatcher in front of an existing event handler
pub fn enable_command_context<H: EventHandler>(
    dispatcher: Dispatcher,
    inner: H,
) -> CommandMiddleware<H> {
    CommandMiddleware {
        dispatcher: Arc::new(dispatcher),
        inner,
    }
}

impl CommandMiddleware<NoInner> {
    pub fn new(dispatcher: Dispatcher) -> Self {
        enable_command_context(dispatcher, NoInner)
    }
}

impl<H> CommandMiddleware<H> {
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

/// Handler failures stop here; the inner handler still sees the event
fn log_outcome(outcome: Result<DispatchOutcome>) -> Option<DispatchOutcome> {
    match outcome {
        Ok(outcome) => {
            if let DispatchOutcome::Dispatched { command, handlers } = &outcome {
                debug!("Dispatched '{command}' to {handlers} handler(s)");
            }
            Some(outcome)
        }
        Err(e) => {
            error!("Command handler failed: {e:#}");
            None
        }
    }
}

#[async_trait]
impl<H: EventHandler> EventHandler for CommandMiddleware<H> {
    async fn message(&self, ctx: Context, msg: Message) {
        let transport: Arc<dyn Transport> = Arc::new(SerenityTransport::new(ctx.http.clone()));
        log_outcome(
            self.dispatcher
                .dispatch_message(transport, InboundMessage::from(&msg))
                .await,
        );

        self.inner.message(ctx, msg).await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        if let Interaction::ApplicationCommand(command) = &interaction {
            let transport: Arc<dyn Transport> =
                Arc::new(SerenityTransport::new(ctx.http.clone()));
            log_outcome(
                self.dispatcher
                    .dispatch_interaction(transport, InboundInteraction::from(command))
                    .await,
            );
        }

        self.inner.interaction_create(ctx, interaction).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        self.inner.ready(ctx, ready).await;
    }
}

/// Bulk-overwrite the registry's application commands, guild-scoped when `guild_id`
/// is set and globally otherwise. Returns how many commands were registered.
pub async fn register_application_commands(
    http: &Http,
    registry: &CommandRegistry,
    guild_id: Option<u64>,
) -> Result<usize> {
    let commands = Value::Array(registry.application_commands());

    let created = match guild_id {
        Some(guild_id) => {
            http.create_guild_application_commands(guild_id, &commands)
                .await?
        }
        None => http.create_global_application_commands(&commands).await?,
    };

    info!(
        "Registered {} application command(s) {}",
        created.len(),
        guild_id.map_or_else(|| "globally".to_string(), |id| format!("in guild {id}"))
    );
    Ok(created.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn data_option(raw: Value) -> CommandDataOption {
        serde_json::from_value(raw).expect("valid option json")
    }

    #[test]
    fn test_option_kind_covers_every_option_type() {
        let cases = [
            (CommandOptionType::SubCommand, OptionKind::SubCommand),
            (CommandOptionType::SubCommandGroup, OptionKind::SubCommandGroup),
            (CommandOptionType::String, OptionKind::String),
            (CommandOptionType::Integer, OptionKind::Integer),
            (CommandOptionType::Boolean, OptionKind::Boolean),
            (CommandOptionType::User, OptionKind::User),
            (CommandOptionType::Channel, OptionKind::Channel),
            (CommandOptionType::Role, OptionKind::Role),
            (CommandOptionType::Mentionable, OptionKind::Mentionable),
            (CommandOptionType::Number, OptionKind::Number),
            (CommandOptionType::Attachment, OptionKind::Attachment),
        ];
        for (kind, expected) in cases {
            assert_eq!(option_kind(kind), expected, "{kind:?}");
        }
        assert_eq!(option_kind(CommandOptionType::Unknown), OptionKind::Unknown(255));
    }

    #[test]
    fn test_nested_option_tree_converts() {
        let raw = data_option(json!({
            "name": "role",
            "type": 2,
            "options": [{
                "name": "add",
                "type": 1,
                "options": [
                    {"name": "who", "type": 6, "value": "80351110224678912"},
                    {"name": "reason", "type": 3, "value": "spam", "focused": true}
                ]
            }]
        }));

        let group = StructuredOption::from(&raw);
        assert_eq!(group.name, "role");
        assert_eq!(group.kind, OptionKind::SubCommandGroup);
        assert_eq!(group.value, None);

        let sub = &group.options[0];
        assert_eq!(sub.kind, OptionKind::SubCommand);
        assert_eq!(sub.options.len(), 2);

        let who = &sub.options[0];
        assert_eq!(who.kind, OptionKind::User);
        assert_eq!(who.value, Some(json!("80351110224678912")));
        assert!(!who.focused);

        let reason = &sub.options[1];
        assert_eq!(reason.kind, OptionKind::String);
        assert!(reason.focused);
    }

    #[test]
    fn test_unrecognized_option_type_stays_unknown() {
        let option = StructuredOption::from(&data_option(json!({
            "name": "mystery",
            "type": 42,
            "value": 1
        })));
        assert_eq!(option.kind, OptionKind::Unknown(255));
        assert_eq!(option.value, Some(json!(1)));
    }

    #[test]
    fn test_log_outcome_passes_results_through() {
        let dispatched = DispatchOutcome::Dispatched {
            command: "ping".to_string(),
            handlers: 1,
        };
        assert_eq!(log_outcome(Ok(dispatched.clone())), Some(dispatched));
        assert_eq!(
            log_outcome(Ok(DispatchOutcome::Ignored)),
            Some(DispatchOutcome::Ignored)
        );
    }

    #[test]
    fn test_log_outcome_contains_handler_errors() {
        assert_eq!(log_outcome(Err(anyhow!("handler blew up"))), None);
    }
}
