//! Event dispatcher
//!
//! Routes inbound messages and interactions to registered handlers. Bot-authored
//! events are dropped before any context is built; unknown commands are an ordinary
//! outcome, not an error. Handler failures are returned to the caller, which decides
//! how to contain them.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Dispatch modes, per-guild prefixes, structured outcomes
//! - 1.0.0: Initial prefix command dispatch

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::context::Context;
use super::registry::CommandRegistry;
use crate::gateway::event::{InboundInteraction, InboundMessage};
use crate::gateway::transport::Transport;

/// Whether a matched sub-command handler runs alongside the command handler
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DispatchMode {
    /// Only the top-level command handler runs
    #[default]
    CommandOnly,
    /// The matched sub-command (or group) handler runs first, then the command handler
    WithSubCommands,
}

impl FromStr for DispatchMode {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "command_only" => Ok(DispatchMode::CommandOnly),
            "with_subcommands" => Ok(DispatchMode::WithSubCommands),
            other => Err(anyhow!(
                "unknown dispatch mode '{other}' (expected command_only or with_subcommands)"
            )),
        }
    }
}

/// Looks up the command prefix for a guild; `None` for direct messages
#[async_trait]
pub trait PrefixResolver: Send + Sync {
    async fn prefix(&self, guild_id: Option<u64>) -> Result<String>;
}

#[async_trait]
impl<F, Fut> PrefixResolver for F
where
    F: Fn(Option<u64>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    async fn prefix(&self, guild_id: Option<u64>) -> Result<String> {
        (self)(guild_id).await
    }
}

#[derive(Clone)]
pub enum Prefix {
    Static(String),
    Resolver(Arc<dyn PrefixResolver>),
}

impl Prefix {
    pub fn resolver(resolver: impl PrefixResolver + 'static) -> Self {
        Prefix::Resolver(Arc::new(resolver))
    }

    pub async fn for_guild(&self, guild_id: Option<u64>) -> Result<String> {
        match self {
            Prefix::Static(prefix) => Ok(prefix.clone()),
            Prefix::Resolver(resolver) => resolver.prefix(guild_id).await,
        }
    }
}

impl fmt::Debug for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::Static(prefix) => f.debug_tuple("Static").field(prefix).finish(),
            Prefix::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl From<&str> for Prefix {
    fn from(prefix: &str) -> Self {
        Prefix::Static(prefix.to_string())
    }
}

impl From<String> for Prefix {
    fn from(prefix: String) -> Self {
        Prefix::Static(prefix)
    }
}

/// What happened to one inbound event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Authored by a bot or webhook
    Ignored,
    /// Not addressed to the bot (no prefix, empty command)
    NoCommand,
    /// Named a command nobody registered
    UnknownCommand(String),
    /// Handlers ran; `handlers` counts them
    Dispatched { command: String, handlers: usize },
}

pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    prefix: Prefix,
    mode: DispatchMode,
}

impl Dispatcher {
    pub fn new(registry: Arc<CommandRegistry>, prefix: impl Into<Prefix>) -> Self {
        Dispatcher {
            registry,
            prefix: prefix.into(),
            mode: DispatchMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: DispatchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub async fn dispatch_message(
        &self,
        transport: Arc<dyn Transport>,
        message: InboundMessage,
    ) -> Result<DispatchOutcome> {
        let request_id = Uuid::new_v4();

        if message.is_automated() {
            debug!("[{request_id}] 🤖 Ignoring automated message {}", message.id);
            return Ok(DispatchOutcome::Ignored);
        }

        let prefix = self.prefix.for_guild(message.guild_id).await?;
        if !message.content.starts_with(prefix.as_str()) {
            return Ok(DispatchOutcome::NoCommand);
        }

        debug!(
            "[{}] 📥 Message {} | User: {} | Channel: {} | Content: '{}'",
            request_id,
            message.id,
            message.author_id,
            message.channel_id,
            message.content.chars().take(100).collect::<String>()
        );

        let ctx = Arc::new(Context::for_message(
            self.registry.clone(),
            transport,
            &prefix,
            message,
        ));
        self.run(request_id, ctx).await
    }

    pub async fn dispatch_interaction(
        &self,
        transport: Arc<dyn Transport>,
        interaction: InboundInteraction,
    ) -> Result<DispatchOutcome> {
        let request_id = Uuid::new_v4();

        if interaction.user_is_bot {
            debug!("[{request_id}] 🤖 Ignoring bot interaction {}", interaction.id);
            return Ok(DispatchOutcome::Ignored);
        }

        debug!(
            "[{}] 📥 Interaction {} | User: {} | Command: {:?}",
            request_id, interaction.id, interaction.user_id, interaction.command_name
        );

        let ctx = Arc::new(Context::for_interaction(
            self.registry.clone(),
            transport,
            interaction,
        ));
        self.run(request_id, ctx).await
    }

    async fn run(&self, request_id: Uuid, ctx: Arc<Context>) -> Result<DispatchOutcome> {
        let Some(name) = ctx.command_name().map(str::to_string) else {
            debug!("[{request_id}] No command name, nothing to dispatch");
            return Ok(DispatchOutcome::NoCommand);
        };

        let Some(entry) = self.registry.find_command(&name) else {
            debug!("[{request_id}] ❓ Unknown command '{name}'");
            return Ok(DispatchOutcome::UnknownCommand(name));
        };
        if entry.path.root() != name {
            debug!("[{request_id}] 🔀 Alias '{name}' resolved to '{}'", entry.path);
        }

        let mut handlers = 0;

        if self.mode == DispatchMode::WithSubCommands {
            if let Some(sub) = ctx.matched_path().and_then(|path| self.registry.lookup(path)) {
                info!("[{request_id}] ⚡ Running '{}'", sub.path);
                sub.handler.run(ctx.clone()).await?;
                handlers += 1;
            }
        }

        info!("[{request_id}] ⚡ Running '{}'", entry.path);
        entry.handler.run(ctx).await?;
        handlers += 1;

        info!("[{request_id}] ✅ '{name}' finished ({handlers} handler(s))");
        Ok(DispatchOutcome::Dispatched {
            command: name,
            handlers,
        })
    }
}
