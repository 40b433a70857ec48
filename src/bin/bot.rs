use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};
use serenity::async_trait;
use serenity::model::gateway::Ready;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use switchboard::commands::{DEFAULT_WHISPER_DELAY, OptionDeclaration, OptionKind};
use switchboard::core::Config;
use switchboard::gateway::discord::{enable_command_context, register_application_commands};
use switchboard::{handler_fn, CommandRegistry, Context as CommandContext, Dispatcher, Payload};

const EIGHT_BALL_ANSWERS: [&str; 6] = [
    "It is certain.",
    "Without a doubt.",
    "Ask again later.",
    "Cannot predict now.",
    "Don't count on it.",
    "Very doubtful.",
];

/// Receives events after the command middleware has routed them
struct Handler {
    registry: Arc<CommandRegistry>,
    guild_id: Option<u64>,
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("🎉 {} is connected and ready!", ready.user.name);
        info!("📡 Connected to {} guilds", ready.guilds.len());

        let registered =
            register_application_commands(&ctx.http, &self.registry, self.guild_id).await;
        if let Err(e) = registered {
            error!("Failed to register application commands: {e}");
        }
    }
}

fn build_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register_command(
        "ping",
        Vec::<String>::new(),
        vec![],
        handler_fn(|ctx: Arc<CommandContext>| async move {
            ctx.respond_with("Pong!").await?;
            anyhow::Ok(())
        }),
    );

    registry.register_command(
        "8ball",
        ["8b", "magic"],
        vec![OptionDeclaration::new("question", OptionKind::String).description("What to ask")],
        handler_fn(|ctx: Arc<CommandContext>| async move {
            let question = ctx.options().get_string("question", false)?.unwrap_or_default();
            let answer = EIGHT_BALL_ANSWERS[question.len() % EIGHT_BALL_ANSWERS.len()];
            ctx.reply(format!("🎱 {answer}")).await?;
            anyhow::Ok(())
        }),
    );

    registry.register_command(
        "kick",
        Vec::<String>::new(),
        vec![
            OptionDeclaration::new("target", OptionKind::User)
                .description("Who to kick")
                .required(true),
            OptionDeclaration::new("mention", OptionKind::Boolean).description("Ping them"),
        ],
        handler_fn(|ctx: Arc<CommandContext>| async move {
            let target = match ctx.options().get_user("target", true) {
                Ok(target) => target.unwrap_or_default(),
                Err(e) => {
                    ctx.whisper(format!("⚠️ {e}"), DEFAULT_WHISPER_DELAY).await?;
                    return Err(anyhow::Error::from(e));
                }
            };
            let mention = ctx.options().get_boolean("mention", false)?.unwrap_or(false);
            let who = if mention {
                format!("<@{target}>")
            } else {
                target.to_string()
            };
            ctx.respond_with(format!("👢 Would kick {who}")).await?;
            anyhow::Ok(())
        }),
    );

    registry.register_command(
        "repl",
        Vec::<String>::new(),
        vec![],
        handler_fn(|ctx: Arc<CommandContext>| async move {
            let sub = ctx.options().get_subcommand(false)?.unwrap_or("none").to_string();
            ctx.respond_with(format!("repl invoked (sub-command: {sub})")).await?;
            anyhow::Ok(())
        }),
    );

    registry.register_sub_command(
        "repl",
        "ping",
        vec![OptionDeclaration::new("loud", OptionKind::Boolean).description("Shout it")],
        handler_fn(|ctx: Arc<CommandContext>| async move {
            let loud = ctx.options().get_boolean("loud", false)?.unwrap_or(false);
            ctx.respond_with(if loud { "PONG!" } else { "pong" }).await?;
            anyhow::Ok(())
        }),
    );

    registry.register_command(
        "slow",
        Vec::<String>::new(),
        vec![],
        handler_fn(|ctx: Arc<CommandContext>| async move {
            ctx.defer().await?;
            tokio::time::sleep(Duration::from_secs(2)).await;
            ctx.respond(Payload::text("Done thinking.")).await?;
            anyhow::Ok(())
        }),
    );

    registry
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting switchboard bot...");

    let registry = Arc::new(build_registry());
    info!("📋 {} command path(s) registered", registry.len());

    // Parse guild ID if provided for development mode
    let guild_id = config
        .discord_guild_id
        .as_ref()
        .and_then(|id| id.parse::<u64>().ok());

    let dispatcher = Dispatcher::new(registry.clone(), config.command_prefix.as_str())
        .with_mode(config.dispatch_mode);
    let handler = enable_command_context(dispatcher, Handler { registry, guild_id });

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    Ok(())
}
