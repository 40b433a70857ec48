//! Environment-driven configuration for the bot binary
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{anyhow, Result};
use std::env;

use crate::commands::dispatcher::DispatchMode;

/// Runtime configuration read from the process environment.
///
/// Call `dotenvy::dotenv()` first if values should come from a `.env` file.
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub log_level: String,
    /// Guild for instant slash-command registration during development
    pub discord_guild_id: Option<String>,
    pub dispatch_mode: DispatchMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| anyhow!("DISCORD_TOKEN must be set"))?;

        let command_prefix = env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string());
        if command_prefix.is_empty() {
            return Err(anyhow!("COMMAND_PREFIX must not be empty"));
        }

        let dispatch_mode = match env::var("DISPATCH_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => DispatchMode::default(),
        };

        Ok(Config {
            discord_token,
            command_prefix,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            discord_guild_id: env::var("DISCORD_GUILD_ID").ok().filter(|id| !id.is_empty()),
            dispatch_mode,
        })
    }
}
