// Core layer - configuration, error taxonomy, response payloads
pub mod core;

// Routing layer - registry, option coercion, context and dispatch
pub mod commands;

// Gateway layer - inbound event shapes, transport, serenity adapter
pub mod gateway;

// Re-export core config for the binary
pub use crate::core::Config;

// Re-export the routing surface
pub use commands::{
    handler_fn, CommandHandler, CommandPath, CommandRegistry, Context, DispatchMode,
    DispatchOutcome, Dispatcher, OptionDeclaration, OptionKind, Prefix,
};
pub use crate::core::{Payload, RouterError};
pub use gateway::discord::{enable_command_context, CommandMiddleware};
