//! # Command System
//!
//! Prefixed-message and slash-command routing over one registry.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.2.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Unified message/interaction routing with option coercion and dispatch modes
//! - 2.1.0: Add modular handler infrastructure (handler trait, context, registry)
//! - 2.0.0: Remove bang commands, slash-only command system
//! - 1.0.0: Initial reorganization with modular command structure

pub mod context;
pub mod dispatcher;
pub mod handler;
pub mod normalizer;
pub mod options;
pub mod registry;
pub mod resolver;
pub mod tokenizer;

// Re-export handler infrastructure
pub use context::{Context, InvocationSource, DEFAULT_WHISPER_DELAY};
pub use dispatcher::{DispatchMode, DispatchOutcome, Dispatcher, Prefix, PrefixResolver};
pub use handler::{handler_fn, CommandHandler};
pub use options::{OptionDeclaration, OptionKind, OptionSlot, OptionValue};
pub use registry::{CommandEntry, CommandPath, CommandRegistry, EntryKind};
pub use resolver::{OptionKey, OptionResolver};
