//! Command handler trait and infrastructure
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.0.0: Handlers receive the unified invocation context; closures are handlers
//! - 1.0.0: Initial implementation for modular command handling

use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

use super::context::Context;

/// Trait for command, sub-command and sub-command-group handlers
///
/// Handlers are registered with a [`CommandRegistry`](super::registry::CommandRegistry)
/// and invoked by the dispatcher at most once per matching event. Any async closure
/// taking an `Arc<Context>` is a handler too.
///
/// # Example
///
/// ```ignore
/// pub struct PingHandler;
///
/// #[async_trait]
/// impl CommandHandler for PingHandler {
///     async fn run(&self, ctx: Arc<Context>) -> Result<()> {
///         ctx.respond_with("Pong!").await?;
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Handle one invocation
    ///
    /// Errors are returned to the dispatcher's caller untouched; send any
    /// user-facing error text before failing.
    async fn run(&self, ctx: Arc<Context>) -> Result<()>;
}

#[async_trait]
impl<F, Fut> CommandHandler for F
where
    F: Fn(Arc<Context>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn run(&self, ctx: Arc<Context>) -> Result<()> {
        (self)(ctx).await
    }
}

/// Box an async closure as a shareable handler
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn CommandHandler>
where
    F: Fn(Arc<Context>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    Arc::new(f)
}
