//! The dispatcher: one full pipeline run per inbound event.
//!
//! Sequences the filter phases, routing, adaptation, and handler invocation,
//! and is the only component that talks to the render factories and the
//! message sender. Every other stage communicates through the context.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use chatforge_core::{Message, MessageEvent, MessageSender, ScopeSettings, SettingsProvider};

use crate::adapter::TypeAdapterRegistry;
use crate::context::{CommandContext, DispatchOutcome};
use crate::filter::{Filter, FilterPhase, FilterRegistry};
use crate::registry::CommandRegistry;
use crate::render::{
    DefaultErrorMessageFactory, DefaultHelpMessageFactory, ErrorMessageFactory,
    HelpMessageFactory,
};
use crate::router::{CommandRouter, Router};
use crate::types::{ArgumentValue, CommandDefinition};
use crate::validation::ValidatorRegistry;

// ---------------------------------------------------------------------------
// Handler seam
// ---------------------------------------------------------------------------

/// The framework-injected value handed to every handler: the inbound event
/// plus the resolved command and settings, with a reply path back to the
/// platform client.
#[derive(Clone)]
pub struct CommandEvent {
    pub event: MessageEvent,
    pub command: Arc<CommandDefinition>,
    pub settings: ScopeSettings,
    sender: Arc<dyn MessageSender>,
}

impl CommandEvent {
    pub async fn reply(&self, content: impl Into<String> + Send) -> Result<()> {
        self.sender
            .send_reply(&self.event, Message::plain(content))
            .await
            .map_err(Into::into)
    }

    pub async fn reply_message(&self, message: Message) -> Result<()> {
        self.sender.send_reply(&self.event, message).await.map_err(Into::into)
    }
}

/// The entry point a command definition references.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    /// Invoked with the adapted arguments in declared parameter order.
    /// Errors are caught by the dispatcher, logged, and rendered as a
    /// generic failure; they never escape the dispatch run.
    async fn invoke(&self, event: CommandEvent, args: Vec<ArgumentValue>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Owns the dispatch pipeline. One explicitly constructed instance per host;
/// start/stop lifecycle is the host's concern.
pub struct CommandDispatcher {
    registry: CommandRegistry,
    adapters: Arc<TypeAdapterRegistry>,
    filters: FilterRegistry,
    router: Box<dyn Router>,
    errors: Box<dyn ErrorMessageFactory>,
    help: Box<dyn HelpMessageFactory>,
    settings: Arc<dyn SettingsProvider>,
    sender: Arc<dyn MessageSender>,
}

impl CommandDispatcher {
    /// A dispatcher with the default router, render factories, and built-in
    /// filter chain.
    pub fn new(
        registry: CommandRegistry,
        adapters: Arc<TypeAdapterRegistry>,
        validators: Arc<ValidatorRegistry>,
        settings: Arc<dyn SettingsProvider>,
        sender: Arc<dyn MessageSender>,
    ) -> Self {
        Self {
            registry,
            adapters,
            filters: FilterRegistry::with_defaults(validators),
            router: Box::new(CommandRouter),
            errors: Box::new(DefaultErrorMessageFactory),
            help: Box::new(DefaultHelpMessageFactory),
            settings,
            sender,
        }
    }

    pub fn with_router(mut self, router: Box<dyn Router>) -> Self {
        self.router = router;
        self
    }

    pub fn with_filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_error_factory(mut self, factory: Box<dyn ErrorMessageFactory>) -> Self {
        self.errors = factory;
        self
    }

    pub fn with_help_factory(mut self, factory: Box<dyn HelpMessageFactory>) -> Self {
        self.help = factory;
        self
    }

    /// Register an additional filter behind the built-in chain of its phase.
    pub fn register_filter(&mut self, phase: FilterPhase, filter: Arc<dyn Filter>) {
        self.filters.register(phase, filter);
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Run the full pipeline for one inbound event.
    ///
    /// Infallible from the caller's perspective: every command-level failure
    /// is rendered through the error factory, and delivery failures are
    /// logged.
    pub async fn dispatch(&self, event: MessageEvent) {
        let settings = self.settings.settings_for(&event);
        let mut ctx = CommandContext::new(event, settings);

        debug!("Applying filters in phase BEFORE_ROUTING");
        if self.run_phase(FilterPhase::BeforeRouting, &mut ctx).await {
            return;
        }

        self.router.find_commands(&mut ctx, self.registry.commands());

        if ctx.help_requested() && ctx.command().is_none() {
            debug!("Sending generic help");
            let message = self.help.generic_help(self.registry.controllers(), &ctx);
            if let Err(err) = self.sender.send_generic_help(&ctx.event, message).await {
                warn!(error = %err, "Failed to deliver generic help");
            }
            return;
        }

        if self.check_cancelled(&ctx).await {
            debug!("No matching command found");
            return;
        }

        let Some(command) = ctx.command().cloned() else {
            // The router guarantees a command or an outcome; anything else
            // is an internal-consistency fault.
            warn!("Router produced neither a command nor an outcome");
            return;
        };
        debug!(command = %command.name, "Input matched command");

        if ctx.help_requested() {
            debug!("Sending specific help");
            let message = self.help.specific_help(&ctx);
            if let Err(err) = self.sender.send_specific_help(&ctx.event, message).await {
                warn!(error = %err, "Failed to deliver specific help");
            }
            return;
        }

        debug!("Applying filters in phase BEFORE_ADAPTING");
        if self.run_phase(FilterPhase::BeforeAdapting, &mut ctx).await {
            return;
        }

        self.adapters.adapt(&mut ctx);
        if self.check_cancelled(&ctx).await {
            return;
        }

        debug!("Applying filters in phase BEFORE_EXECUTION");
        if self.run_phase(FilterPhase::BeforeExecution, &mut ctx).await {
            return;
        }

        info!(command = %command.name, user = %ctx.event.author.name, "Executing command");
        let arguments = ctx.arguments.take().unwrap_or_default();
        let command_event = CommandEvent {
            event: ctx.event.clone(),
            command: Arc::clone(&command),
            settings: ctx.settings.clone(),
            sender: Arc::clone(&self.sender),
        };

        if let Err(err) = command.handler.invoke(command_event, arguments).await {
            error!(command = %command.name, error = ?err, "Command execution failed");
            ctx.cancel(DispatchOutcome::ExecutionFailed { detail: err.to_string() });
            self.check_cancelled(&ctx).await;
        }
    }

    /// Apply one phase in registration order, stopping at the first filter
    /// that cancels. Returns whether the run is over.
    async fn run_phase(&self, phase: FilterPhase, ctx: &mut CommandContext) -> bool {
        for filter in self.filters.get(phase) {
            filter.apply(ctx).await;
            if self.check_cancelled(ctx).await {
                debug!(filter = filter.name(), ?phase, "Filter cancelled the run");
                return true;
            }
        }
        false
    }

    /// Render and deliver the context's outcome, if any. Returns whether the
    /// run is over.
    async fn check_cancelled(&self, ctx: &CommandContext) -> bool {
        let Some(outcome) = ctx.outcome() else {
            return false;
        };

        let message = match outcome {
            DispatchOutcome::Ignored => {
                debug!("Run ignored");
                return true;
            }
            DispatchOutcome::CommandNotFound => self.errors.command_not_found(ctx),
            DispatchOutcome::InsufficientPermissions => self.errors.insufficient_permissions(ctx),
            DispatchOutcome::GuildMuted => self.errors.guild_muted(ctx),
            DispatchOutcome::ChannelMuted => self.errors.channel_muted(ctx),
            DispatchOutcome::UserMuted => self.errors.user_muted(ctx),
            DispatchOutcome::WrongChannelType => self.errors.wrong_channel_type(ctx),
            DispatchOutcome::Cooldown { remaining } => self.errors.cooldown(ctx, *remaining),
            DispatchOutcome::ConstraintFailed { constraint } => {
                self.errors.constraint_failed(ctx, constraint)
            }
            DispatchOutcome::SyntaxError => self.errors.syntax_error(ctx),
            DispatchOutcome::ExecutionFailed { detail } => self.errors.execution_failed(ctx, detail),
        };

        if let Err(err) = self.sender.send_error(&ctx.event, message).await {
            warn!(error = %err, "Failed to deliver error message");
        }
        true
    }
}
