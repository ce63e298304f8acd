//! Per-run dispatch state.
//!
//! A `CommandContext` is created by the dispatcher for one inbound event and
//! is exclusively owned by that run. Every pipeline stage communicates its
//! outcome through the context; cancellation is terminal and monotonic.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use chatforge_core::{MessageEvent, ScopeSettings};

use crate::types::{ArgumentValue, CommandDefinition, ConstraintSpec};

// ---------------------------------------------------------------------------
// Outcome taxonomy
// ---------------------------------------------------------------------------

/// Terminal outcome of a cancelled dispatch run. Each rendered variant maps
/// to exactly one `ErrorMessageFactory` method.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Not a command attempt (no prefix, or ignored bot author). Terminates
    /// the run without rendering anything.
    Ignored,
    CommandNotFound,
    InsufficientPermissions,
    GuildMuted,
    ChannelMuted,
    UserMuted,
    WrongChannelType,
    Cooldown { remaining: Duration },
    ConstraintFailed { constraint: ConstraintSpec },
    SyntaxError,
    ExecutionFailed { detail: String },
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Mutable state of one dispatch run.
pub struct CommandContext {
    pub event: MessageEvent,
    pub settings: ScopeSettings,
    /// Tokens of the command attempt (label + arguments), written by the
    /// router. Empty until routed.
    pub input: Vec<String>,
    /// Candidates for help listings and not-found suggestions.
    pub possible_commands: Vec<Arc<CommandDefinition>>,
    /// Typed arguments, populated by the adaptation step.
    pub arguments: Option<Vec<ArgumentValue>>,
    command: Option<Arc<CommandDefinition>>,
    /// Tokens left over after the matched label, consumed by adaptation.
    arg_tokens: Vec<String>,
    help_requested: bool,
    outcome: Option<DispatchOutcome>,
}

impl CommandContext {
    pub fn new(event: MessageEvent, settings: ScopeSettings) -> Self {
        Self {
            event,
            settings,
            input: Vec::new(),
            possible_commands: Vec::new(),
            arguments: None,
            command: None,
            arg_tokens: Vec::new(),
            help_requested: false,
            outcome: None,
        }
    }

    /// Cancel the run with the given outcome. The first cancellation wins;
    /// later attempts are dropped so the flag stays monotonic.
    pub fn cancel(&mut self, outcome: DispatchOutcome) {
        if let Some(existing) = &self.outcome {
            debug!(?existing, dropped = ?outcome, "Run already cancelled, keeping first outcome");
            return;
        }
        self.outcome = Some(outcome);
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn outcome(&self) -> Option<&DispatchOutcome> {
        self.outcome.as_ref()
    }

    pub fn request_help(&mut self) {
        self.help_requested = true;
    }

    pub fn help_requested(&self) -> bool {
        self.help_requested
    }

    /// The resolved command, if the router has matched one.
    pub fn command(&self) -> Option<&Arc<CommandDefinition>> {
        self.command.as_ref()
    }

    pub(crate) fn set_command(&mut self, command: Arc<CommandDefinition>, arg_tokens: Vec<String>) {
        self.command = Some(command);
        self.arg_tokens = arg_tokens;
    }

    /// The raw tokens supplied as arguments to the matched command.
    pub fn argument_tokens(&self) -> &[String] {
        &self.arg_tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatforge_core::{Author, ChannelKind};

    fn context() -> CommandContext {
        let event = MessageEvent::new(
            Some("g1".into()),
            "c1",
            ChannelKind::GuildText,
            Author::new("u1", "alice"),
            "!ping",
        );
        CommandContext::new(event, ScopeSettings::default())
    }

    #[test]
    fn first_cancellation_wins() {
        let mut ctx = context();
        assert!(!ctx.is_cancelled());

        ctx.cancel(DispatchOutcome::GuildMuted);
        ctx.cancel(DispatchOutcome::CommandNotFound);

        assert!(ctx.is_cancelled());
        assert_eq!(ctx.outcome(), Some(&DispatchOutcome::GuildMuted));
    }

    #[test]
    fn help_flag_starts_unset() {
        let mut ctx = context();
        assert!(!ctx.help_requested());
        ctx.request_help();
        assert!(ctx.help_requested());
    }
}
