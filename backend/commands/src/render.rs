//! Terminal-outcome rendering.
//!
//! One factory method per outcome kind; the dispatcher picks exactly one per
//! terminal run and forwards the result to the platform client. The default
//! implementations produce plain text; hosts swap in their own factories for
//! richer formats.

use std::sync::Arc;
use std::time::Duration;

use chatforge_core::Message;

use crate::context::CommandContext;
use crate::types::{CommandDefinition, ConstraintSpec, ControllerDefinition, ParameterKind};

/// Renders error outcomes. Implemented externally for platform-specific
/// output; the pipeline only ever hands the result to the message sender.
pub trait ErrorMessageFactory: Send + Sync {
    fn command_not_found(&self, ctx: &CommandContext) -> Message;
    fn insufficient_permissions(&self, ctx: &CommandContext) -> Message;
    fn guild_muted(&self, ctx: &CommandContext) -> Message;
    fn channel_muted(&self, ctx: &CommandContext) -> Message;
    fn user_muted(&self, ctx: &CommandContext) -> Message;
    fn syntax_error(&self, ctx: &CommandContext) -> Message;
    fn constraint_failed(&self, ctx: &CommandContext, constraint: &ConstraintSpec) -> Message;
    fn cooldown(&self, ctx: &CommandContext, remaining: Duration) -> Message;
    fn wrong_channel_type(&self, ctx: &CommandContext) -> Message;
    fn execution_failed(&self, ctx: &CommandContext, detail: &str) -> Message;
}

/// Renders help listings.
pub trait HelpMessageFactory: Send + Sync {
    /// Overview of every controller and its commands.
    fn generic_help(&self, controllers: &[Arc<ControllerDefinition>], ctx: &CommandContext) -> Message;
    /// Help for the single command resolved on the context.
    fn specific_help(&self, ctx: &CommandContext) -> Message;
}

/// `{prefix}` substitution for usage templates.
fn render_usage(command: &CommandDefinition, ctx: &CommandContext) -> String {
    if command.usage.is_empty() {
        format!("{}{}", ctx.settings.prefix, command.name)
    } else {
        command.usage.replace("{prefix}", &ctx.settings.prefix)
    }
}

/// The adapted parameter types of a command, for syntax-error diagnostics.
fn expected_types(command: &CommandDefinition) -> String {
    let types: Vec<String> = command
        .parameters
        .iter()
        .filter_map(|p| match &p.kind {
            ParameterKind::Adapted { ty, .. } => Some(ty.to_string()),
            ParameterKind::Injectable => None,
        })
        .collect();
    if types.is_empty() { "none".into() } else { types.join(", ") }
}

// ---------------------------------------------------------------------------
// Default text implementations
// ---------------------------------------------------------------------------

pub struct DefaultErrorMessageFactory;

impl ErrorMessageFactory for DefaultErrorMessageFactory {
    fn command_not_found(&self, ctx: &CommandContext) -> Message {
        let mut lines = vec!["Unknown command.".to_string()];
        if !ctx.possible_commands.is_empty() {
            let suggestions: Vec<String> = ctx
                .possible_commands
                .iter()
                .map(|c| format!("`{}{}`", ctx.settings.prefix, c.name))
                .collect();
            lines.push(format!("Did you mean: {}?", suggestions.join(", ")));
        }
        if let Some(help) = ctx.settings.help_labels.first() {
            lines.push(format!(
                "Type `{}{}` for an overview.",
                ctx.settings.prefix, help
            ));
        }
        Message::ephemeral(lines.join("\n"))
    }

    fn insufficient_permissions(&self, ctx: &CommandContext) -> Message {
        let text = match ctx.command() {
            Some(command) => {
                let mut permissions: Vec<&str> =
                    command.permissions.iter().map(String::as_str).collect();
                permissions.sort_unstable();
                format!(
                    "You are missing the permissions to use `{}{}`: {}",
                    ctx.settings.prefix,
                    command.name,
                    permissions.join(", ")
                )
            }
            None => "You are missing the permissions to use this command.".into(),
        };
        Message::ephemeral(text)
    }

    fn guild_muted(&self, _ctx: &CommandContext) -> Message {
        Message::ephemeral("Commands are muted in this server.")
    }

    fn channel_muted(&self, _ctx: &CommandContext) -> Message {
        Message::ephemeral("Commands are muted in this channel.")
    }

    fn user_muted(&self, _ctx: &CommandContext) -> Message {
        Message::ephemeral("You are muted; commands are unavailable.")
    }

    fn syntax_error(&self, ctx: &CommandContext) -> Message {
        let text = match ctx.command() {
            Some(command) => {
                let actual = ctx.argument_tokens().join(", ");
                format!(
                    "Syntax error.\nUsage: `{}`\nExpected: {}\nActual: {}",
                    render_usage(command, ctx),
                    expected_types(command),
                    if actual.is_empty() { "none".into() } else { actual },
                )
            }
            None => "Syntax error.".into(),
        };
        Message::ephemeral(text)
    }

    fn constraint_failed(&self, _ctx: &CommandContext, constraint: &ConstraintSpec) -> Message {
        Message::ephemeral(format!("Parameter check failed: {}", constraint.message))
    }

    fn cooldown(&self, _ctx: &CommandContext, remaining: Duration) -> Message {
        // Total hours, not hours-of-day: a 25h window must not read as 1h.
        let seconds = remaining.as_secs();
        let clock = format!(
            "{}:{:02}:{:02}",
            seconds / 3600,
            (seconds / 60) % 60,
            seconds % 60
        );
        Message::ephemeral(format!("You are on cooldown. Time remaining: {clock}"))
    }

    fn wrong_channel_type(&self, _ctx: &CommandContext) -> Message {
        Message::ephemeral("This command is not available in direct messages.")
    }

    fn execution_failed(&self, _ctx: &CommandContext, _detail: &str) -> Message {
        // Full detail goes to the operator log, never to the end user.
        Message::ephemeral("The command failed unexpectedly. Please try again later.")
    }
}

pub struct DefaultHelpMessageFactory;

impl HelpMessageFactory for DefaultHelpMessageFactory {
    fn generic_help(&self, controllers: &[Arc<ControllerDefinition>], ctx: &CommandContext) -> Message {
        let mut lines = vec!["Available commands:".to_string()];
        for controller in controllers {
            lines.push(format!("**{}**", controller.name));
            for command in &controller.commands {
                let description = if command.description.is_empty() {
                    String::new()
                } else {
                    format!(" — {}", command.description)
                };
                lines.push(format!(
                    "• `{}{}`{}",
                    ctx.settings.prefix, command.name, description
                ));
            }
        }
        Message::ephemeral(lines.join("\n"))
    }

    fn specific_help(&self, ctx: &CommandContext) -> Message {
        let Some(command) = ctx.command() else {
            return Message::ephemeral("No such command.");
        };
        let mut lines = vec![format!("**{}{}**", ctx.settings.prefix, command.name)];
        if !command.description.is_empty() {
            lines.push(command.description.clone());
        }
        lines.push(format!("Usage: `{}`", render_usage(command, ctx)));
        if command.labels.len() > 1 {
            let aliases: Vec<String> = command.labels[1..]
                .iter()
                .map(|l| format!("`{}{}`", ctx.settings.prefix, l))
                .collect();
            lines.push(format!("Aliases: {}", aliases.join(", ")));
        }
        Message::ephemeral(lines.join("\n"))
    }
}
