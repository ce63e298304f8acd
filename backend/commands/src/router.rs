//! Input routing: match tokenized input against registered command labels.
//!
//! Produces exactly one matched command, a help request, a not-found
//! cancellation carrying suggestions, or a silent ignore for ordinary
//! chatter.

use std::sync::Arc;
use tracing::debug;

use crate::context::{CommandContext, DispatchOutcome};
use crate::types::CommandDefinition;

/// Maximum edit distance between an attempted label and a command label's
/// first token for the command to be suggested.
const SUGGESTION_DISTANCE: usize = 2;

/// Matches an inbound context against the registry's commands. Replaceable
/// by hosts that want different matching rules.
pub trait Router: Send + Sync {
    fn find_commands(&self, ctx: &mut CommandContext, commands: &[Arc<CommandDefinition>]);
}

/// Default router: longest exact label match, case-insensitive, with
/// prefix/edit-distance suggestions on miss.
#[derive(Default)]
pub struct CommandRouter;

impl Router for CommandRouter {
    fn find_commands(&self, ctx: &mut CommandContext, commands: &[Arc<CommandDefinition>]) {
        let content = ctx.event.content.trim().to_string();

        let stripped = match content.strip_prefix(&ctx.settings.prefix) {
            Some(rest) => rest.to_string(),
            None => {
                // An un-prefixed help label still opens help; everything
                // else is ordinary chatter, not a command attempt.
                let first = content.split_whitespace().next().unwrap_or("");
                if ctx.settings.is_help_label(first) {
                    content
                } else {
                    debug!("Input does not start with prefix, ignoring");
                    ctx.cancel(DispatchOutcome::Ignored);
                    return;
                }
            }
        };

        let mut tokens: Vec<String> = stripped.split_whitespace().map(str::to_string).collect();

        if tokens.is_empty() {
            // A bare prefix reads as a help request.
            ctx.request_help();
            return;
        }

        if ctx.settings.is_help_label(&tokens[0]) {
            ctx.request_help();
            tokens.remove(0);
            if tokens.is_empty() {
                return;
            }
        }

        ctx.input = tokens.clone();
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        // Longest leading token sequence wins; an exact full-path match is
        // always preferred over any shorter label.
        for length in (1..=lowered.len()).rev() {
            let attempt = lowered[..length].join(" ");
            if let Some(command) = commands
                .iter()
                .find(|c| c.labels.iter().any(|label| *label == attempt))
            {
                debug!(command = %command.name, label = %attempt, "Input matched command");
                ctx.set_command(Arc::clone(command), tokens[length..].to_vec());
                return;
            }
        }

        let attempted = &lowered[0];
        let suggestions = suggest(attempted, commands);
        debug!(attempted = %attempted, suggestions = suggestions.len(), "No command matched");
        ctx.possible_commands = suggestions;

        if ctx.help_requested() {
            // `help <unknown>` falls back to the generic listing.
            return;
        }
        ctx.cancel(DispatchOutcome::CommandNotFound);
    }
}

/// Commands whose label heads share a prefix with, or sit within a small
/// edit distance of, the attempted label. Partial matches never resolve a
/// command; they only feed this suggestion set.
fn suggest(attempted: &str, commands: &[Arc<CommandDefinition>]) -> Vec<Arc<CommandDefinition>> {
    let mut out: Vec<Arc<CommandDefinition>> = Vec::new();
    for command in commands {
        let close = command.labels.iter().any(|label| {
            let head = label.split_whitespace().next().unwrap_or(label);
            head.starts_with(attempted) || levenshtein(head, attempted) <= SUGGESTION_DISTANCE
        });
        if close && !out.iter().any(|c| Arc::ptr_eq(c, command)) {
            out.push(Arc::clone(command));
        }
    }
    out
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{context_for, sample_registry};

    fn route(content: &str) -> CommandContext {
        let registry = sample_registry();
        let mut ctx = context_for(content);
        CommandRouter.find_commands(&mut ctx, registry.commands());
        ctx
    }

    #[test]
    fn exact_label_resolves_single_command() {
        let ctx = route("!ping");
        assert_eq!(ctx.command().unwrap().name, "ping");
        assert!(ctx.possible_commands.is_empty());
        assert!(!ctx.is_cancelled());
        assert!(ctx.argument_tokens().is_empty());
    }

    #[test]
    fn matching_is_case_insensitive() {
        let ctx = route("!PING");
        assert_eq!(ctx.command().unwrap().name, "ping");
    }

    #[test]
    fn near_miss_produces_suggestions() {
        let ctx = route("!pong");
        assert!(ctx.command().is_none());
        assert_eq!(ctx.outcome(), Some(&DispatchOutcome::CommandNotFound));
        assert!(ctx.possible_commands.iter().any(|c| c.name == "ping"));
    }

    #[test]
    fn longest_label_path_wins() {
        let ctx = route("!mod ban @bob spamming");
        assert_eq!(ctx.command().unwrap().name, "mod ban");
        assert_eq!(ctx.argument_tokens(), ["@bob", "spamming"]);
    }

    #[test]
    fn alias_without_controller_prefix_matches() {
        let ctx = route("!ban @bob");
        assert_eq!(ctx.command().unwrap().name, "mod ban");
    }

    #[test]
    fn unprefixed_chatter_is_ignored() {
        let ctx = route("good morning everyone");
        assert_eq!(ctx.outcome(), Some(&DispatchOutcome::Ignored));
        assert!(!ctx.help_requested());
    }

    #[test]
    fn bare_help_label_requests_generic_help() {
        for input in ["!help", "help", "!"] {
            let ctx = route(input);
            assert!(ctx.help_requested(), "input {input:?} should request help");
            assert!(ctx.command().is_none());
            assert!(!ctx.is_cancelled());
        }
    }

    #[test]
    fn help_with_label_resolves_command() {
        let ctx = route("!help ping");
        assert!(ctx.help_requested());
        assert_eq!(ctx.command().unwrap().name, "ping");
    }

    #[test]
    fn help_with_unknown_label_stays_generic() {
        let ctx = route("!help pong");
        assert!(ctx.help_requested());
        assert!(ctx.command().is_none());
        assert!(!ctx.is_cancelled());
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("ping", "ping"), 0);
        assert_eq!(levenshtein("ping", "pong"), 1);
        assert_eq!(levenshtein("ping", "pint"), 1);
        assert_eq!(levenshtein("ping", ""), 4);
        assert_eq!(levenshtein("kick", "ban"), 4);
    }
}
