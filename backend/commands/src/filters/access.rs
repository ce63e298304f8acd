//! Channel-type and permission checks applied once a command is matched.

use async_trait::async_trait;
use tracing::debug;

use crate::context::{CommandContext, DispatchOutcome};
use crate::filter::Filter;

/// Rejects guild-only commands invoked from a direct message.
pub struct ChannelTypeFilter;

#[async_trait]
impl Filter for ChannelTypeFilter {
    fn name(&self) -> &str {
        "channel_type"
    }

    async fn apply(&self, ctx: &mut CommandContext) {
        let Some(command) = ctx.command().cloned() else {
            return;
        };
        if ctx.event.is_direct_message() && !command.available_in_dm {
            debug!(command = %command.name, "Guild-only command invoked from DM");
            ctx.cancel(DispatchOutcome::WrongChannelType);
        }
    }
}

/// Rejects authors missing any of the matched command's required
/// permissions.
pub struct PermissionFilter;

#[async_trait]
impl Filter for PermissionFilter {
    fn name(&self) -> &str {
        "permission"
    }

    async fn apply(&self, ctx: &mut CommandContext) {
        let Some(command) = ctx.command().cloned() else {
            return;
        };
        if !command.permissions.is_subset(&ctx.event.author.permissions) {
            let missing: Vec<&String> = command
                .permissions
                .difference(&ctx.event.author.permissions)
                .collect();
            debug!(command = %command.name, author = %ctx.event.author.id, ?missing, "Insufficient permissions");
            ctx.cancel(DispatchOutcome::InsufficientPermissions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::{CommandRouter, Router};
    use crate::testutil::{context_for, dm_event, sample_registry};
    use chatforge_core::ScopeSettings;

    fn routed(content: &str) -> CommandContext {
        let registry = sample_registry();
        let mut ctx = context_for(content);
        CommandRouter.find_commands(&mut ctx, registry.commands());
        assert!(ctx.command().is_some(), "fixture input should route");
        ctx
    }

    #[tokio::test]
    async fn permission_filter_rejects_missing_permissions() {
        let mut ctx = routed("!mod ban @bob");
        PermissionFilter.apply(&mut ctx).await;
        assert_eq!(ctx.outcome(), Some(&DispatchOutcome::InsufficientPermissions));
    }

    #[tokio::test]
    async fn permission_filter_passes_privileged_author() {
        let mut ctx = routed("!mod ban @bob");
        ctx.event.author.permissions.insert("moderator".into());
        PermissionFilter.apply(&mut ctx).await;
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn unprivileged_command_needs_nothing() {
        let mut ctx = routed("!ping");
        PermissionFilter.apply(&mut ctx).await;
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn guild_only_command_rejected_in_dm() {
        let registry = sample_registry();
        let mut ctx = CommandContext::new(dm_event("!mod ban @bob"), ScopeSettings::default());
        CommandRouter.find_commands(&mut ctx, registry.commands());

        ChannelTypeFilter.apply(&mut ctx).await;
        assert_eq!(ctx.outcome(), Some(&DispatchOutcome::WrongChannelType));
    }

    #[tokio::test]
    async fn dm_capable_command_passes_in_dm() {
        let registry = sample_registry();
        let mut ctx = CommandContext::new(dm_event("!ping"), ScopeSettings::default());
        CommandRouter.find_commands(&mut ctx, registry.commands());

        ChannelTypeFilter.apply(&mut ctx).await;
        assert!(!ctx.is_cancelled());
    }
}
