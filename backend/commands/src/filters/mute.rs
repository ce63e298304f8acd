//! Mute checks applied before routing.
//!
//! Mute state lives in the per-scope settings; this filter only reads the
//! context. Bot authors are dropped silently, mutes render a reply.

use async_trait::async_trait;
use tracing::debug;

use crate::context::{CommandContext, DispatchOutcome};
use crate::filter::Filter;

pub struct MuteFilter;

#[async_trait]
impl Filter for MuteFilter {
    fn name(&self) -> &str {
        "mute"
    }

    async fn apply(&self, ctx: &mut CommandContext) {
        if ctx.event.author.bot && ctx.settings.ignore_bots {
            debug!(author = %ctx.event.author.id, "Dropping bot-authored event");
            ctx.cancel(DispatchOutcome::Ignored);
            return;
        }
        if ctx.settings.muted_guild {
            ctx.cancel(DispatchOutcome::GuildMuted);
            return;
        }
        if ctx.settings.muted_channels.contains(&ctx.event.channel_id) {
            ctx.cancel(DispatchOutcome::ChannelMuted);
            return;
        }
        if ctx.settings.muted_users.contains(&ctx.event.author.id) {
            ctx.cancel(DispatchOutcome::UserMuted);
        }
    }
}
