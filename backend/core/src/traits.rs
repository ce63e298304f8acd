use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

use crate::error::ChatError;
use crate::event::MessageEvent;
use crate::message::Message;
use crate::settings::ScopeSettings;

/// Outbound side of the platform client.
///
/// The dispatcher is the only pipeline component that calls this; handlers
/// reach it indirectly through their command event's `reply` helper.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver a message to the channel the event originated from.
    async fn send_reply(&self, event: &MessageEvent, message: Message) -> Result<(), ChatError>;

    /// Deliver a terminal error outcome.
    async fn send_error(&self, event: &MessageEvent, message: Message) -> Result<(), ChatError> {
        self.send_reply(event, message).await
    }

    /// Deliver the generic (all-controllers) help listing.
    async fn send_generic_help(
        &self,
        event: &MessageEvent,
        message: Message,
    ) -> Result<(), ChatError> {
        self.send_reply(event, message).await
    }

    /// Deliver help for one specific command.
    async fn send_specific_help(
        &self,
        event: &MessageEvent,
        message: Message,
    ) -> Result<(), ChatError> {
        self.send_reply(event, message).await
    }
}

/// Supplies the per-scope settings for an inbound event.
pub trait SettingsProvider: Send + Sync {
    fn settings_for(&self, event: &MessageEvent) -> ScopeSettings;
}

/// Static provider backed by a guild-id map with a shared fallback.
#[derive(Default)]
pub struct StaticSettings {
    fallback: ScopeSettings,
    guilds: HashMap<String, ScopeSettings>,
}

impl StaticSettings {
    pub fn new(fallback: ScopeSettings) -> Self {
        Self { fallback, guilds: HashMap::new() }
    }

    pub fn insert(&mut self, guild_id: impl Into<String>, settings: ScopeSettings) {
        self.guilds.insert(guild_id.into(), settings);
    }
}

impl SettingsProvider for StaticSettings {
    fn settings_for(&self, event: &MessageEvent) -> ScopeSettings {
        match event.guild_id.as_ref().and_then(|id| self.guilds.get(id)) {
            Some(settings) => settings.clone(),
            None => {
                debug!(guild = ?event.guild_id, "No scoped settings, using fallback");
                self.fallback.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Author, ChannelKind};

    #[test]
    fn static_settings_fall_back_to_default() {
        let mut provider = StaticSettings::default();
        provider.insert("guild-1", ScopeSettings::default().with_prefix("?"));

        let scoped = MessageEvent::new(
            Some("guild-1".into()),
            "c1",
            ChannelKind::GuildText,
            Author::new("u1", "alice"),
            "?ping",
        );
        let unscoped = MessageEvent::new(
            None,
            "dm",
            ChannelKind::DirectMessage,
            Author::new("u1", "alice"),
            "!ping",
        );

        assert_eq!(provider.settings_for(&scoped).prefix, "?");
        assert_eq!(provider.settings_for(&unscoped).prefix, "!");
    }
}
