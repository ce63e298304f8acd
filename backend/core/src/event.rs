use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// The kind of channel an event originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// A text channel inside a guild/server.
    GuildText,
    /// A one-on-one direct message channel.
    DirectMessage,
}

/// The author of an inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    /// Whether the author is another bot account.
    pub bot: bool,
    /// Permission names the author holds in the originating channel.
    pub permissions: HashSet<String>,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            bot: false,
            permissions: HashSet::new(),
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }
}

/// One inbound chat message, as delivered by the platform client.
///
/// Every dispatch run starts from exactly one of these; the engine never
/// parses the platform's wire format itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Absent for direct messages.
    pub guild_id: Option<String>,
    pub channel_id: String,
    pub channel_kind: ChannelKind,
    pub author: Author,
    pub content: String,
}

impl MessageEvent {
    pub fn new(
        guild_id: Option<String>,
        channel_id: impl Into<String>,
        channel_kind: ChannelKind,
        author: Author,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            guild_id,
            channel_id: channel_id.into(),
            channel_kind,
            author,
            content: content.into(),
        }
    }

    pub fn is_direct_message(&self) -> bool {
        self.channel_kind == ChannelKind::DirectMessage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guild_event(content: &str) -> MessageEvent {
        MessageEvent::new(
            Some("guild-1".into()),
            "channel-1",
            ChannelKind::GuildText,
            Author::new("user-1", "alice"),
            content,
        )
    }

    #[test]
    fn test_event_creation() {
        let event = guild_event("!ping");
        assert_eq!(event.guild_id.as_deref(), Some("guild-1"));
        assert_eq!(event.content, "!ping");
        assert!(!event.is_direct_message());
    }

    #[test]
    fn test_event_serialization() {
        let event = guild_event("!echo hello");
        let json = serde_json::to_string(&event).unwrap();
        let deserialized: MessageEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.id, event.id);
        assert_eq!(deserialized.content, "!echo hello");
        assert_eq!(deserialized.channel_kind, ChannelKind::GuildText);
    }
}
