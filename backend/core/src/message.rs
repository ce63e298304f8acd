use serde::{Deserialize, Serialize};

/// An outbound chat message, as produced by a render factory or a handler
/// reply. Opaque to the pipeline; the platform client decides how to
/// materialize it (plain text, embed, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub content: String,
    /// Only visible to the invoking user, on platforms that support it.
    pub ephemeral: bool,
}

impl Message {
    pub fn plain(content: impl Into<String>) -> Self {
        Self { content: content.into(), ephemeral: false }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self { content: content.into(), ephemeral: true }
    }
}
