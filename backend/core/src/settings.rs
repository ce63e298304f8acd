use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Per-scope (typically per-guild) dispatch settings.
///
/// Read-only from the pipeline's perspective; a `SettingsProvider` resolves
/// one of these for every inbound event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSettings {
    /// Command prefix, e.g. `!` or `/`.
    pub prefix: String,
    /// Labels that trigger help instead of command execution.
    pub help_labels: Vec<String>,
    /// Drop events authored by other bots without rendering anything.
    pub ignore_bots: bool,
    /// Whole-guild mute switch.
    pub muted_guild: bool,
    /// Channel ids muted for command dispatch.
    pub muted_channels: HashSet<String>,
    /// User ids muted for command dispatch.
    pub muted_users: HashSet<String>,
}

impl Default for ScopeSettings {
    fn default() -> Self {
        Self {
            prefix: "!".into(),
            help_labels: vec!["help".into()],
            ignore_bots: true,
            muted_guild: false,
            muted_channels: HashSet::new(),
            muted_users: HashSet::new(),
        }
    }
}

impl ScopeSettings {
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Whether `token` is one of the configured help labels (case-insensitive).
    pub fn is_help_label(&self, token: &str) -> bool {
        self.help_labels.iter().any(|l| l.eq_ignore_ascii_case(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let settings = ScopeSettings::default();
        assert_eq!(settings.prefix, "!");
        assert!(settings.ignore_bots);
        assert!(!settings.muted_guild);
    }

    #[test]
    fn help_label_match_ignores_case() {
        let settings = ScopeSettings::default();
        assert!(settings.is_help_label("help"));
        assert!(settings.is_help_label("HELP"));
        assert!(!settings.is_help_label("halp"));
    }
}
