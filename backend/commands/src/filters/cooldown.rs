//! Per-user, per-command cooldown tracking.
//!
//! The window is committed at filter-apply time, before adaptation and
//! execution are known to succeed: a run that later fails a syntax check or
//! throws in its handler still consumes the window. Hosts preferring
//! execute-gated commit can replace this registration with their own filter.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::debug;

use crate::context::{CommandContext, DispatchOutcome};
use crate::filter::Filter;

/// (user id, canonical command label) → expiry instant. Entries are never
/// swept; an expired entry is simply overwritten on the next permitted run.
type CooldownMap = HashMap<(String, String), Instant>;

pub struct CooldownFilter {
    entries: Arc<Mutex<CooldownMap>>,
}

impl CooldownFilter {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for CooldownFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Filter for CooldownFilter {
    fn name(&self) -> &str {
        "cooldown"
    }

    async fn apply(&self, ctx: &mut CommandContext) {
        let Some(command) = ctx.command().cloned() else {
            return;
        };
        let Some(spec) = command.cooldown else {
            return;
        };

        let key = (ctx.event.author.id.clone(), command.name.clone());
        let now = Instant::now();
        let mut entries = self.entries.lock().await;

        if let Some(expiry) = entries.get(&key) {
            if *expiry > now {
                let remaining = *expiry - now;
                debug!(command = %command.name, user = %key.0, ?remaining, "Cooldown active");
                ctx.cancel(DispatchOutcome::Cooldown { remaining });
                return;
            }
        }

        entries.insert(key, now + spec.duration());
    }
}
