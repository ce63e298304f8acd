//! Ordered, cancellable checks applied around routing, adaptation, and
//! execution.
//!
//! Within a phase, filters run in registration order; the dispatcher stops
//! the phase (and the run) the instant one of them cancels the context.

use async_trait::async_trait;
use std::sync::Arc;

use crate::context::CommandContext;
use crate::filters::{
    ChannelTypeFilter, ConstraintFilter, CooldownFilter, MuteFilter, PermissionFilter,
};
use crate::validation::ValidatorRegistry;

/// The phase a filter is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    BeforeRouting,
    BeforeAdapting,
    BeforeExecution,
}

/// A pipeline check. May cancel the context; cancellation is terminal for
/// the run, so a filter must not retry or resume after cancelling.
#[async_trait]
pub trait Filter: Send + Sync {
    fn name(&self) -> &str;

    async fn apply(&self, ctx: &mut CommandContext);
}

/// Holds the registered filters per phase. Read-only after startup.
pub struct FilterRegistry {
    before_routing: Vec<Arc<dyn Filter>>,
    before_adapting: Vec<Arc<dyn Filter>>,
    before_execution: Vec<Arc<dyn Filter>>,
}

impl FilterRegistry {
    /// A registry with no filters at all.
    pub fn empty() -> Self {
        Self {
            before_routing: Vec::new(),
            before_adapting: Vec::new(),
            before_execution: Vec::new(),
        }
    }

    /// The built-in filter chain: mutes before routing; channel-type,
    /// permission, and cooldown checks before adapting; constraints before
    /// execution. The cooldown sits ahead of adaptation so its window
    /// commits even when the run later fails a syntax check.
    pub fn with_defaults(validators: Arc<ValidatorRegistry>) -> Self {
        let mut registry = Self::empty();
        registry.register(FilterPhase::BeforeRouting, Arc::new(MuteFilter));
        registry.register(FilterPhase::BeforeAdapting, Arc::new(ChannelTypeFilter));
        registry.register(FilterPhase::BeforeAdapting, Arc::new(PermissionFilter));
        registry.register(FilterPhase::BeforeAdapting, Arc::new(CooldownFilter::new()));
        registry.register(
            FilterPhase::BeforeExecution,
            Arc::new(ConstraintFilter::new(validators)),
        );
        registry
    }

    pub fn register(&mut self, phase: FilterPhase, filter: Arc<dyn Filter>) {
        self.phase_mut(phase).push(filter);
    }

    pub fn get(&self, phase: FilterPhase) -> &[Arc<dyn Filter>] {
        match phase {
            FilterPhase::BeforeRouting => &self.before_routing,
            FilterPhase::BeforeAdapting => &self.before_adapting,
            FilterPhase::BeforeExecution => &self.before_execution,
        }
    }

    fn phase_mut(&mut self, phase: FilterPhase) -> &mut Vec<Arc<dyn Filter>> {
        match phase {
            FilterPhase::BeforeRouting => &mut self.before_routing,
            FilterPhase::BeforeAdapting => &mut self.before_adapting,
            FilterPhase::BeforeExecution => &mut self.before_execution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    #[async_trait]
    impl Filter for Named {
        fn name(&self) -> &str {
            self.0
        }

        async fn apply(&self, _ctx: &mut CommandContext) {}
    }

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = FilterRegistry::empty();
        registry.register(FilterPhase::BeforeRouting, Arc::new(Named("first")));
        registry.register(FilterPhase::BeforeRouting, Arc::new(Named("second")));
        registry.register(FilterPhase::BeforeExecution, Arc::new(Named("third")));

        let names: Vec<&str> = registry
            .get(FilterPhase::BeforeRouting)
            .iter()
            .map(|f| f.name())
            .collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(registry.get(FilterPhase::BeforeAdapting).len(), 0);
        assert_eq!(registry.get(FilterPhase::BeforeExecution).len(), 1);
    }

    #[test]
    fn defaults_cover_all_phases() {
        let registry = FilterRegistry::with_defaults(Arc::new(ValidatorRegistry::new()));
        assert_eq!(registry.get(FilterPhase::BeforeRouting).len(), 1);
        assert_eq!(registry.get(FilterPhase::BeforeAdapting).len(), 3);
        assert_eq!(registry.get(FilterPhase::BeforeExecution).len(), 1);
    }

    #[test]
    fn cooldown_runs_before_adaptation() {
        // The cooldown window must commit before the adaptation step, so a
        // run that later fails a syntax check still consumes it.
        let registry = FilterRegistry::with_defaults(Arc::new(ValidatorRegistry::new()));
        let names: Vec<&str> = registry
            .get(FilterPhase::BeforeAdapting)
            .iter()
            .map(|f| f.name())
            .collect();
        assert!(names.contains(&"cooldown"));
    }
}
