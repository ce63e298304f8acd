//! chatforge command dispatch.
//!
//! Takes a raw inbound chat event, resolves it against the command registry,
//! runs it through an ordered cancellable filter chain, adapts raw tokens
//! into typed arguments, and invokes the matched handler. Every terminal
//! outcome is rendered exactly once through the error/help factories.

pub mod adapter;
pub mod context;
pub mod dispatch;
pub mod filter;
pub mod filters;
pub mod registry;
pub mod render;
pub mod router;
pub mod types;
pub mod validation;

#[cfg(test)]
pub(crate) mod testutil;

pub use adapter::TypeAdapterRegistry;
pub use context::{CommandContext, DispatchOutcome};
pub use dispatch::{CommandDispatcher, CommandEvent, CommandHandler};
pub use filter::{Filter, FilterPhase, FilterRegistry};
pub use filters::{ChannelTypeFilter, ConstraintFilter, CooldownFilter, MuteFilter, PermissionFilter};
pub use registry::{CommandRegistry, DefinitionError};
pub use render::{
    DefaultErrorMessageFactory, DefaultHelpMessageFactory, ErrorMessageFactory, HelpMessageFactory,
};
pub use router::{CommandRouter, Router};
pub use types::{
    ArgumentValue, CommandDefinition, CommandDescriptor, ControllerDefinition,
    ControllerDescriptor, CooldownSpec, ParamType, ParameterKind, ParameterSpec, TimeUnit,
};
pub use validation::ValidatorRegistry;
