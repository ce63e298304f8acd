//! Command, controller, and parameter definitions.
//!
//! Hosts describe their commands with plain descriptor values and a builder
//! API; `CommandRegistry::build` turns those into the immutable definitions
//! the pipeline works with.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::CommandHandler;

// ---------------------------------------------------------------------------
// Parameter types
// ---------------------------------------------------------------------------

/// Semantic type of an adapted parameter. Each variant must have a conversion
/// registered in the `TypeAdapterRegistry` at registry build time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Str,
    Int,
    Float,
    Bool,
    User,
    Channel,
    /// Host-defined type; resolved by name against custom adapter registrations.
    Custom(String),
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Str => write!(f, "String"),
            ParamType::Int => write!(f, "Integer"),
            ParamType::Float => write!(f, "Float"),
            ParamType::Bool => write!(f, "Boolean"),
            ParamType::User => write!(f, "User"),
            ParamType::Channel => write!(f, "Channel"),
            ParamType::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Whether a parameter is filled in by the framework or adapted from a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    /// Supplied by the dispatcher (the command event); never consumes a token.
    Injectable,
    /// Produced from a raw input token by a registered type adapter.
    Adapted {
        ty: ParamType,
        /// Consume the remainder of the token stream, joined by spaces.
        /// Only valid on the last parameter.
        remainder: bool,
    },
}

/// A constraint checked against the adapted value of one parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSpec {
    /// Name of a validator registered in the `ValidatorRegistry`.
    pub validator: String,
    /// Validator-specific payload, e.g. a numeric bound or a choice list.
    pub payload: serde_json::Value,
    /// User-facing message rendered when the constraint fails.
    pub message: String,
}

/// One parameter of a command, in declared order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    /// A missing token for an optional parameter is not a syntax error.
    pub optional: bool,
    /// Raw default adapted in place of a missing optional token.
    pub default_value: Option<String>,
    pub constraints: Vec<ConstraintSpec>,
}

impl ParameterSpec {
    /// The framework-injected command event parameter.
    pub fn injectable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Injectable,
            optional: false,
            default_value: None,
            constraints: Vec::new(),
        }
    }

    /// An adapted parameter of the given semantic type.
    pub fn adapted(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Adapted { ty, remainder: false },
            optional: false,
            default_value: None,
            constraints: Vec::new(),
        }
    }

    /// Mark this parameter as consuming the remainder of the token stream.
    pub fn remainder(mut self) -> Self {
        if let ParameterKind::Adapted { remainder, .. } = &mut self.kind {
            *remainder = true;
        }
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.optional = true;
        self.default_value = Some(value.into());
        self
    }

    pub fn with_constraint(
        mut self,
        validator: impl Into<String>,
        payload: serde_json::Value,
        message: impl Into<String>,
    ) -> Self {
        self.constraints.push(ConstraintSpec {
            validator: validator.into(),
            payload,
            message: message.into(),
        });
        self
    }

    pub fn is_adapted(&self) -> bool {
        matches!(self.kind, ParameterKind::Adapted { .. })
    }
}

// ---------------------------------------------------------------------------
// Cooldown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
}

/// Per-user minimum interval between permitted invocations of one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownSpec {
    pub amount: u64,
    pub unit: TimeUnit,
}

impl CooldownSpec {
    pub fn new(amount: u64, unit: TimeUnit) -> Self {
        Self { amount, unit }
    }

    pub fn duration(&self) -> Duration {
        match self.unit {
            TimeUnit::Millis => Duration::from_millis(self.amount),
            TimeUnit::Seconds => Duration::from_secs(self.amount),
            TimeUnit::Minutes => Duration::from_secs(self.amount * 60),
            TimeUnit::Hours => Duration::from_secs(self.amount * 3600),
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptors (host-supplied input)
// ---------------------------------------------------------------------------

/// Host-supplied description of one invocable command.
///
/// How the host produces these is out of scope; typically a static table
/// assembled once at startup.
#[derive(Clone)]
pub struct CommandDescriptor {
    /// Labels this command answers to; the first is canonical.
    pub labels: Vec<String>,
    pub parameters: Vec<ParameterSpec>,
    pub permissions: HashSet<String>,
    pub cooldown: Option<CooldownSpec>,
    /// Usage template; `{prefix}` is substituted at render time.
    pub usage: String,
    pub description: String,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new<I, S>(labels: I, handler: Arc<dyn CommandHandler>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            parameters: Vec::new(),
            permissions: HashSet::new(),
            cooldown: None,
            usage: String::new(),
            description: String::new(),
            handler,
        }
    }

    pub fn with_parameters<I>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = ParameterSpec>,
    {
        self.parameters = parameters.into_iter().collect();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_cooldown(mut self, cooldown: CooldownSpec) -> Self {
        self.cooldown = Some(cooldown);
        self
    }

    pub fn with_usage(mut self, usage: impl Into<String>) -> Self {
        self.usage = usage.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("labels", &self.labels)
            .field("parameters", &self.parameters)
            .field("permissions", &self.permissions)
            .field("cooldown", &self.cooldown)
            .finish_non_exhaustive()
    }
}

/// Host-supplied description of a controller: a named group of commands
/// sharing label prefixes and default settings.
#[derive(Clone)]
pub struct ControllerDescriptor {
    pub name: String,
    /// Prefix labels prepended to each command label. An empty string makes
    /// the command addressable without a controller prefix.
    pub labels: Vec<String>,
    /// Permissions required for every command in the group.
    pub permissions: HashSet<String>,
    pub available_in_dm: bool,
    pub commands: Vec<CommandDescriptor>,
}

impl ControllerDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: vec![String::new()],
            permissions: HashSet::new(),
            available_in_dm: true,
            commands: Vec::new(),
        }
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn guild_only(mut self) -> Self {
        self.available_in_dm = false;
        self
    }

    pub fn with_command(mut self, command: CommandDescriptor) -> Self {
        self.commands.push(command);
        self
    }
}

// ---------------------------------------------------------------------------
// Definitions (immutable after registry build)
// ---------------------------------------------------------------------------

/// One invocable command, fully resolved. Immutable for the registry's
/// lifetime.
pub struct CommandDefinition {
    /// Canonical full label (first controller label + first command label).
    pub name: String,
    /// Every full label this command answers to, lowercased.
    pub labels: Vec<String>,
    pub parameters: Vec<ParameterSpec>,
    pub permissions: HashSet<String>,
    pub cooldown: Option<CooldownSpec>,
    pub usage: String,
    pub description: String,
    pub available_in_dm: bool,
    /// Name of the owning controller.
    pub controller: String,
    pub(crate) handler: Arc<dyn CommandHandler>,
}

impl CommandDefinition {
    /// The adapted parameters in declared order, i.e. those that consume
    /// input tokens.
    pub fn adapted_parameters(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.parameters.iter().filter(|p| p.is_adapted())
    }
}

impl fmt::Debug for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDefinition")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("controller", &self.controller)
            .finish_non_exhaustive()
    }
}

/// A named group of command definitions. Immutable after registry build.
#[derive(Debug)]
pub struct ControllerDefinition {
    pub name: String,
    pub labels: Vec<String>,
    pub commands: Vec<Arc<CommandDefinition>>,
}

// ---------------------------------------------------------------------------
// Typed arguments
// ---------------------------------------------------------------------------

/// A typed argument produced by the adaptation step, passed positionally to
/// the handler.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// A user reference, normalized to a bare id.
    User(String),
    /// A channel reference, normalized to a bare id.
    Channel(String),
    /// A host-defined type, carried as the raw token.
    Custom { ty: String, raw: String },
    /// Missing optional parameter with no declared default.
    Absent,
}

impl ArgumentValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgumentValue::Str(s) | ArgumentValue::User(s) | ArgumentValue::Channel(s) => Some(s),
            ArgumentValue::Custom { raw, .. } => Some(raw),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArgumentValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ArgumentValue::Int(v) => Some(*v as f64),
            ArgumentValue::Float(v) => Some(*v),
            _ => None,
        }
    }
}
