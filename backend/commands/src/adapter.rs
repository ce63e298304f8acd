//! Type adaptation: raw input tokens → typed arguments.
//!
//! Each semantic parameter type maps to a conversion function. The registry
//! ships conversions for the built-in types; hosts can register their own
//! under `ParamType::Custom`.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::{CommandContext, DispatchOutcome};
use crate::types::{ArgumentValue, ParamType, ParameterKind, ParameterSpec};

/// Conversion from a raw token to a typed value. `None` reports a
/// conversion failure.
pub type AdapterFn = Arc<dyn Fn(&str, &CommandContext) -> Option<ArgumentValue> + Send + Sync>;

/// Maps a semantic parameter type to its conversion function.
pub struct TypeAdapterRegistry {
    adapters: HashMap<ParamType, AdapterFn>,
}

impl Default for TypeAdapterRegistry {
    fn default() -> Self {
        let mut registry = Self { adapters: HashMap::new() };

        registry.register(ParamType::Str, |raw, _| Some(ArgumentValue::Str(raw.to_string())));
        registry.register(ParamType::Int, |raw, _| {
            raw.parse::<i64>().ok().map(ArgumentValue::Int)
        });
        registry.register(ParamType::Float, |raw, _| {
            raw.parse::<f64>().ok().map(ArgumentValue::Float)
        });
        registry.register(ParamType::Bool, |raw, _| match raw.to_ascii_lowercase().as_str() {
            "true" => Some(ArgumentValue::Bool(true)),
            "false" => Some(ArgumentValue::Bool(false)),
            _ => None,
        });
        registry.register(ParamType::User, |raw, _| {
            Some(ArgumentValue::User(strip_reference(raw, '@')))
        });
        registry.register(ParamType::Channel, |raw, _| {
            Some(ArgumentValue::Channel(strip_reference(raw, '#')))
        });

        registry
    }
}

/// Normalize a mention-style reference (`<@123>`, `<@!123>`, `@name`,
/// `<#123>`, `#name`) down to the bare id or name.
fn strip_reference(raw: &str, sigil: char) -> String {
    let inner = raw
        .strip_prefix('<')
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(raw);
    inner
        .trim_start_matches(sigil)
        .trim_start_matches('!')
        .to_string()
}

impl TypeAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, ty: ParamType, adapter: F)
    where
        F: Fn(&str, &CommandContext) -> Option<ArgumentValue> + Send + Sync + 'static,
    {
        self.adapters.insert(ty, Arc::new(adapter));
    }

    pub fn contains(&self, ty: &ParamType) -> bool {
        self.adapters.contains_key(ty)
    }

    /// Convert the context's remaining raw tokens into the matched command's
    /// typed argument list.
    ///
    /// Cancels the run with a syntax error when a required token is missing,
    /// a conversion fails, or tokens are left over. On success the ordered
    /// argument list is written into the context.
    pub fn adapt(&self, ctx: &mut CommandContext) {
        let Some(command) = ctx.command().cloned() else {
            warn!("Adaptation invoked without a routed command");
            return;
        };

        let tokens: Vec<String> = ctx.argument_tokens().to_vec();
        let mut arguments = Vec::new();
        let mut consumed = 0;

        for param in &command.parameters {
            let ParameterKind::Adapted { ty, remainder } = &param.kind else {
                continue;
            };

            let raw = if *remainder {
                if consumed < tokens.len() {
                    let rest = tokens[consumed..].join(" ");
                    consumed = tokens.len();
                    Some(rest)
                } else {
                    None
                }
            } else if consumed < tokens.len() {
                let token = tokens[consumed].clone();
                consumed += 1;
                Some(token)
            } else {
                None
            };

            let raw = match raw {
                Some(raw) => raw,
                None if param.optional => {
                    match &param.default_value {
                        Some(default) => default.clone(),
                        None => {
                            arguments.push(ArgumentValue::Absent);
                            continue;
                        }
                    }
                }
                None => {
                    debug!(command = %command.name, parameter = %param.name, "Missing required argument");
                    ctx.cancel(DispatchOutcome::SyntaxError);
                    return;
                }
            };

            match self.convert(ty, param, &raw, ctx) {
                Some(value) => arguments.push(value),
                None => {
                    debug!(command = %command.name, parameter = %param.name, raw = %raw, "Argument conversion failed");
                    ctx.cancel(DispatchOutcome::SyntaxError);
                    return;
                }
            }
        }

        if consumed < tokens.len() {
            debug!(command = %command.name, surplus = tokens.len() - consumed, "Surplus arguments supplied");
            ctx.cancel(DispatchOutcome::SyntaxError);
            return;
        }

        ctx.arguments = Some(arguments);
    }

    fn convert(
        &self,
        ty: &ParamType,
        param: &ParameterSpec,
        raw: &str,
        ctx: &CommandContext,
    ) -> Option<ArgumentValue> {
        match self.adapters.get(ty) {
            Some(adapter) => adapter(raw, ctx),
            None => {
                // Registry build validates adapter coverage; reaching this is
                // an internal-consistency fault.
                warn!(parameter = %param.name, ty = %ty, "No adapter registered");
                None
            }
        }
    }
}
