//! Command registry: descriptor validation and the immutable catalog.
//!
//! `build` is the startup-time gate — a descriptor set that fails any check
//! here must stop the host from starting, as opposed to the per-event
//! outcomes the rest of the pipeline produces.

use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::adapter::TypeAdapterRegistry;
use crate::types::{
    CommandDefinition, ControllerDefinition, ControllerDescriptor, ParameterKind, ParameterSpec,
};
use crate::validation::ValidatorRegistry;

/// Startup-time fatal error raised while building the registry.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("duplicate command label '{label}' (commands '{first}' and '{second}')")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("command '{command}': no type adapter registered for parameter '{parameter}' of type {ty}")]
    UnknownParameterType {
        command: String,
        parameter: String,
        ty: String,
    },

    #[error("command '{command}': no validator registered for constraint '{validator}' on parameter '{parameter}'")]
    UnknownValidator {
        command: String,
        parameter: String,
        validator: String,
    },

    #[error("command '{command}': {message}")]
    InvalidDefinition { command: String, message: String },
}

/// Immutable catalog of controllers and commands. Safe for unsynchronized
/// concurrent reads once built.
#[derive(Debug)]
pub struct CommandRegistry {
    controllers: Vec<Arc<ControllerDefinition>>,
    commands: Vec<Arc<CommandDefinition>>,
}

impl CommandRegistry {
    /// Validate the supplied descriptors and build the catalog.
    ///
    /// Fails fast on the first violation: duplicate full label paths,
    /// parameters with no registered adapter, constraints with no registered
    /// validator, or malformed definitions.
    pub fn build(
        descriptors: Vec<ControllerDescriptor>,
        adapters: &TypeAdapterRegistry,
        validators: &ValidatorRegistry,
    ) -> Result<Self, DefinitionError> {
        let mut controllers = Vec::new();
        let mut commands: Vec<Arc<CommandDefinition>> = Vec::new();
        // Full label path → canonical name of the command that claimed it.
        let mut claimed: HashMap<String, String> = HashMap::new();

        for controller in descriptors {
            debug!(controller = %controller.name, "Building controller");
            let controller_labels = normalized_labels(&controller.labels);
            let mut members = Vec::new();

            for descriptor in controller.commands {
                let command_labels = normalized_labels(&descriptor.labels);
                let display = descriptor
                    .labels
                    .first()
                    .cloned()
                    .unwrap_or_else(|| format!("<unlabeled in {}>", controller.name));

                let full_labels = cross_product(&controller_labels, &command_labels);
                if full_labels.is_empty() {
                    return Err(DefinitionError::InvalidDefinition {
                        command: display,
                        message: "at least one non-empty label is required".into(),
                    });
                }
                let name = full_labels[0].clone();

                validate_parameters(&name, &descriptor.parameters, adapters, validators)?;

                for label in &full_labels {
                    if let Some(first) = claimed.get(label) {
                        return Err(DefinitionError::DuplicateLabel {
                            label: label.clone(),
                            first: first.clone(),
                            second: name,
                        });
                    }
                    claimed.insert(label.clone(), name.clone());
                }

                let mut permissions = controller.permissions.clone();
                permissions.extend(descriptor.permissions);

                let definition = Arc::new(CommandDefinition {
                    name,
                    labels: full_labels,
                    parameters: descriptor.parameters,
                    permissions,
                    cooldown: descriptor.cooldown,
                    usage: descriptor.usage,
                    description: descriptor.description,
                    available_in_dm: controller.available_in_dm,
                    controller: controller.name.clone(),
                    handler: descriptor.handler,
                });
                debug!(command = %definition.name, labels = ?definition.labels, "Registered command");
                members.push(Arc::clone(&definition));
                commands.push(definition);
            }

            controllers.push(Arc::new(ControllerDefinition {
                name: controller.name,
                labels: controller_labels,
                commands: members,
            }));
        }

        info!(
            controllers = controllers.len(),
            commands = commands.len(),
            "Command registry built"
        );
        Ok(Self { controllers, commands })
    }

    pub fn controllers(&self) -> &[Arc<ControllerDefinition>] {
        &self.controllers
    }

    pub fn commands(&self) -> &[Arc<CommandDefinition>] {
        &self.commands
    }
}

/// Lowercase and collapse inner whitespace; empty labels stay empty (they
/// mark prefix-free addressing).
fn normalized_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|l| {
            l.split_whitespace()
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase()
        })
        .collect()
}

/// Every controller label × command label combination, joined by a space,
/// minus combinations that collapse to nothing.
fn cross_product(controller_labels: &[String], command_labels: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    for ctrl in controller_labels {
        for cmd in command_labels {
            let full = match (ctrl.is_empty(), cmd.is_empty()) {
                (true, true) => continue,
                (true, false) => cmd.clone(),
                (false, true) => ctrl.clone(),
                (false, false) => format!("{ctrl} {cmd}"),
            };
            if !out.contains(&full) {
                out.push(full);
            }
        }
    }
    out
}

fn validate_parameters(
    command: &str,
    parameters: &[ParameterSpec],
    adapters: &TypeAdapterRegistry,
    validators: &ValidatorRegistry,
) -> Result<(), DefinitionError> {
    let last_adapted = parameters.iter().rposition(|p| p.is_adapted());

    for (index, param) in parameters.iter().enumerate() {
        if let ParameterKind::Adapted { ty, remainder } = &param.kind {
            if !adapters.contains(ty) {
                return Err(DefinitionError::UnknownParameterType {
                    command: command.to_string(),
                    parameter: param.name.clone(),
                    ty: ty.to_string(),
                });
            }
            if *remainder && last_adapted != Some(index) {
                return Err(DefinitionError::InvalidDefinition {
                    command: command.to_string(),
                    message: format!(
                        "remainder parameter '{}' must be the last adapted parameter",
                        param.name
                    ),
                });
            }
        }

        for constraint in &param.constraints {
            if !validators.contains(&constraint.validator) {
                return Err(DefinitionError::UnknownValidator {
                    command: command.to_string(),
                    parameter: param.name.clone(),
                    validator: constraint.validator.clone(),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::noop_handler;
    use crate::types::{CommandDescriptor, ParamType, ParameterSpec};
    use serde_json::json;

    fn build(descriptors: Vec<ControllerDescriptor>) -> Result<CommandRegistry, DefinitionError> {
        CommandRegistry::build(
            descriptors,
            &TypeAdapterRegistry::new(),
            &ValidatorRegistry::new(),
        )
    }

    #[test]
    fn duplicate_full_label_fails() {
        let descriptors = vec![
            ControllerDescriptor::new("a")
                .with_command(CommandDescriptor::new(["ping"], noop_handler())),
            ControllerDescriptor::new("b")
                .with_command(CommandDescriptor::new(["Ping"], noop_handler())),
        ];

        let err = build(descriptors).unwrap_err();
        assert!(matches!(err, DefinitionError::DuplicateLabel { label, .. } if label == "ping"));
    }

    #[test]
    fn unknown_parameter_type_fails() {
        let descriptors = vec![ControllerDescriptor::new("a").with_command(
            CommandDescriptor::new(["remind"], noop_handler()).with_parameters([
                ParameterSpec::adapted("when", ParamType::Custom("duration".into())),
            ]),
        )];

        let err = build(descriptors).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownParameterType { .. }));
    }

    #[test]
    fn unknown_validator_fails() {
        let descriptors = vec![ControllerDescriptor::new("a").with_command(
            CommandDescriptor::new(["roll"], noop_handler()).with_parameters([
                ParameterSpec::adapted("sides", ParamType::Int).with_constraint(
                    "prime",
                    json!(null),
                    "must be prime",
                ),
            ]),
        )];

        let err = build(descriptors).unwrap_err();
        assert!(matches!(err, DefinitionError::UnknownValidator { validator, .. } if validator == "prime"));
    }

    #[test]
    fn misplaced_remainder_fails() {
        let descriptors = vec![ControllerDescriptor::new("a").with_command(
            CommandDescriptor::new(["say"], noop_handler()).with_parameters([
                ParameterSpec::adapted("text", ParamType::Str).remainder(),
                ParameterSpec::adapted("count", ParamType::Int),
            ]),
        )];

        let err = build(descriptors).unwrap_err();
        assert!(matches!(err, DefinitionError::InvalidDefinition { .. }));
    }

    #[test]
    fn controller_prefix_produces_label_cross_product() {
        let descriptors = vec![
            ControllerDescriptor::new("moderation")
                .with_labels(["mod", ""])
                .with_permissions(["moderator"])
                .with_command(
                    CommandDescriptor::new(["ban", "b"], noop_handler())
                        .with_permissions(["ban_members"]),
                ),
        ];

        let registry = build(descriptors).unwrap();
        let command = &registry.commands()[0];
        assert_eq!(command.name, "mod ban");
        assert_eq!(command.labels, vec!["mod ban", "mod b", "ban", "b"]);
        assert!(command.permissions.contains("moderator"));
        assert!(command.permissions.contains("ban_members"));
    }

    #[test]
    fn views_expose_all_definitions() {
        let descriptors = vec![
            ControllerDescriptor::new("a")
                .with_command(CommandDescriptor::new(["ping"], noop_handler()))
                .with_command(CommandDescriptor::new(["echo"], noop_handler())),
        ];

        let registry = build(descriptors).unwrap();
        assert_eq!(registry.controllers().len(), 1);
        assert_eq!(registry.commands().len(), 2);
        assert_eq!(registry.controllers()[0].commands.len(), 2);
    }
}
