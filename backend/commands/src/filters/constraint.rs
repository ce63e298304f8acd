//! Constraint checks over the adapted argument list, applied just before
//! execution.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::context::{CommandContext, DispatchOutcome};
use crate::filter::Filter;
use crate::types::ArgumentValue;
use crate::validation::ValidatorRegistry;

pub struct ConstraintFilter {
    validators: Arc<ValidatorRegistry>,
}

impl ConstraintFilter {
    pub fn new(validators: Arc<ValidatorRegistry>) -> Self {
        Self { validators }
    }
}

#[async_trait]
impl Filter for ConstraintFilter {
    fn name(&self) -> &str {
        "constraint"
    }

    async fn apply(&self, ctx: &mut CommandContext) {
        let Some(command) = ctx.command().cloned() else {
            return;
        };
        let Some(arguments) = ctx.arguments.clone() else {
            return;
        };

        // The argument list holds one entry per adapted parameter, in
        // declared order.
        for (param, value) in command.adapted_parameters().zip(arguments.iter()) {
            if matches!(value, ArgumentValue::Absent) {
                continue;
            }
            for constraint in &param.constraints {
                let Some(validator) = self.validators.get(&constraint.validator) else {
                    // Registry build validates coverage; this is an
                    // internal-consistency fault.
                    warn!(validator = %constraint.validator, "No validator registered");
                    continue;
                };
                if !validator(value, constraint) {
                    debug!(
                        command = %command.name,
                        parameter = %param.name,
                        validator = %constraint.validator,
                        "Constraint failed"
                    );
                    ctx.cancel(DispatchOutcome::ConstraintFailed {
                        constraint: constraint.clone(),
                    });
                    return;
                }
            }
        }
    }
}
