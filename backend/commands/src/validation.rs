//! Constraint validators for adapted arguments.
//!
//! A constraint names a validator and carries a validator-specific payload;
//! the built-ins cover numeric bounds and choice lists.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{ArgumentValue, ConstraintSpec};

/// Checks one adapted value against one constraint. Returns `false` when the
/// constraint is violated.
pub type ValidatorFn = Arc<dyn Fn(&ArgumentValue, &ConstraintSpec) -> bool + Send + Sync>;

/// Maps validator names to their check functions.
pub struct ValidatorRegistry {
    validators: HashMap<String, ValidatorFn>,
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        let mut registry = Self { validators: HashMap::new() };

        // Payload: the inclusive numeric bound.
        registry.register("min", |value, constraint| {
            match (value.as_f64(), constraint.payload.as_f64()) {
                (Some(value), Some(bound)) => value >= bound,
                _ => false,
            }
        });
        registry.register("max", |value, constraint| {
            match (value.as_f64(), constraint.payload.as_f64()) {
                (Some(value), Some(bound)) => value <= bound,
                _ => false,
            }
        });
        // Payload: an array of accepted string values.
        registry.register("one_of", |value, constraint| {
            let Some(value) = value.as_str() else { return false };
            constraint
                .payload
                .as_array()
                .is_some_and(|choices| choices.iter().any(|c| c.as_str() == Some(value)))
        });

        registry
    }
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: impl Into<String>, validator: F)
    where
        F: Fn(&ArgumentValue, &ConstraintSpec) -> bool + Send + Sync + 'static,
    {
        self.validators.insert(name.into(), Arc::new(validator));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ValidatorFn> {
        self.validators.get(name)
    }
}
