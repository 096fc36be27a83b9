use serde_json::{json, Value};

use super::{Checked, ConstraintValidator, Violation};
use crate::error::ApiErrorCode;
use crate::validation::ValidationContext;
use crate::value::FieldValue;

/// When a [`Required`] constraint demands a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Always,
    IfDependentNull,
    IfDependentNotNull,
}

impl Presence {
    fn as_str(&self) -> &'static str {
        match self {
            Presence::Always => "ALWAYS",
            Presence::IfDependentNull => "IF_DEPENDENT_NULL",
            Presence::IfDependentNotNull => "IF_DEPENDENT_NOT_NULL",
        }
    }
}

/// The value must be present, optionally depending on another field.
///
/// An unresolvable dependent path counts as null.
#[derive(Debug, Clone)]
pub struct Required {
    condition: Presence,
    dependent: Option<String>,
}

impl Required {
    pub fn always() -> Self {
        Self {
            condition: Presence::Always,
            dependent: None,
        }
    }

    /// Required when the field at `path` is null or missing.
    pub fn if_dependent_null(path: impl Into<String>) -> Self {
        Self {
            condition: Presence::IfDependentNull,
            dependent: Some(path.into()),
        }
    }

    /// Required when the field at `path` holds a value.
    pub fn if_dependent_not_null(path: impl Into<String>) -> Self {
        Self {
            condition: Presence::IfDependentNotNull,
            dependent: Some(path.into()),
        }
    }

    pub fn condition(&self) -> Presence {
        self.condition
    }

    fn triggered(&self, ctx: &ValidationContext<'_>) -> bool {
        let Some(path) = self.dependent.as_deref() else {
            return true;
        };
        let dependent_present = ctx.resolve(path).is_some_and(|v| !v.is_null());
        match self.condition {
            Presence::Always => true,
            Presence::IfDependentNull => !dependent_present,
            Presence::IfDependentNotNull => dependent_present,
        }
    }
}

impl ConstraintValidator for Required {
    fn name(&self) -> &'static str {
        "Required"
    }

    fn handles_absence(&self) -> bool {
        true
    }

    fn verify(&self) -> Result<(), String> {
        match (self.condition, self.dependent.as_deref()) {
            (Presence::Always, _) => Ok(()),
            (_, Some(path)) if !path.trim().is_empty() => Ok(()),
            _ => Err("conditional presence needs a dependent field".to_string()),
        }
    }

    fn validate(&self, value: &FieldValue<'_>, ctx: &ValidationContext<'_>) -> Checked {
        if !value.is_null() || !self.triggered(ctx) {
            return Ok(None);
        }
        let mut violation = Violation::new(ApiErrorCode::RequiredViolation, "Must not be null");
        if let Some(path) = &self.dependent {
            violation = violation.param("dependentField", path);
        }
        Ok(Some(violation))
    }

    fn describe(&self) -> Value {
        json!({
            "condition": self.condition.as_str(),
            "dependentField": self.dependent,
        })
    }
}
