use serde_json::{json, Value};

use super::{Checked, ConstraintValidator, Violation};
use crate::error::ApiErrorCode;
use crate::validation::ValidationContext;
use crate::value::FieldValue;

/// The value must differ from the field at `property`.
///
/// `property` is a dependent path (`sibling`, `address.city`,
/// `$.owner.id`). A missing or null dependent passes; values of different
/// kinds cannot be compared and report a dependency-type violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotEqualTo {
    property: String,
}

impl NotEqualTo {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }
}

impl ConstraintValidator for NotEqualTo {
    fn name(&self) -> &'static str {
        "NotEqualTo"
    }

    fn verify(&self) -> Result<(), String> {
        if self.property.trim().is_empty() {
            return Err("dependent property is empty".to_string());
        }
        Ok(())
    }

    fn validate(&self, value: &FieldValue<'_>, ctx: &ValidationContext<'_>) -> Checked {
        let Some(other) = ctx.resolve(&self.property).filter(|v| !v.is_null()) else {
            return Ok(None);
        };

        if value.kind() != other.kind() {
            return Ok(Some(
                Violation::new(
                    ApiErrorCode::DependencyTypeViolation,
                    format!("Cannot be compared with {}", self.property),
                )
                .param("property", &self.property)
                .param("expected", other.kind().name())
                .param("actual", value.kind().name()),
            ));
        }
        if value.same_as(&other) {
            return Ok(Some(
                Violation::new(
                    ApiErrorCode::InequalityViolation,
                    format!("Must not be equal to {}", self.property),
                )
                .param("property", &self.property),
            ));
        }
        Ok(None)
    }

    fn describe(&self) -> Value {
        json!({ "property": self.property })
    }
}
