//! Length and size bounds for text, lists and maps.
//!
//! All bounds are inclusive. Text length counts Unicode scalar values.

use serde_json::{json, Value};

use super::{unsupported, Checked, ConstraintValidator, Violation};
use crate::error::ApiErrorCode;
use crate::validation::ValidationContext;
use crate::value::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min: usize,
    max: usize,
}

impl Bounds {
    fn verify(&self) -> Result<(), String> {
        if self.min > self.max {
            return Err(format!("min {} is greater than max {}", self.min, self.max));
        }
        Ok(())
    }

    fn contains(&self, n: usize) -> bool {
        (self.min..=self.max).contains(&n)
    }

    fn violation(&self, code: ApiErrorCode, subject: &str, actual: usize) -> Violation {
        let message = match (self.min, self.max) {
            (min, usize::MAX) => format!("{} must be at least {}", subject, min),
            (0, max) => format!("{} must be at most {}", subject, max),
            (min, max) => format!("{} must be between {} and {}", subject, min, max),
        };
        Violation::new(code, message)
            .param("min", self.min)
            .param("max", self.max)
            .param("actual", actual)
    }

    fn describe(&self) -> Value {
        json!({ "min": self.min, "max": self.max })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLength {
    bounds: Bounds,
}

impl TextLength {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            bounds: Bounds { min, max },
        }
    }

    pub fn at_least(min: usize) -> Self {
        Self::new(min, usize::MAX)
    }

    pub fn at_most(max: usize) -> Self {
        Self::new(0, max)
    }
}

impl ConstraintValidator for TextLength {
    fn name(&self) -> &'static str {
        "TextLength"
    }

    fn verify(&self) -> Result<(), String> {
        self.bounds.verify()
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        let length = text.chars().count();
        if self.bounds.contains(length) {
            return Ok(None);
        }
        Ok(Some(self.bounds.violation(
            ApiErrorCode::StringLengthViolation,
            "Length",
            length,
        )))
    }

    fn describe(&self) -> Value {
        self.bounds.describe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArraySize {
    bounds: Bounds,
}

impl ArraySize {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            bounds: Bounds { min, max },
        }
    }

    pub fn at_least(min: usize) -> Self {
        Self::new(min, usize::MAX)
    }

    pub fn at_most(max: usize) -> Self {
        Self::new(0, max)
    }
}

impl ConstraintValidator for ArraySize {
    fn name(&self) -> &'static str {
        "ArraySize"
    }

    fn verify(&self) -> Result<(), String> {
        self.bounds.verify()
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let FieldValue::List(items) = value else {
            return Err(unsupported(self.name(), value));
        };
        if self.bounds.contains(items.len()) {
            return Ok(None);
        }
        Ok(Some(self.bounds.violation(
            ApiErrorCode::ArraySizeViolation,
            "Size",
            items.len(),
        )))
    }

    fn describe(&self) -> Value {
        self.bounds.describe()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapSize {
    bounds: Bounds,
}

impl MapSize {
    pub fn new(min: usize, max: usize) -> Self {
        Self {
            bounds: Bounds { min, max },
        }
    }
}

impl ConstraintValidator for MapSize {
    fn name(&self) -> &'static str {
        "MapSize"
    }

    fn verify(&self) -> Result<(), String> {
        self.bounds.verify()
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let FieldValue::Map(entries) = value else {
            return Err(unsupported(self.name(), value));
        };
        if self.bounds.contains(entries.len()) {
            return Ok(None);
        }
        Ok(Some(self.bounds.violation(
            ApiErrorCode::MapSizeViolation,
            "Size",
            entries.len(),
        )))
    }

    fn describe(&self) -> Value {
        self.bounds.describe()
    }
}
