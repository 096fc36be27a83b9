//! Numeric bounds and divisibility.

use serde_json::{json, Value};

use super::{unsupported, Checked, ConstraintValidator, Violation};
use crate::error::{ApiErrorCode, EngineError};
use crate::validation::ValidationContext;
use crate::value::FieldValue;

const EPSILON: f64 = 1e-9;

fn number(constraint: &'static str, value: &FieldValue<'_>) -> Result<f64, EngineError> {
    value.as_f64().ok_or_else(|| unsupported(constraint, value))
}

fn finite(name: &str, n: f64) -> Result<(), String> {
    if n.is_finite() {
        Ok(())
    } else {
        Err(format!("{} must be finite", name))
    }
}

/// Lower bound; equality passes only when inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberMin {
    pub min: f64,
    pub inclusive: bool,
}

impl NumberMin {
    pub fn inclusive(min: f64) -> Self {
        Self {
            min,
            inclusive: true,
        }
    }

    pub fn exclusive(min: f64) -> Self {
        Self {
            min,
            inclusive: false,
        }
    }
}

impl ConstraintValidator for NumberMin {
    fn name(&self) -> &'static str {
        "NumberMin"
    }

    fn verify(&self) -> Result<(), String> {
        finite("min", self.min)
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let n = number(self.name(), value)?;
        let ok = if self.inclusive {
            n >= self.min
        } else {
            n > self.min
        };
        if ok {
            return Ok(None);
        }
        let message = if self.inclusive {
            format!("Must be greater than or equal to {}", self.min)
        } else {
            format!("Must be greater than {}", self.min)
        };
        Ok(Some(
            Violation::new(ApiErrorCode::MinValueViolation, message)
                .param("min", self.min)
                .param("value", n),
        ))
    }

    fn describe(&self) -> Value {
        json!({ "min": self.min, "inclusive": self.inclusive })
    }
}

/// Upper bound; equality passes only when inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumberMax {
    pub max: f64,
    pub inclusive: bool,
}

impl NumberMax {
    pub fn inclusive(max: f64) -> Self {
        Self {
            max,
            inclusive: true,
        }
    }

    pub fn exclusive(max: f64) -> Self {
        Self {
            max,
            inclusive: false,
        }
    }
}

impl ConstraintValidator for NumberMax {
    fn name(&self) -> &'static str {
        "NumberMax"
    }

    fn verify(&self) -> Result<(), String> {
        finite("max", self.max)
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let n = number(self.name(), value)?;
        let ok = if self.inclusive {
            n <= self.max
        } else {
            n < self.max
        };
        if ok {
            return Ok(None);
        }
        let message = if self.inclusive {
            format!("Must be less than or equal to {}", self.max)
        } else {
            format!("Must be less than {}", self.max)
        };
        Ok(Some(
            Violation::new(ApiErrorCode::MaxValueViolation, message)
                .param("max", self.max)
                .param("value", n),
        ))
    }

    fn describe(&self) -> Value {
        json!({ "max": self.max, "inclusive": self.inclusive })
    }
}

/// True when `value` is a whole multiple of `divisor` within [`EPSILON`].
///
/// A remainder just below the divisor also counts: `0.3 % 0.1` evaluates to
/// `0.09999999999999998`.
fn divides(value: f64, divisor: f64) -> bool {
    let divisor = divisor.abs();
    let remainder = (value % divisor).abs();
    remainder < EPSILON || (remainder - divisor).abs() < EPSILON
}

fn verify_divisor(divisor: f64) -> Result<(), String> {
    finite("divisor", divisor)?;
    if divisor == 0.0 {
        return Err("divisor must not be zero".to_string());
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DivisibleBy {
    pub divisor: f64,
}

impl DivisibleBy {
    pub fn new(divisor: f64) -> Self {
        Self { divisor }
    }
}

impl ConstraintValidator for DivisibleBy {
    fn name(&self) -> &'static str {
        "DivisibleBy"
    }

    fn verify(&self) -> Result<(), String> {
        verify_divisor(self.divisor)
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let n = number(self.name(), value)?;
        if divides(n, self.divisor) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                ApiErrorCode::DivisibleByViolation,
                format!("Must be divisible by {}", self.divisor),
            )
            .param("divisor", self.divisor),
        ))
    }

    fn describe(&self) -> Value {
        json!({ "divisor": self.divisor })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultipleOf {
    pub factor: f64,
}

impl MultipleOf {
    pub fn new(factor: f64) -> Self {
        Self { factor }
    }
}

impl ConstraintValidator for MultipleOf {
    fn name(&self) -> &'static str {
        "MultipleOf"
    }

    fn verify(&self) -> Result<(), String> {
        verify_divisor(self.factor)
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let n = number(self.name(), value)?;
        if divides(n, self.factor) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                ApiErrorCode::MultipleOfViolation,
                format!("Must be a multiple of {}", self.factor),
            )
            .param("factor", self.factor),
        ))
    }

    fn describe(&self) -> Value {
        json!({ "factor": self.factor })
    }
}
