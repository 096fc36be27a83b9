//! Text format checks.

use std::sync::OnceLock;

use base64::Engine as _;
use regex::Regex;
use serde_json::{json, Value};

use super::{unsupported, Checked, ConstraintValidator, Violation};
use crate::error::{ApiErrorCode, EngineError};
use crate::validation::ValidationContext;
use crate::value::FieldValue;

/// The whole value must match a regular expression.
///
/// The expression is compiled on first use and cached for the lifetime of
/// the constraint.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    compiled: OnceLock<Regex>,
}

impl Pattern {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            compiled: OnceLock::new(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    fn regex(&self) -> Result<&Regex, regex::Error> {
        if let Some(regex) = self.compiled.get() {
            return Ok(regex);
        }
        let regex = Regex::new(&format!("^(?:{})$", self.source))?;
        Ok(self.compiled.get_or_init(|| regex))
    }
}

impl ConstraintValidator for Pattern {
    fn name(&self) -> &'static str {
        "Pattern"
    }

    fn verify(&self) -> Result<(), String> {
        self.regex().map(|_| ()).map_err(|e| e.to_string())
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        let regex = self
            .regex()
            .map_err(|e| EngineError::Misconfigured(format!("pattern '{}': {}", self.source, e)))?;
        if regex.is_match(text) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                ApiErrorCode::RegexViolation,
                format!("Must match pattern {}", self.source),
            )
            .param("pattern", &self.source),
        ))
    }

    fn describe(&self) -> Value {
        json!({ "pattern": self.source })
    }
}

/// Standard, padded base64.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Base64;

impl Base64 {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintValidator for Base64 {
    fn name(&self) -> &'static str {
        "Base64"
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        if base64::engine::general_purpose::STANDARD.decode(text).is_ok() {
            return Ok(None);
        }
        Ok(Some(Violation::new(
            ApiErrorCode::Base64FormatViolation,
            "Must be valid base64",
        )))
    }
}

/// `#` followed by three or six hex digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexColor;

impl HexColor {
    pub fn new() -> Self {
        Self
    }
}

fn is_hex_color(text: &str) -> bool {
    match text.strip_prefix('#') {
        Some(digits) => {
            matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
        }
        None => false,
    }
}

impl ConstraintValidator for HexColor {
    fn name(&self) -> &'static str {
        "HexColor"
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        if is_hex_color(text) {
            return Ok(None);
        }
        Ok(Some(Violation::new(
            ApiErrorCode::HexColorFormatViolation,
            "Must be a hex color",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupSet;

    #[test]
    fn test_pattern_matches_whole_value() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let pattern = Pattern::new("[a-z]+");
        assert!(pattern.verify().is_ok());
        assert_eq!(pattern.validate(&FieldValue::Text("abc"), &ctx), Ok(None));
        let violation = pattern
            .validate(&FieldValue::Text("abc1"), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(violation.code, ApiErrorCode::RegexViolation);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        assert!(Pattern::new("(unclosed").verify().is_err());
    }

    #[test]
    fn test_base64() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        assert_eq!(Base64.validate(&FieldValue::Text("aGVsbG8="), &ctx), Ok(None));
        assert!(Base64
            .validate(&FieldValue::Text("not base64!"), &ctx)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_hex_color() {
        assert!(is_hex_color("#fff"));
        assert!(is_hex_color("#1A2b3C"));
        assert!(!is_hex_color("fff"));
        assert!(!is_hex_color("#ffff"));
        assert!(!is_hex_color("#ggg"));
    }
}
