//! Allowed and forbidden value sets.
//!
//! Entries are given as text. A numeric value matches an entry that parses
//! to the same number, so `ValueIn` with `"1"` or `"1.0"` accepts the integer
//! `1` and the decimal `1.0`. Other values match on their text rendering. A
//! list value is checked element by element.

use indexmap::IndexSet;
use serde_json::{json, Value};

use super::{unsupported, Checked, ConstraintValidator, Violation};
use crate::error::{ApiErrorCode, EngineError};
use crate::validation::ValidationContext;
use crate::value::FieldValue;

fn value_set<I, S>(values: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

fn joined(values: &IndexSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Number {
    Exact(i128),
    Approx(f64),
}

impl Number {
    fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(n) = text.parse::<i128>() {
            return Some(Number::Exact(n));
        }
        text.parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Number::Approx)
    }

    fn of(value: &FieldValue<'_>) -> Option<Self> {
        match value {
            FieldValue::Integer(n) => Some(Number::Exact(i128::from(*n))),
            FieldValue::Unsigned(n) => Some(Number::Exact(i128::from(*n))),
            FieldValue::Decimal(n) => Some(Number::Approx(*n)),
            _ => None,
        }
    }

    fn equals(self, other: Number) -> bool {
        match (self, other) {
            (Number::Exact(a), Number::Exact(b)) => a == b,
            (a, b) => a.to_f64() == b.to_f64(),
        }
    }

    fn to_f64(self) -> f64 {
        match self {
            Number::Exact(n) => n as f64,
            Number::Approx(n) => n,
        }
    }
}

/// Entries as given plus the numeric ones parsed once.
#[derive(Debug, Clone, PartialEq)]
struct ValueSet {
    texts: IndexSet<String>,
    numbers: Vec<Number>,
}

impl ValueSet {
    fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts = value_set(values);
        let numbers = texts.iter().filter_map(|t| Number::parse(t)).collect();
        Self { texts, numbers }
    }

    fn contains(&self, value: &FieldValue<'_>, text: &str) -> bool {
        match Number::of(value) {
            Some(number) => self.numbers.iter().any(|n| n.equals(number)),
            None => self.texts.contains(text),
        }
    }

    /// The first scalar of `value` (or of its elements) for which `keep`
    /// returns false, rendered as text.
    fn first_rejected(
        &self,
        constraint: &'static str,
        value: &FieldValue<'_>,
        keep: impl Fn(bool) -> bool,
    ) -> Result<Option<String>, EngineError> {
        let items = match value {
            FieldValue::List(items) => items.as_slice(),
            other => std::slice::from_ref(other),
        };
        for item in items.iter().filter(|item| !item.is_null()) {
            let text = item
                .scalar_text()
                .ok_or_else(|| unsupported(constraint, item))?;
            if !keep(self.contains(item, &text)) {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn joined(&self) -> String {
        joined(&self.texts)
    }

    fn describe(&self) -> Value {
        json!({ "values": self.texts.iter().collect::<Vec<_>>() })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueIn {
    values: ValueSet,
}

impl ValueIn {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: ValueSet::new(values),
        }
    }
}

impl ConstraintValidator for ValueIn {
    fn name(&self) -> &'static str {
        "ValueIn"
    }

    fn verify(&self) -> Result<(), String> {
        if self.values.texts.is_empty() {
            return Err("allowed value set is empty".to_string());
        }
        Ok(())
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let Some(rejected) = self.values.first_rejected(self.name(), value, |found| found)? else {
            return Ok(None);
        };
        Ok(Some(
            Violation::new(
                ApiErrorCode::AllowedValueViolation,
                format!("Must be one of {}", self.values.joined()),
            )
            .param("values", self.values.joined())
            .param("value", rejected),
        ))
    }

    fn describe(&self) -> Value {
        self.values.describe()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueNotIn {
    values: ValueSet,
}

impl ValueNotIn {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: ValueSet::new(values),
        }
    }
}

impl ConstraintValidator for ValueNotIn {
    fn name(&self) -> &'static str {
        "ValueNotIn"
    }

    fn verify(&self) -> Result<(), String> {
        if self.values.texts.is_empty() {
            return Err("forbidden value set is empty".to_string());
        }
        Ok(())
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let Some(rejected) = self.values.first_rejected(self.name(), value, |found| !found)?
        else {
            return Ok(None);
        };
        Ok(Some(
            Violation::new(
                ApiErrorCode::ForbiddenValueViolation,
                format!("Must not be one of {}", self.values.joined()),
            )
            .param("values", self.values.joined())
            .param("value", rejected),
        ))
    }

    fn describe(&self) -> Value {
        self.values.describe()
    }
}

/// Text must name one of an enumeration's constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumValue {
    variants: IndexSet<String>,
    ignore_case: bool,
}

impl EnumValue {
    pub fn of<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            variants: value_set(variants),
            ignore_case: false,
        }
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    fn accepts(&self, text: &str) -> bool {
        if self.ignore_case {
            self.variants.iter().any(|v| v.eq_ignore_ascii_case(text))
        } else {
            self.variants.contains(text)
        }
    }
}

impl ConstraintValidator for EnumValue {
    fn name(&self) -> &'static str {
        "EnumValue"
    }

    fn verify(&self) -> Result<(), String> {
        if self.variants.is_empty() {
            return Err("enumeration has no variants".to_string());
        }
        Ok(())
    }

    fn validate(&self, value: &FieldValue<'_>, _ctx: &ValidationContext<'_>) -> Checked {
        let text = value.as_str().ok_or_else(|| unsupported(self.name(), value))?;
        if self.accepts(text) {
            return Ok(None);
        }
        Ok(Some(
            Violation::new(
                ApiErrorCode::EnumValueViolation,
                format!("Must be one of {}", joined(&self.variants)),
            )
            .param("values", joined(&self.variants)),
        ))
    }

    fn describe(&self) -> Value {
        json!({
            "values": self.variants.iter().collect::<Vec<_>>(),
            "ignoreCase": self.ignore_case,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::GroupSet;

    #[test]
    fn test_value_in() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let allowed = ValueIn::new(["A", "B"]);
        assert_eq!(allowed.validate(&FieldValue::Text("A"), &ctx), Ok(None));
        let violation = allowed.validate(&FieldValue::Text("C"), &ctx).unwrap().unwrap();
        assert_eq!(violation.code, ApiErrorCode::AllowedValueViolation);
        assert_eq!(violation.message, "Must be one of A, B");
    }

    #[test]
    fn test_value_in_matches_numbers_by_value() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let allowed = ValueIn::new(["1", "2"]);
        assert_eq!(allowed.validate(&FieldValue::Integer(2), &ctx), Ok(None));
        assert_eq!(allowed.validate(&FieldValue::Decimal(1.0), &ctx), Ok(None));
        let list = FieldValue::List(vec![FieldValue::Integer(1), FieldValue::Integer(3)]);
        let violation = allowed.validate(&list, &ctx).unwrap().unwrap();
        let rejected = violation.params.iter().find(|(name, _)| *name == "value");
        assert_eq!(rejected.map(|(_, v)| v.as_str()), Some("3"));

        let decimal = ValueIn::new(["1.0", "2.5"]);
        assert_eq!(decimal.validate(&FieldValue::Decimal(1.0), &ctx), Ok(None));
        assert_eq!(decimal.validate(&FieldValue::Integer(1), &ctx), Ok(None));
        assert_eq!(decimal.validate(&FieldValue::Decimal(2.5), &ctx), Ok(None));
        assert!(decimal.validate(&FieldValue::Integer(2), &ctx).unwrap().is_some());
    }

    #[test]
    fn test_value_in_large_integers_exact() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let allowed = ValueIn::new([u64::MAX.to_string()]);
        assert_eq!(allowed.validate(&FieldValue::Unsigned(u64::MAX), &ctx), Ok(None));
        assert!(allowed
            .validate(&FieldValue::Unsigned(u64::MAX - 1), &ctx)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_text_values_compare_as_text() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let allowed = ValueIn::new(["1"]);
        assert_eq!(allowed.validate(&FieldValue::Text("1"), &ctx), Ok(None));
        assert!(allowed.validate(&FieldValue::Text("1.0"), &ctx).unwrap().is_some());
    }

    #[test]
    fn test_value_not_in_numeric() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let forbidden = ValueNotIn::new(["0"]);
        assert!(forbidden
            .validate(&FieldValue::Decimal(0.0), &ctx)
            .unwrap()
            .is_some());
        assert_eq!(forbidden.validate(&FieldValue::Integer(7), &ctx), Ok(None));
    }

    #[test]
    fn test_value_not_in() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let forbidden = ValueNotIn::new(["root", "admin"]);
        assert_eq!(forbidden.validate(&FieldValue::Text("guest"), &ctx), Ok(None));
        let violation = forbidden
            .validate(&FieldValue::Text("root"), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(violation.code, ApiErrorCode::ForbiddenValueViolation);
    }

    #[test]
    fn test_enum_ignore_case() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let strict = EnumValue::of(["RED", "GREEN"]);
        let relaxed = strict.clone().ignore_case();
        assert!(strict.validate(&FieldValue::Text("red"), &ctx).unwrap().is_some());
        assert_eq!(relaxed.validate(&FieldValue::Text("red"), &ctx), Ok(None));
    }

    #[test]
    fn test_empty_sets_rejected() {
        assert!(ValueIn::new(Vec::<String>::new()).verify().is_err());
        assert!(EnumValue::of(Vec::<String>::new()).verify().is_err());
    }
}
