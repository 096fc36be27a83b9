//! Constraint metadata and the validator contract.
//!
//! A [`Constraint`] is an immutable descriptor: a [`ConstraintKind`] carrying
//! the kind's typed parameters, the [`GroupSet`] that activates it, and
//! optional [`Messages`] overriding the default text. Every kind implements
//! [`ConstraintValidator`]; the engine dispatches on the kind's tag and never
//! needs to know what a particular kind checks.
//!
//! Absence is handled here, not in each kind: a null value passes every
//! constraint except those whose validator
//! [handles absence](ConstraintValidator::handles_absence) (only
//! [`Required`]).

mod dependent;
mod format;
mod membership;
mod message;
mod numeric;
mod presence;
mod size;
mod text;

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{ApiErrorCode, EngineError};
use crate::group::{Group, GroupSet};
use crate::validation::ValidationContext;
use crate::value::FieldValue;

pub use dependent::NotEqualTo;
pub use format::{Iban, IsoCountry, Language};
pub use membership::{EnumValue, ValueIn, ValueNotIn};
pub use message::{MessageScope, Messages};
pub use numeric::{DivisibleBy, MultipleOf, NumberMax, NumberMin};
pub use presence::{Presence, Required};
pub use size::{ArraySize, MapSize, TextLength};
pub use text::{Base64, HexColor, Pattern};

/// A failed check, before it is placed at a path.
///
/// `params` feed `{name}` placeholders in custom message templates.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub code: ApiErrorCode,
    pub message: String,
    pub params: Vec<(&'static str, String)>,
}

impl Violation {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            params: Vec::new(),
        }
    }

    /// Adds a template parameter and returns self for chaining.
    pub fn param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.params.push((name, value.to_string()));
        self
    }
}

/// The outcome of a single check: `Ok(None)` passes, `Ok(Some(_))` is a
/// reportable violation, `Err(_)` is a wiring mistake that aborts the run.
pub type Checked = Result<Option<Violation>, EngineError>;

/// A pure predicate for one constraint kind.
///
/// Implementations must not depend on anything but their own parameters,
/// the value and the context, so the same input always yields the same
/// outcome. Lazily-built caches (a compiled regex) are fine.
pub trait ConstraintValidator: Send + Sync {
    /// Short kind name used in diagnostics, e.g. `NumberMin`.
    fn name(&self) -> &'static str;

    fn validate(&self, value: &FieldValue<'_>, ctx: &ValidationContext<'_>) -> Checked;

    /// Checks the kind's parameters once, at registration.
    fn verify(&self) -> Result<(), String> {
        Ok(())
    }

    /// Whether null values reach [`validate`](Self::validate).
    fn handles_absence(&self) -> bool {
        false
    }

    /// The kind's parameters for introspection.
    fn describe(&self) -> Value {
        json!({})
    }
}

/// Shorthand for the error returned when a kind meets a value shape it
/// cannot evaluate.
pub(crate) fn unsupported(constraint: &'static str, value: &FieldValue<'_>) -> EngineError {
    EngineError::UnsupportedValue {
        constraint,
        kind: value.kind().name(),
    }
}

macro_rules! constraint_kinds {
    ($($kind:ident),* $(,)?) => {
        /// Tagged union of every built-in constraint kind plus custom ones.
        #[derive(Clone)]
        pub enum ConstraintKind {
            $($kind($kind),)*
            Custom(Arc<dyn ConstraintValidator>),
        }

        impl ConstraintKind {
            pub fn validator(&self) -> &dyn ConstraintValidator {
                match self {
                    $(ConstraintKind::$kind(c) => c,)*
                    ConstraintKind::Custom(c) => c.as_ref(),
                }
            }
        }

        $(
            impl From<$kind> for ConstraintKind {
                fn from(c: $kind) -> Self {
                    ConstraintKind::$kind(c)
                }
            }

            impl From<$kind> for Constraint {
                fn from(c: $kind) -> Self {
                    Constraint::new(ConstraintKind::$kind(c))
                }
            }
        )*
    };
}

constraint_kinds!(
    Required,
    NumberMin,
    NumberMax,
    TextLength,
    ArraySize,
    MapSize,
    DivisibleBy,
    MultipleOf,
    ValueIn,
    ValueNotIn,
    NotEqualTo,
    Pattern,
    Base64,
    HexColor,
    Iban,
    IsoCountry,
    Language,
    EnumValue,
);

impl ConstraintKind {
    pub fn name(&self) -> &'static str {
        self.validator().name()
    }
}

impl fmt::Debug for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An immutable constraint descriptor attached to one field.
#[derive(Debug, Clone)]
pub struct Constraint {
    kind: ConstraintKind,
    groups: GroupSet,
    messages: Messages,
}

impl Constraint {
    /// Creates a constraint in the default group with default messages.
    pub fn new(kind: impl Into<ConstraintKind>) -> Self {
        Self {
            kind: kind.into(),
            groups: GroupSet::default_only(),
            messages: Messages::default(),
        }
    }

    /// Wraps a caller-supplied validator.
    pub fn custom(validator: Arc<dyn ConstraintValidator>) -> Self {
        Self::new(ConstraintKind::Custom(validator))
    }

    pub fn kind(&self) -> &ConstraintKind {
        &self.kind
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// True when this constraint is active for the requested groups.
    ///
    /// With no requested groups only constraints in exactly `{Default}` run.
    pub fn applies_to(&self, requested: &GroupSet) -> bool {
        self.groups.activated_by(requested)
    }

    pub(crate) fn verify(&self) -> Result<(), String> {
        if self.groups.is_empty() {
            return Err("constraint must belong to at least one group".to_string());
        }
        self.kind.validator().verify()
    }

    /// Evaluates the constraint and renders its message.
    pub fn evaluate(&self, value: &FieldValue<'_>, ctx: &ValidationContext<'_>) -> Checked {
        let validator = self.kind.validator();
        if value.is_null() && !validator.handles_absence() {
            return Ok(None);
        }

        let Some(mut violation) = validator.validate(value, ctx)? else {
            return Ok(None);
        };
        if let Some(template) = self.messages.resolve(ctx.groups(), ctx.locale()) {
            violation.message = message::render(template, &violation.params);
        }
        Ok(Some(violation))
    }

    pub(crate) fn describe(&self) -> Value {
        let mut description = self.kind.validator().describe();
        if let Value::Object(map) = &mut description {
            map.insert("kind".to_string(), json!(self.kind.name()));
            map.insert(
                "groups".to_string(),
                json!(self.groups.iter().map(Group::to_string).collect::<Vec<_>>()),
            );
        }
        description
    }
}

impl From<ConstraintKind> for Constraint {
    fn from(kind: ConstraintKind) -> Self {
        Constraint::new(kind)
    }
}

/// Group and message configuration for anything convertible to a
/// [`Constraint`].
///
/// ```rust
/// use warden::Group;
/// use warden::constraint::{ConstraintBuilder, NumberMin};
///
/// let constraint = NumberMin::inclusive(1.0)
///     .in_groups([Group::Create])
///     .message("quantity must be at least {min}");
/// assert!(!constraint.groups().contains(&Group::Default));
/// ```
pub trait ConstraintBuilder: Into<Constraint> + Sized {
    /// Replaces the default group with `groups`.
    fn in_groups<I: IntoIterator<Item = Group>>(self, groups: I) -> Constraint {
        let mut constraint = self.into();
        constraint.groups = groups.into_iter().collect();
        constraint
    }

    /// Sets the message template used in every group and locale.
    fn message(self, template: impl Into<String>) -> Constraint {
        let mut constraint = self.into();
        constraint.messages.push(MessageScope::Any, template);
        constraint
    }

    /// Sets the template used when `group` is active.
    fn group_message(self, group: Group, template: impl Into<String>) -> Constraint {
        let mut constraint = self.into();
        constraint.messages.push(MessageScope::Group(group), template);
        constraint
    }

    /// Sets the template used when the engine runs with `locale`.
    fn locale_message(self, locale: &str, template: impl Into<String>) -> Constraint {
        let mut constraint = self.into();
        constraint
            .messages
            .push(MessageScope::Locale(Arc::from(locale)), template);
        constraint
    }
}

impl<C: Into<Constraint>> ConstraintBuilder for C {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_group() {
        let constraint = Constraint::from(NumberMin::inclusive(1.0));
        assert_eq!(constraint.groups(), &GroupSet::default_only());
        assert!(constraint.applies_to(&GroupSet::requested(Vec::new())));
        assert!(!constraint.applies_to(&GroupSet::requested([Group::Update])));
    }

    #[test]
    fn test_in_groups_replaces_default() {
        let constraint = Required::always().in_groups([Group::Create]);
        assert!(constraint.applies_to(&GroupSet::requested([Group::Create])));
        assert!(!constraint.applies_to(&GroupSet::requested(Vec::new())));
    }

    #[test]
    fn test_empty_groups_rejected() {
        let constraint = Required::always().in_groups(Vec::new());
        assert!(constraint.verify().is_err());
    }

    #[test]
    fn test_null_skips_value_constraints() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let constraint = Constraint::from(TextLength::new(2, 5));
        assert_eq!(constraint.evaluate(&FieldValue::Null, &ctx), Ok(None));
    }

    #[test]
    fn test_custom_message_template() {
        let ctx = ValidationContext::detached(GroupSet::default_only());
        let constraint = NumberMin::inclusive(10.0).message("need {min} or more");
        let violation = constraint
            .evaluate(&FieldValue::Integer(3), &ctx)
            .unwrap()
            .unwrap();
        assert_eq!(violation.message, "need 10 or more");
    }

    #[test]
    fn test_kind_debug_is_name() {
        let kind = ConstraintKind::from(Iban::new());
        assert_eq!(format!("{:?}", kind), "Iban");
    }
}
