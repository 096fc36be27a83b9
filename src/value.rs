//! Borrowed views of field values.
//!
//! Accessors never clone field data: they return a [`FieldValue`] that
//! borrows from the instance being validated. Nested composite objects are
//! exposed as [`FieldValue::Object`] so the engine can recurse into them and
//! dependent paths can walk through them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::declare::Node;

/// A read-only view of one field's current value.
#[derive(Clone)]
pub enum FieldValue<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    /// An unsigned integer above `i64::MAX`.
    Unsigned(u64),
    Decimal(f64),
    Text(&'a str),
    List(Vec<FieldValue<'a>>),
    Map(Vec<(&'a str, FieldValue<'a>)>),
    /// A nested composite object with its own declared constraints.
    Object(&'a dyn Node),
}

/// Coarse value shape used for type-compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    Text,
    List,
    Map,
    Object,
}

impl ValueKind {
    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::List => "list",
            ValueKind::Map => "map",
            ValueKind::Object => "object",
        }
    }
}

impl<'a> FieldValue<'a> {
    pub fn kind(&self) -> ValueKind {
        match self {
            FieldValue::Null => ValueKind::Null,
            FieldValue::Bool(_) => ValueKind::Bool,
            FieldValue::Integer(_) | FieldValue::Unsigned(_) | FieldValue::Decimal(_) => {
                ValueKind::Number
            }
            FieldValue::Text(_) => ValueKind::Text,
            FieldValue::List(_) => ValueKind::List,
            FieldValue::Map(_) => ValueKind::Map,
            FieldValue::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view; integers widen to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(n) => Some(*n as f64),
            FieldValue::Unsigned(n) => Some(*n as f64),
            FieldValue::Decimal(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            FieldValue::Text(s) => Some(*s),
            _ => None,
        }
    }

    /// Scalar rendering used by allowed-value comparisons.
    ///
    /// Returns `None` for null and composite values.
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            FieldValue::Bool(b) => Some(b.to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Unsigned(n) => Some(n.to_string()),
            FieldValue::Decimal(n) => Some(n.to_string()),
            FieldValue::Text(s) => Some((*s).to_string()),
            _ => None,
        }
    }

    /// Exact integer view, if the value is an integer.
    fn as_i128(&self) -> Option<i128> {
        match self {
            FieldValue::Integer(n) => Some(i128::from(*n)),
            FieldValue::Unsigned(n) => Some(i128::from(*n)),
            _ => None,
        }
    }

    /// Structural equality across the two views.
    ///
    /// Integers compare exactly; a decimal compares numerically with any
    /// number. Objects compare by identity.
    pub fn same_as(&self, other: &FieldValue<'_>) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Text(a), FieldValue::Text(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_as(vb))
            }
            (FieldValue::Object(a), FieldValue::Object(b)) => std::ptr::addr_eq(*a, *b),
            (a, b) => match (a.as_i128(), b.as_i128()) {
                (Some(x), Some(y)) => x == y,
                _ => match (a.as_f64(), b.as_f64()) {
                    (Some(x), Some(y)) => x == y,
                    _ => false,
                },
            },
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Integer(n) => f.debug_tuple("Integer").field(n).finish(),
            FieldValue::Unsigned(n) => f.debug_tuple("Unsigned").field(n).finish(),
            FieldValue::Decimal(n) => f.debug_tuple("Decimal").field(n).finish(),
            FieldValue::Text(s) => f.debug_tuple("Text").field(s).finish(),
            FieldValue::List(items) => f.debug_tuple("List").field(items).finish(),
            FieldValue::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            FieldValue::Object(node) => f.debug_tuple("Object").field(&node.type_name()).finish(),
        }
    }
}

/// Conversion from a field's storage type to its [`FieldValue`] view.
///
/// Implemented for the scalar, text, optional, sequence and string-keyed map
/// types a data-transfer object typically holds. Nested constrained types
/// are declared with [`TypeDecl::object`](crate::TypeDecl::object) instead.
pub trait AsFieldValue {
    fn field_value(&self) -> FieldValue<'_>;
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl AsFieldValue for $ty {
                fn field_value(&self) -> FieldValue<'_> {
                    FieldValue::Integer(i64::from(*self))
                }
            }
        )*
    };
}

integer_field_value!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl AsFieldValue for $ty {
                fn field_value(&self) -> FieldValue<'_> {
                    match i64::try_from(*self) {
                        Ok(n) => FieldValue::Integer(n),
                        Err(_) => FieldValue::Unsigned(*self as u64),
                    }
                }
            }
        )*
    };
}

wide_integer_field_value!(u64, usize);

impl AsFieldValue for isize {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Integer(*self as i64)
    }
}

impl AsFieldValue for f64 {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Decimal(*self)
    }
}

impl AsFieldValue for f32 {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Decimal(f64::from(*self))
    }
}

impl AsFieldValue for bool {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

impl AsFieldValue for str {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self)
    }
}

impl AsFieldValue for String {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Text(self.as_str())
    }
}

impl<V: AsFieldValue> AsFieldValue for Option<V> {
    fn field_value(&self) -> FieldValue<'_> {
        match self {
            Some(v) => v.field_value(),
            None => FieldValue::Null,
        }
    }
}

impl<V: AsFieldValue> AsFieldValue for [V] {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(AsFieldValue::field_value).collect())
    }
}

impl<V: AsFieldValue> AsFieldValue for Vec<V> {
    fn field_value(&self) -> FieldValue<'_> {
        self.as_slice().field_value()
    }
}

impl<K: AsRef<str>, V: AsFieldValue> AsFieldValue for BTreeMap<K, V> {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.as_ref(), v.field_value()))
                .collect(),
        )
    }
}

impl<K: AsRef<str>, V: AsFieldValue> AsFieldValue for IndexMap<K, V> {
    fn field_value(&self) -> FieldValue<'_> {
        FieldValue::Map(
            self.iter()
                .map(|(k, v)| (k.as_ref(), v.field_value()))
                .collect(),
        )
    }
}

/// Entries are sorted by key so error output does not depend on hash order.
impl<K: AsRef<str>, V: AsFieldValue, S> AsFieldValue for HashMap<K, V, S> {
    fn field_value(&self) -> FieldValue<'_> {
        let mut entries: Vec<_> = self
            .iter()
            .map(|(k, v)| (k.as_ref(), v.field_value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        FieldValue::Map(entries)
    }
}

impl AsFieldValue for Value {
    fn field_value(&self) -> FieldValue<'_> {
        match self {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => FieldValue::Integer(i),
                (None, Some(u)) => FieldValue::Unsigned(u),
                _ => FieldValue::Decimal(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Text(s.as_str()),
            Value::Array(items) => items.field_value(),
            Value::Object(map) => FieldValue::Map(
                map.iter()
                    .map(|(k, v)| (k.as_str(), v.field_value()))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars() {
        assert!(matches!(42u8.field_value(), FieldValue::Integer(42)));
        assert!(matches!(u64::MAX.field_value(), FieldValue::Unsigned(u64::MAX)));
        assert!(matches!(true.field_value(), FieldValue::Bool(true)));
        assert_eq!("abc".field_value().as_str(), Some("abc"));
    }

    #[test]
    fn test_option_none_is_null() {
        let missing: Option<String> = None;
        assert!(missing.field_value().is_null());
        assert_eq!(Some(3i32).field_value().as_f64(), Some(3.0));
    }

    #[test]
    fn test_hash_map_sorted() {
        let map: HashMap<String, i32> = [("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect();
        match map.field_value() {
            FieldValue::Map(entries) => {
                let keys: Vec<_> = entries.iter().map(|(k, _)| *k).collect();
                assert_eq!(keys, vec!["a", "b"]);
            }
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_json_value() {
        let value = json!({"tags": ["x", "y"], "count": 2, "ratio": 0.5});
        match value.field_value() {
            FieldValue::Map(entries) => assert_eq!(entries.len(), 3),
            other => panic!("expected map, got {:?}", other),
        }
    }

    #[test]
    fn test_same_as_numeric_widening() {
        assert!(FieldValue::Integer(3).same_as(&FieldValue::Decimal(3.0)));
        assert!(!FieldValue::Integer(3).same_as(&FieldValue::Text("3")));
        assert!(FieldValue::List(vec![FieldValue::Text("a")])
            .same_as(&FieldValue::List(vec![FieldValue::Text("a")])));
    }

    #[test]
    fn test_same_as_large_integers_exact() {
        let max = FieldValue::Unsigned(u64::MAX);
        assert!(!max.same_as(&FieldValue::Unsigned(u64::MAX - 1)));
        assert!(max.same_as(&FieldValue::Unsigned(u64::MAX)));
        assert!(!FieldValue::Integer(i64::MAX).same_as(&FieldValue::Unsigned(1 << 63)));
        assert!(!FieldValue::Integer(i64::MAX).same_as(&FieldValue::Integer(i64::MAX - 1)));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FieldValue::Decimal(1.0).kind(), ValueKind::Number);
        assert_eq!(FieldValue::Integer(1).kind(), ValueKind::Number);
        assert_eq!(FieldValue::Text("").kind().name(), "text");
    }
}
