//! Precomputed field accessors.
//!
//! A [`PropertyAccessor`] binds one declared field of one type to a getter
//! closure at registration time. Reading a value is then a downcast plus a
//! direct call; nothing is looked up by name on the hot path. A
//! [`FieldTable`] is the per-type, declaration-ordered collection of those
//! accessors, indexed by both declared and external names.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::declare::{Constrained, Node, ObjectMap};
use crate::error::{EngineError, RegistryError};
use crate::value::{AsFieldValue, FieldValue};

type Getter = dyn for<'a> Fn(&'a dyn Any) -> Option<FieldValue<'a>> + Send + Sync;

/// Whether an accessor yields plain data or nested constrained objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    Scalar,
    Object,
    OptionalObject,
    ObjectList,
    OptionalObjectList,
    /// Nested objects keyed by text; each entry's path segment is its key.
    ObjectMap,
}

impl FieldShape {
    /// True when the engine should recurse into the field's value.
    pub fn is_composite(&self) -> bool {
        !matches!(self, FieldShape::Scalar)
    }
}

/// An immutable, type-bound getter for one field.
///
/// Cheap to clone and safe to call concurrently from any number of
/// validation runs.
#[derive(Clone)]
pub struct PropertyAccessor {
    name: Arc<str>,
    resolved_name: Arc<str>,
    owner: TypeId,
    owner_name: &'static str,
    value_type: &'static str,
    shape: FieldShape,
    getter: Arc<Getter>,
}

fn erase<F>(getter: F) -> Arc<Getter>
where
    F: for<'a> Fn(&'a dyn Any) -> Option<FieldValue<'a>> + Send + Sync + 'static,
{
    Arc::new(getter)
}

impl PropertyAccessor {
    fn bind<T: 'static>(
        name: &str,
        value_type: &'static str,
        shape: FieldShape,
        getter: Arc<Getter>,
    ) -> Self {
        let name: Arc<str> = Arc::from(name);
        Self {
            resolved_name: Arc::clone(&name),
            name,
            owner: TypeId::of::<T>(),
            owner_name: std::any::type_name::<T>(),
            value_type,
            shape,
            getter,
        }
    }

    pub(crate) fn scalar<T, V, F>(name: &str, read: F) -> Self
    where
        T: 'static,
        V: AsFieldValue + ?Sized + 'static,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        let getter = erase(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|owner| read(owner).field_value())
        });
        Self::bind::<T>(name, std::any::type_name::<V>(), FieldShape::Scalar, getter)
    }

    pub(crate) fn object<T, V, F>(name: &str, read: F) -> Self
    where
        T: 'static,
        V: Constrained,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        let getter = erase(move |any: &dyn Any| {
            any.downcast_ref::<T>()
                .map(|owner| FieldValue::Object(read(owner) as &dyn Node))
        });
        Self::bind::<T>(name, std::any::type_name::<V>(), FieldShape::Object, getter)
    }

    pub(crate) fn optional_object<T, V, F>(name: &str, read: F) -> Self
    where
        T: 'static,
        V: Constrained,
        F: for<'a> Fn(&'a T) -> Option<&'a V> + Send + Sync + 'static,
    {
        let getter = erase(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|owner| match read(owner) {
                Some(child) => FieldValue::Object(child as &dyn Node),
                None => FieldValue::Null,
            })
        });
        Self::bind::<T>(
            name,
            std::any::type_name::<V>(),
            FieldShape::OptionalObject,
            getter,
        )
    }

    pub(crate) fn object_list<T, V, F>(name: &str, read: F) -> Self
    where
        T: 'static,
        V: Constrained,
        F: for<'a> Fn(&'a T) -> &'a [V] + Send + Sync + 'static,
    {
        let getter = erase(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|owner| {
                FieldValue::List(
                    read(owner)
                        .iter()
                        .map(|child| FieldValue::Object(child as &dyn Node))
                        .collect(),
                )
            })
        });
        Self::bind::<T>(
            name,
            std::any::type_name::<V>(),
            FieldShape::ObjectList,
            getter,
        )
    }

    pub(crate) fn optional_object_list<T, V, F>(name: &str, read: F) -> Self
    where
        T: 'static,
        V: Constrained,
        F: for<'a> Fn(&'a T) -> Option<&'a [V]> + Send + Sync + 'static,
    {
        let getter = erase(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|owner| match read(owner) {
                Some(children) => FieldValue::List(
                    children
                        .iter()
                        .map(|child| FieldValue::Object(child as &dyn Node))
                        .collect(),
                ),
                None => FieldValue::Null,
            })
        });
        Self::bind::<T>(
            name,
            std::any::type_name::<V>(),
            FieldShape::OptionalObjectList,
            getter,
        )
    }

    pub(crate) fn object_map<T, V, M, F>(name: &str, read: F) -> Self
    where
        T: 'static,
        V: Constrained,
        M: ObjectMap<V> + ?Sized + 'static,
        F: for<'a> Fn(&'a T) -> &'a M + Send + Sync + 'static,
    {
        let getter = erase(move |any: &dyn Any| {
            any.downcast_ref::<T>().map(|owner| {
                FieldValue::Map(
                    read(owner)
                        .object_entries()
                        .into_iter()
                        .map(|(key, child)| (key, FieldValue::Object(child as &dyn Node)))
                        .collect(),
                )
            })
        });
        Self::bind::<T>(
            name,
            std::any::type_name::<M>(),
            FieldShape::ObjectMap,
            getter,
        )
    }

    pub(crate) fn set_resolved_name(&mut self, external: &str) {
        self.resolved_name = Arc::from(external);
    }

    /// Reads the bound field from `instance`.
    ///
    /// Fails only when `instance` is not of the type this accessor was built
    /// for, which is a wiring mistake rather than a validation outcome.
    pub fn get<'a>(&self, instance: &'a dyn Node) -> Result<FieldValue<'a>, EngineError> {
        (self.getter)(instance.as_any()).ok_or_else(|| EngineError::AccessorMismatch {
            owner: self.owner_name,
            field: self.name.to_string(),
            actual: instance.type_name(),
        })
    }

    /// The field's name as declared in Rust.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The external name used in error paths (equal to `name` unless renamed).
    pub fn resolved_name(&self) -> &str {
        &self.resolved_name
    }

    pub fn owner(&self) -> TypeId {
        self.owner
    }

    pub fn owner_name(&self) -> &'static str {
        self.owner_name
    }

    pub fn value_type(&self) -> &'static str {
        self.value_type
    }

    pub fn shape(&self) -> FieldShape {
        self.shape
    }
}

impl fmt::Debug for PropertyAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyAccessor")
            .field("name", &self.name)
            .field("resolved_name", &self.resolved_name)
            .field("owner", &self.owner_name)
            .field("value_type", &self.value_type)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Declaration-ordered accessors of one type, indexed by name and alias.
#[derive(Debug, Clone)]
pub struct FieldTable {
    accessors: Vec<PropertyAccessor>,
    index: HashMap<Arc<str>, usize>,
}

impl FieldTable {
    pub(crate) fn build(
        type_name: &'static str,
        accessors: Vec<PropertyAccessor>,
    ) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(accessors.len() * 2);
        for (position, accessor) in accessors.iter().enumerate() {
            let mut names = vec![Arc::clone(&accessor.name)];
            if accessor.resolved_name != accessor.name {
                names.push(Arc::clone(&accessor.resolved_name));
            }
            for name in names {
                if index.insert(Arc::clone(&name), position).is_some() {
                    return Err(RegistryError::DuplicateField {
                        type_name,
                        field: name.to_string(),
                    });
                }
            }
        }
        Ok(Self { accessors, index })
    }

    /// Looks up an accessor by declared or external name.
    pub fn get(&self, name: &str) -> Option<&PropertyAccessor> {
        self.index.get(name).map(|&position| &self.accessors[position])
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertyAccessor> {
        self.accessors.iter()
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::TypeDecl;

    struct Badge {
        label: String,
        count: Option<u32>,
    }

    impl Constrained for Badge {
        fn declare(_decl: &mut TypeDecl<Self>) {}
    }

    struct Other;

    impl Constrained for Other {
        fn declare(_decl: &mut TypeDecl<Self>) {}
    }

    #[test]
    fn test_scalar_accessor_reads_value() {
        let accessor = PropertyAccessor::scalar::<Badge, _, _>("label", |p: &Badge| &p.label);
        let badge = Badge {
            label: "abc".to_string(),
            count: None,
        };
        let value = accessor.get(&badge).unwrap();
        assert_eq!(value.as_str(), Some("abc"));
        assert_eq!(accessor.shape(), FieldShape::Scalar);
    }

    #[test]
    fn test_accessor_reused_across_instances() {
        let accessor = PropertyAccessor::scalar::<Badge, _, _>("count", |p: &Badge| &p.count);
        let a = Badge {
            label: String::new(),
            count: Some(1),
        };
        let b = Badge {
            label: String::new(),
            count: None,
        };
        assert_eq!(accessor.get(&a).unwrap().as_f64(), Some(1.0));
        assert!(accessor.get(&b).unwrap().is_null());
    }

    #[test]
    fn test_accessor_type_mismatch_is_fatal() {
        let accessor = PropertyAccessor::scalar::<Badge, _, _>("label", |p: &Badge| &p.label);
        let err = accessor.get(&Other).unwrap_err();
        assert!(matches!(err, EngineError::AccessorMismatch { .. }));
    }

    #[test]
    fn test_field_table_aliases_and_duplicates() {
        let mut renamed = PropertyAccessor::scalar::<Badge, _, _>("label", |p: &Badge| &p.label);
        renamed.set_resolved_name("displayLabel");
        let count = PropertyAccessor::scalar::<Badge, _, _>("count", |p: &Badge| &p.count);

        let table = FieldTable::build("Badge", vec![renamed.clone(), count]).unwrap();
        assert_eq!(table.position("label"), Some(0));
        assert_eq!(table.position("displayLabel"), Some(0));
        assert_eq!(table.get("count").map(PropertyAccessor::name), Some("count"));

        let duplicate = FieldTable::build("Badge", vec![renamed.clone(), renamed]);
        assert!(matches!(duplicate, Err(RegistryError::DuplicateField { .. })));
    }
}
