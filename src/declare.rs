//! Constraint declaration.
//!
//! Types opt into validation by implementing [`Constrained`]. Their
//! [`declare`](Constrained::declare) function is run once, at registration,
//! against a [`TypeDecl`] that binds an accessor per field and attaches the
//! field's constraints in declaration order.
//!
//! # Example
//!
//! ```rust
//! use warden::{Constrained, TypeDecl};
//! use warden::constraint::{NumberMin, TextLength};
//!
//! struct Signup {
//!     username: String,
//!     age: u32,
//! }
//!
//! impl Constrained for Signup {
//!     fn declare(decl: &mut TypeDecl<Self>) {
//!         decl.field("username", |s: &Signup| &s.username)
//!             .with(TextLength::new(2, 32));
//!         decl.field("age", |s: &Signup| &s.age)
//!             .with(NumberMin::inclusive(18.0));
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;

use indexmap::IndexMap;

use crate::accessor::{FieldTable, PropertyAccessor};
use crate::constraint::Constraint;
use crate::error::RegistryError;
use crate::registry::{register_type, TypeEntry, TypeMap};
use crate::value::AsFieldValue;

/// A type whose instances can be validated.
pub trait Constrained: Sized + Send + Sync + 'static {
    /// Declares the type's fields and their constraints.
    fn declare(decl: &mut TypeDecl<Self>);
}

pub(crate) type Registrar = fn(&mut TypeMap) -> Result<(), RegistryError>;

/// Object-safe view of a [`Constrained`] instance.
///
/// Implemented for every `Constrained` type; the engine and accessors work
/// with `&dyn Node` so that nested objects of different types can share one
/// traversal.
pub trait Node: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    fn type_name(&self) -> &'static str;

    #[doc(hidden)]
    fn registrar(&self) -> Registrar;
}

impl<T: Constrained> Node for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn registrar(&self) -> Registrar {
        register_type::<T>
    }
}

/// A text-keyed collection of nested objects, see [`TypeDecl::object_map`].
pub trait ObjectMap<V> {
    /// Entries in the order their errors are reported.
    fn object_entries(&self) -> Vec<(&str, &V)>;
}

impl<K: AsRef<str>, V> ObjectMap<V> for BTreeMap<K, V> {
    fn object_entries(&self) -> Vec<(&str, &V)> {
        self.iter().map(|(k, v)| (k.as_ref(), v)).collect()
    }
}

impl<K: AsRef<str>, V> ObjectMap<V> for IndexMap<K, V> {
    fn object_entries(&self) -> Vec<(&str, &V)> {
        self.iter().map(|(k, v)| (k.as_ref(), v)).collect()
    }
}

/// Sorted by key.
impl<K: AsRef<str>, V, S> ObjectMap<V> for HashMap<K, V, S> {
    fn object_entries(&self) -> Vec<(&str, &V)> {
        let mut entries: Vec<_> = self.iter().map(|(k, v)| (k.as_ref(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

struct FieldDecl {
    accessor: PropertyAccessor,
    constraints: Vec<Constraint>,
}

/// Builder that turns a type's declarations into accessors and constraint
/// lists.
pub struct TypeDecl<T> {
    fields: Vec<FieldDecl>,
    nested: Vec<Registrar>,
    _owner: PhantomData<fn(&T)>,
}

impl<T: Constrained> TypeDecl<T> {
    pub(crate) fn new() -> Self {
        Self {
            fields: Vec::new(),
            nested: Vec::new(),
            _owner: PhantomData,
        }
    }

    /// Declares a plain-data field.
    pub fn field<V, F>(&mut self, name: &str, read: F) -> FieldBuilder<'_>
    where
        V: AsFieldValue + ?Sized + 'static,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        self.push(PropertyAccessor::scalar::<T, V, F>(name, read))
    }

    /// Declares a nested object that is validated recursively.
    pub fn object<V, F>(&mut self, name: &str, read: F) -> FieldBuilder<'_>
    where
        V: Constrained,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        self.nested.push(register_type::<V>);
        self.push(PropertyAccessor::object::<T, V, F>(name, read))
    }

    /// Declares an optional nested object; `None` reads as null.
    pub fn optional_object<V, F>(&mut self, name: &str, read: F) -> FieldBuilder<'_>
    where
        V: Constrained,
        F: for<'a> Fn(&'a T) -> Option<&'a V> + Send + Sync + 'static,
    {
        self.nested.push(register_type::<V>);
        self.push(PropertyAccessor::optional_object::<T, V, F>(name, read))
    }

    /// Declares a list of nested objects, each validated recursively.
    pub fn objects<V, F>(&mut self, name: &str, read: F) -> FieldBuilder<'_>
    where
        V: Constrained,
        F: for<'a> Fn(&'a T) -> &'a [V] + Send + Sync + 'static,
    {
        self.nested.push(register_type::<V>);
        self.push(PropertyAccessor::object_list::<T, V, F>(name, read))
    }

    /// Declares an optional list of nested objects; `None` reads as null.
    pub fn optional_objects<V, F>(&mut self, name: &str, read: F) -> FieldBuilder<'_>
    where
        V: Constrained,
        F: for<'a> Fn(&'a T) -> Option<&'a [V]> + Send + Sync + 'static,
    {
        self.nested.push(register_type::<V>);
        self.push(PropertyAccessor::optional_object_list::<T, V, F>(name, read))
    }

    /// Declares a map of nested objects. Errors inside an entry are reported
    /// under `name.key.field`.
    pub fn object_map<V, M, F>(&mut self, name: &str, read: F) -> FieldBuilder<'_>
    where
        V: Constrained,
        M: ObjectMap<V> + ?Sized + 'static,
        F: for<'a> Fn(&'a T) -> &'a M + Send + Sync + 'static,
    {
        self.nested.push(register_type::<V>);
        self.push(PropertyAccessor::object_map::<T, V, M, F>(name, read))
    }

    fn push(&mut self, accessor: PropertyAccessor) -> FieldBuilder<'_> {
        let position = self.fields.len();
        self.fields.push(FieldDecl {
            accessor,
            constraints: Vec::new(),
        });
        FieldBuilder {
            field: &mut self.fields[position],
        }
    }

    /// Checks every constraint's parameters and freezes the declarations.
    pub(crate) fn finish(self) -> Result<(TypeEntry, Vec<Registrar>), RegistryError> {
        let type_name = std::any::type_name::<T>();
        let mut accessors = Vec::with_capacity(self.fields.len());
        let mut constraints = Vec::with_capacity(self.fields.len());

        for field in self.fields {
            for constraint in &field.constraints {
                constraint
                    .verify()
                    .map_err(|reason| RegistryError::InvalidConstraint {
                        type_name,
                        field: field.accessor.name().to_string(),
                        constraint: constraint.kind().name(),
                        reason,
                    })?;
            }
            accessors.push(field.accessor);
            constraints.push(field.constraints);
        }

        let table = FieldTable::build(type_name, accessors)?;
        let entry = TypeEntry::new(TypeId::of::<T>(), type_name, table, constraints);
        Ok((entry, self.nested))
    }
}

/// Attaches constraints and an external name to a declared field.
pub struct FieldBuilder<'d> {
    field: &'d mut FieldDecl,
}

impl FieldBuilder<'_> {
    /// Sets the external name reported in error paths, e.g. a serialized
    /// `camelCase` alias. Dependent paths accept either name.
    pub fn rename(self, external: &str) -> Self {
        self.field.accessor.set_resolved_name(external);
        self
    }

    /// Appends a constraint; constraints run in the order they are added.
    pub fn with(self, constraint: impl Into<Constraint>) -> Self {
        self.field.constraints.push(constraint.into());
        self
    }
}
