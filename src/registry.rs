//! Process-wide constraint registry.
//!
//! This module provides [`ValidationRegistry`], which maps each registered
//! type to its declaration-ordered `(accessor, constraints)` list. Readers
//! take an immutable [`RegistrySnapshot`]; registration builds a new
//! snapshot and swaps it in, so a validation run never observes a
//! half-registered type.

use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use crate::accessor::{FieldTable, PropertyAccessor};
use crate::constraint::Constraint;
use crate::declare::{Constrained, Node, TypeDecl};
use crate::error::{EngineError, RegistryError};
use crate::group::GroupSet;

pub(crate) type TypeMap = HashMap<TypeId, Arc<TypeEntry>>;

/// Everything the engine knows about one registered type.
#[derive(Clone)]
pub struct TypeEntry {
    type_id: TypeId,
    type_name: &'static str,
    table: FieldTable,
    constraints: Vec<Vec<Constraint>>,
}

impl TypeEntry {
    pub(crate) fn new(
        type_id: TypeId,
        type_name: &'static str,
        table: FieldTable,
        constraints: Vec<Vec<Constraint>>,
    ) -> Self {
        Self {
            type_id,
            type_name,
            table,
            constraints,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Fields in declaration order with their constraints.
    pub fn fields(&self) -> impl Iterator<Item = (&PropertyAccessor, &[Constraint])> {
        self.table
            .iter()
            .zip(self.constraints.iter().map(Vec::as_slice))
    }

    /// The `(accessor, constraint)` pairs active for `groups`, in
    /// declaration order.
    pub fn pairs<'e>(
        &'e self,
        groups: &'e GroupSet,
    ) -> impl Iterator<Item = (&'e PropertyAccessor, &'e Constraint)> + 'e {
        self.fields().flat_map(move |(accessor, constraints)| {
            constraints
                .iter()
                .filter(move |c| c.applies_to(groups))
                .map(move |c| (accessor, c))
        })
    }

    fn describe(&self) -> Value {
        let fields: Vec<Value> = self
            .fields()
            .map(|(accessor, constraints)| {
                json!({
                    "name": accessor.name(),
                    "externalName": accessor.resolved_name(),
                    "valueType": accessor.value_type(),
                    "composite": accessor.shape().is_composite(),
                    "constraints": constraints.iter().map(Constraint::describe).collect::<Vec<_>>(),
                })
            })
            .collect();
        json!({ "type": self.type_name, "fields": fields })
    }
}

/// An immutable view of the registry at one point in time.
#[derive(Clone, Default)]
pub struct RegistrySnapshot {
    types: TypeMap,
}

impl RegistrySnapshot {
    pub fn get(&self, type_id: TypeId) -> Option<&Arc<TypeEntry>> {
        self.types.get(&type_id)
    }

    /// Looks up the entry for a live instance's concrete type.
    pub fn entry_for(&self, node: &dyn Node) -> Option<&Arc<TypeEntry>> {
        self.types.get(&node.as_any().type_id())
    }

    /// Like [`entry_for`](Self::entry_for), but a missing type is fatal.
    pub fn require(&self, node: &dyn Node) -> Result<&Arc<TypeEntry>, EngineError> {
        self.entry_for(node)
            .ok_or_else(|| EngineError::UnregisteredType(node.type_name()))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Registers `T` and, transitively, every nested type it declares.
///
/// Types already present are left alone, which also terminates recursion
/// for self-referential declarations.
pub(crate) fn register_type<T: Constrained>(types: &mut TypeMap) -> Result<(), RegistryError> {
    let type_id = TypeId::of::<T>();
    if types.contains_key(&type_id) {
        return Ok(());
    }

    let mut decl = TypeDecl::<T>::new();
    T::declare(&mut decl);
    let (entry, nested) = decl.finish()?;
    tracing::debug!(
        type_name = entry.type_name(),
        fields = entry.table().len(),
        "built constraint entry"
    );
    types.insert(type_id, Arc::new(entry));

    for registrar in nested {
        registrar(types)?;
    }
    Ok(())
}

/// A thread-safe, copy-on-write registry of constrained types.
///
/// Cloning shares the underlying registry.
///
/// # Example
///
/// ```rust
/// use warden::{Constrained, TypeDecl, ValidationRegistry};
/// use warden::constraint::Required;
///
/// struct Tag {
///     label: Option<String>,
/// }
///
/// impl Constrained for Tag {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.field("label", |t: &Tag| &t.label).with(Required::always());
///     }
/// }
///
/// let registry = ValidationRegistry::new();
/// registry.register::<Tag>().unwrap();
/// assert!(registry.contains::<Tag>());
/// ```
#[derive(Clone, Default)]
pub struct ValidationRegistry {
    current: Arc<RwLock<Arc<RegistrySnapshot>>>,
    writer: Arc<Mutex<()>>,
}

impl ValidationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` and its nested types.
    ///
    /// Re-registering `T` rebuilds its entry and replaces the previous one;
    /// nested types that are already registered are kept.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`] if any declared constraint has unusable
    /// parameters. The registry is left unchanged in that case.
    pub fn register<T: Constrained>(&self) -> Result<(), RegistryError> {
        self.rebuild(|types| {
            types.remove(&TypeId::of::<T>());
            register_type::<T>(types)
        })
    }

    /// Registers the concrete type of `node` if it is not yet known.
    pub(crate) fn register_node(&self, node: &dyn Node) -> Result<(), RegistryError> {
        let registrar = node.registrar();
        self.rebuild(|types| registrar(types))
    }

    fn rebuild<F>(&self, build: F) -> Result<(), RegistryError>
    where
        F: FnOnce(&mut TypeMap) -> Result<(), RegistryError>,
    {
        let _guard = self.writer.lock();
        let mut types = self.current.read().types.clone();
        build(&mut types)?;
        let count = types.len();
        *self.current.write() = Arc::new(RegistrySnapshot { types });
        tracing::debug!(types = count, "registry snapshot replaced");
        Ok(())
    }

    /// Discards every registration.
    pub fn clear(&self) {
        let _guard = self.writer.lock();
        *self.current.write() = Arc::new(RegistrySnapshot::default());
    }

    /// Returns the current snapshot; later registrations do not affect it.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn lookup<T: Constrained>(&self) -> Option<Arc<TypeEntry>> {
        self.snapshot().get(TypeId::of::<T>()).cloned()
    }

    pub fn contains<T: Constrained>(&self) -> bool {
        self.snapshot().get(TypeId::of::<T>()).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Exports every registered type, its fields and constraints as JSON.
    ///
    /// Types are sorted by name so the output is stable.
    pub fn describe(&self) -> Value {
        let snapshot = self.snapshot();
        let mut entries: Vec<&Arc<TypeEntry>> = snapshot.types.values().collect();
        entries.sort_by_key(|entry| entry.type_name());
        Value::Array(entries.iter().map(|entry| entry.describe()).collect())
    }
}
