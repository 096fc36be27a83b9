//! Per-run evaluation context.
//!
//! This module provides [`ValidationContext`], created fresh for every
//! validation run. It carries the requested groups, the active locale, the
//! lineage of objects from the root down to the one whose fields are being
//! checked, and the registry snapshot used to resolve dependent paths.

use std::sync::Arc;

use crate::declare::Node;
use crate::group::GroupSet;
use crate::path::{FieldPath, PathSegment};
use crate::registry::RegistrySnapshot;
use crate::value::FieldValue;

/// Context handed to every [`ConstraintValidator`](crate::constraint::ConstraintValidator).
///
/// Owned by one validation run and never shared across runs. Validators only
/// read from it.
#[derive(Clone)]
pub struct ValidationContext<'a> {
    lineage: Vec<&'a dyn Node>,
    snapshot: Option<Arc<RegistrySnapshot>>,
    groups: Arc<GroupSet>,
    locale: Option<Arc<str>>,
    path: FieldPath,
}

impl<'a> ValidationContext<'a> {
    /// Creates a context rooted at `root`.
    pub fn new(root: &'a dyn Node, snapshot: Arc<RegistrySnapshot>, groups: GroupSet) -> Self {
        Self {
            lineage: vec![root],
            snapshot: Some(snapshot),
            groups: Arc::new(groups),
            locale: None,
            path: FieldPath::root(),
        }
    }

    /// Sets the locale used to pick message templates.
    pub fn with_locale(mut self, locale: Option<Arc<str>>) -> Self {
        self.locale = locale;
        self
    }

    /// Creates a child context for a nested object found at `path`.
    pub(crate) fn descend(&self, child: &'a dyn Node, path: FieldPath) -> Self {
        let mut lineage = Vec::with_capacity(self.lineage.len() + 1);
        lineage.extend_from_slice(&self.lineage);
        lineage.push(child);
        Self {
            lineage,
            snapshot: self.snapshot.clone(),
            groups: Arc::clone(&self.groups),
            locale: self.locale.clone(),
            path,
        }
    }

    /// The root object of the run, if any.
    pub fn root(&self) -> Option<&'a dyn Node> {
        self.lineage.first().copied()
    }

    /// The object whose fields are currently being checked.
    pub fn current(&self) -> Option<&'a dyn Node> {
        self.lineage.last().copied()
    }

    /// Nesting depth of the current object; the root is at depth 0.
    pub fn depth(&self) -> usize {
        self.lineage.len().saturating_sub(1)
    }

    /// Path of the current object relative to the root.
    pub fn path(&self) -> &FieldPath {
        &self.path
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Resolves a dependent path to another field's value.
    ///
    /// Paths are dotted (`address.city`) and may index lists
    /// (`items[0].sku`). A `$.` prefix anchors the path at the root object;
    /// otherwise it is tried against the current object first, then against
    /// each ancestor up to the root. Returns `None` when no object along the
    /// way has the path.
    pub fn resolve(&self, path: &str) -> Option<FieldValue<'a>> {
        let snapshot = self.snapshot.as_deref()?;
        let (anchored, raw) = match path.strip_prefix("$.") {
            Some(rest) => (true, rest),
            None => (false, path),
        };
        let Some(parsed) = FieldPath::parse(raw) else {
            tracing::trace!(path, "malformed dependent path");
            return None;
        };

        let resolved = if anchored {
            self.root().and_then(|root| walk(snapshot, root, &parsed))
        } else {
            self.lineage
                .iter()
                .rev()
                .find_map(|node| walk(snapshot, *node, &parsed))
        };
        if resolved.is_none() {
            tracing::trace!(path, at = %self.path, "dependent path did not resolve");
        }
        resolved
    }
}

impl ValidationContext<'static> {
    /// A context with no object graph, for evaluating a single constraint in
    /// isolation. Every dependent path resolves to `None`.
    pub fn detached(groups: GroupSet) -> Self {
        Self {
            lineage: Vec::new(),
            snapshot: None,
            groups: Arc::new(groups),
            locale: None,
            path: FieldPath::root(),
        }
    }
}

fn walk<'a>(
    snapshot: &RegistrySnapshot,
    node: &'a dyn Node,
    path: &FieldPath,
) -> Option<FieldValue<'a>> {
    let mut current = FieldValue::Object(node);
    for segment in path.segments() {
        current = match (segment, current) {
            (PathSegment::Field(name), FieldValue::Object(object)) => {
                let entry = snapshot.entry_for(object)?;
                entry.table().get(name)?.get(object).ok()?
            }
            (PathSegment::Field(name), FieldValue::Map(entries)) => {
                entries.into_iter().find(|(key, _)| *key == name.as_str())?.1
            }
            (PathSegment::Index(index), FieldValue::Map(entries)) => {
                let key = index.to_string();
                entries.into_iter().find(|(k, _)| *k == key)?.1
            }
            (PathSegment::Index(index), FieldValue::List(items)) => {
                items.into_iter().nth(*index)?
            }
            _ => return None,
        };
    }
    Some(current)
}
