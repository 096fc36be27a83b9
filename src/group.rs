//! Validation groups.
//!
//! A constraint is active for a run when its group set intersects the
//! requested groups. When no groups are requested, only constraints whose
//! group set is exactly `{Default}` run. A constraint declared without
//! groups belongs to `Default`.

use std::collections::BTreeSet;
use std::fmt::{self, Display};
use std::sync::Arc;

/// A named filter tag controlling which constraints run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Group {
    /// Implicit group, active when no explicit groups are requested.
    Default,
    Create,
    Update,
    /// Caller-defined group.
    Named(Arc<str>),
}

impl Group {
    /// Creates a caller-defined group.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Group::Named(name.into())
    }
}

impl Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Group::Default => f.write_str("Default"),
            Group::Create => f.write_str("Create"),
            Group::Update => f.write_str("Update"),
            Group::Named(name) => f.write_str(name),
        }
    }
}

/// An ordered, de-duplicated set of groups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GroupSet(BTreeSet<Group>);

impl GroupSet {
    /// The set containing only [`Group::Default`].
    pub fn default_only() -> Self {
        Self(BTreeSet::from([Group::Default]))
    }

    /// Collects a caller's requested groups. An empty set means no explicit
    /// request.
    pub fn requested<I: IntoIterator<Item = Group>>(groups: I) -> Self {
        Self(groups.into_iter().collect())
    }

    /// True when the set is exactly `{Default}`.
    pub fn is_default_only(&self) -> bool {
        self.0.len() == 1 && self.0.contains(&Group::Default)
    }

    /// Whether a constraint tagged with this set runs for `requested`.
    pub fn activated_by(&self, requested: &GroupSet) -> bool {
        if requested.is_empty() {
            self.is_default_only()
        } else {
            self.intersects(requested)
        }
    }

    pub fn contains(&self, group: &Group) -> bool {
        self.0.contains(group)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.0.iter()
    }

    /// True when the two sets share at least one group.
    pub fn intersects(&self, other: &GroupSet) -> bool {
        self.0.iter().any(|g| other.0.contains(g))
    }
}

impl FromIterator<Group> for GroupSet {
    fn from_iter<I: IntoIterator<Item = Group>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
