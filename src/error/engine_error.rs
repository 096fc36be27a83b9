//! Fatal errors: wiring mistakes and aborted runs.
//!
//! These never describe the data being validated. A caller receiving an
//! [`EngineError`] must treat the validation run as not having happened.

/// Errors raised while building the registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RegistryError {
    /// A constraint's parameters are unusable (e.g. `min > max`).
    #[error("invalid {constraint} constraint on {type_name}.{field}: {reason}")]
    InvalidConstraint {
        type_name: &'static str,
        field: String,
        constraint: &'static str,
        reason: String,
    },

    /// Two fields of one type share a declared or external name.
    #[error("field name '{field}' declared twice on {type_name}")]
    DuplicateField {
        type_name: &'static str,
        field: String,
    },
}

/// Unrecoverable conditions that abort a validation run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    /// The instance's type was never registered.
    #[error("type '{0}' is not registered")]
    UnregisteredType(&'static str),

    /// An accessor was applied to an instance of a different type.
    #[error("accessor for {owner}.{field} applied to an instance of {actual}")]
    AccessorMismatch {
        owner: &'static str,
        field: String,
        actual: &'static str,
    },

    /// A constraint met a value shape it cannot evaluate.
    #[error("{constraint} constraint cannot evaluate a {kind} value")]
    UnsupportedValue {
        constraint: &'static str,
        kind: &'static str,
    },

    /// Registry state that should have been prepared at registration is missing.
    #[error("{0}")]
    Misconfigured(String),

    /// Nested validation went deeper than the configured limit.
    #[error("maximum nesting depth {0} exceeded")]
    MaxDepthExceeded(usize),

    /// The run was cancelled before it completed.
    #[error("validation cancelled")]
    Cancelled,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
