//! # Warden
//!
//! Declarative, group-aware validation of data-transfer objects that
//! collects ALL violations instead of stopping at the first one.
//!
//! ## Overview
//!
//! Types describe their fields and constraints once, by implementing
//! [`Constrained`]. Registering a type binds a precomputed accessor to every
//! declared field, so validation never looks a field up by name on the hot
//! path. The [`ValidatorEngine`] then walks an instance, runs each
//! constraint active for the requested [`Group`]s, recurses into nested
//! objects and returns every [`ApiError`] in declaration order.
//!
//! ## Core Types
//!
//! - [`ValidationRegistry`]: copy-on-write map from type to its accessors and constraints
//! - [`ValidatorEngine`]: runs validations against a registry
//! - [`Constraint`]: an immutable constraint descriptor (kind, groups, messages)
//! - [`ValidationContext`]: per-run state, including dependent-field lookup
//! - [`ApiError`] / [`ApiErrors`]: validation failures
//! - [`EngineError`]: fatal wiring errors
//!
//! ## Example
//!
//! ```rust
//! use warden::{ApiErrorCode, Constrained, Group, TypeDecl, ValidationRegistry, ValidatorEngine};
//! use warden::constraint::{ConstraintBuilder, NumberMin, Required, TextLength};
//!
//! struct Account {
//!     id: Option<u64>,
//!     name: String,
//!     balance: f64,
//! }
//!
//! impl Constrained for Account {
//!     fn declare(decl: &mut TypeDecl<Self>) {
//!         decl.field("id", |a: &Account| &a.id)
//!             .with(Required::always().in_groups([Group::Update]));
//!         decl.field("name", |a: &Account| &a.name)
//!             .with(TextLength::new(2, 40));
//!         decl.field("balance", |a: &Account| &a.balance)
//!             .with(NumberMin::inclusive(0.0));
//!     }
//! }
//!
//! let registry = ValidationRegistry::new();
//! registry.register::<Account>().unwrap();
//! let engine = ValidatorEngine::new(registry);
//!
//! let account = Account { id: None, name: "A".to_string(), balance: -5.0 };
//! let errors = engine.validate(&account, []).unwrap();
//! assert_eq!(errors.len(), 2);
//!
//! let errors = engine.validate(&account, [Group::Update]).unwrap();
//! assert_eq!(errors[0].code, ApiErrorCode::RequiredViolation);
//! ```

pub mod accessor;
pub mod constraint;
pub mod declare;
pub mod engine;
pub mod error;
pub mod group;
pub mod path;
pub mod registry;
pub mod validation;
pub mod value;

pub use accessor::{FieldShape, FieldTable, PropertyAccessor};
pub use constraint::{Constraint, ConstraintKind, ConstraintValidator, Violation};
pub use declare::{Constrained, FieldBuilder, Node, ObjectMap, TypeDecl};
pub use engine::{CancellationToken, EngineConfig, ValidatorEngine};
pub use error::{ApiError, ApiErrorCode, ApiErrors, EngineError, RegistryError};
pub use group::{Group, GroupSet};
pub use path::{FieldPath, PathSegment};
pub use registry::{RegistrySnapshot, TypeEntry, ValidationRegistry};
pub use validation::ValidationContext;
pub use value::{AsFieldValue, FieldValue, ValueKind};

/// Type alias for validation results using ApiErrors
pub type ValidationResult<T> = stillwater::Validation<T, ApiErrors>;
