//! The validation engine.
//!
//! [`ValidatorEngine`] runs every applicable constraint of an instance,
//! recursing into nested objects, and returns all violations in declaration
//! order. Wiring mistakes (an unregistered type, a constraint applied to a
//! value it cannot evaluate) abort the run with an [`EngineError`] instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use stillwater::Validation;

use crate::accessor::PropertyAccessor;
use crate::constraint::Constraint;
use crate::declare::{Constrained, Node};
use crate::error::{ApiError, ApiErrorCode, ApiErrors, EngineError};
use crate::group::{Group, GroupSet};
use crate::path::FieldPath;
use crate::registry::{RegistrySnapshot, ValidationRegistry};
use crate::validation::ValidationContext;
use crate::value::FieldValue;
use crate::ValidationResult;

/// Default limit on nested object depth.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Engine settings.
///
/// # Example
///
/// ```rust
/// use warden::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_max_depth(8)
///     .with_locale("de")
///     .with_lazy_registration(true);
/// assert_eq!(config.max_depth(), 8);
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    max_depth: usize,
    locale: Option<Arc<str>>,
    lazy_registration: bool,
    parallel_threshold: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            locale: None,
            lazy_registration: false,
            parallel_threshold: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how deep nested objects are followed.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Selects locale-scoped message templates.
    pub fn with_locale(mut self, locale: impl Into<Arc<str>>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Registers unknown root types on first use instead of failing.
    pub fn with_lazy_registration(mut self, lazy: bool) -> Self {
        self.lazy_registration = lazy;
        self
    }

    /// Evaluates the fields of objects with at least `fields` fields on the
    /// rayon pool. Reporting order is unaffected.
    pub fn with_parallel_threshold(mut self, fields: usize) -> Self {
        self.parallel_threshold = Some(fields);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn lazy_registration(&self) -> bool {
        self.lazy_registration
    }

    pub fn parallel_threshold(&self) -> Option<usize> {
        self.parallel_threshold
    }
}

/// Cooperative cancellation for in-flight runs.
///
/// Clones share the same flag. A run checks it before every constraint and
/// fails with [`EngineError::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Settings fixed for the duration of one run.
struct Run<'r> {
    snapshot: &'r RegistrySnapshot,
    max_depth: usize,
    parallel_from: usize,
    token: Option<&'r CancellationToken>,
}

impl Run<'_> {
    fn check_cancelled(&self) -> Result<(), EngineError> {
        match self.token {
            Some(token) => token.check(),
            None => Ok(()),
        }
    }
}

/// Orchestrates validation runs against a [`ValidationRegistry`].
///
/// Cheap to clone; clones share the registry.
///
/// # Example
///
/// ```rust
/// use warden::{ApiErrorCode, Constrained, TypeDecl, ValidationRegistry, ValidatorEngine};
/// use warden::constraint::{NumberMin, TextLength};
///
/// struct Item {
///     sku: String,
///     quantity: i32,
/// }
///
/// impl Constrained for Item {
///     fn declare(decl: &mut TypeDecl<Self>) {
///         decl.field("sku", |i: &Item| &i.sku).with(TextLength::new(2, 5));
///         decl.field("quantity", |i: &Item| &i.quantity).with(NumberMin::inclusive(1.0));
///     }
/// }
///
/// let registry = ValidationRegistry::new();
/// registry.register::<Item>().unwrap();
/// let engine = ValidatorEngine::new(registry);
///
/// let errors = engine.validate(&Item { sku: String::new(), quantity: 0 }, []).unwrap();
/// assert_eq!(errors.len(), 2);
/// assert_eq!(errors[0].code, ApiErrorCode::StringLengthViolation);
/// assert_eq!(errors[1].code, ApiErrorCode::MinValueViolation);
/// ```
#[derive(Clone, Default)]
pub struct ValidatorEngine {
    registry: ValidationRegistry,
    config: EngineConfig,
}

impl ValidatorEngine {
    pub fn new(registry: ValidationRegistry) -> Self {
        Self::with_config(registry, EngineConfig::default())
    }

    pub fn with_config(registry: ValidationRegistry, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    pub fn registry(&self) -> &ValidationRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validates `instance` against the constraints active for `groups`.
    ///
    /// With an empty `groups`, only constraints that belong to nothing but
    /// [`Group::Default`] run. Returns every violation in declaration order;
    /// an empty list means the instance is valid.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] for wiring mistakes; no partial result is
    /// produced in that case.
    pub fn validate<T, I>(&self, instance: &T, groups: I) -> Result<Vec<ApiError>, EngineError>
    where
        T: Constrained,
        I: IntoIterator<Item = Group>,
    {
        self.validate_node(instance, GroupSet::requested(groups), None)
    }

    /// Like [`validate`](Self::validate), aborting once `token` is cancelled.
    pub fn validate_with_cancel<T, I>(
        &self,
        instance: &T,
        groups: I,
        token: &CancellationToken,
    ) -> Result<Vec<ApiError>, EngineError>
    where
        T: Constrained,
        I: IntoIterator<Item = Group>,
    {
        self.validate_node(instance, GroupSet::requested(groups), Some(token))
    }

    /// Like [`validate`](Self::validate), evaluating every object's fields
    /// on the rayon pool.
    pub fn validate_parallel<T, I>(
        &self,
        instance: &T,
        groups: I,
    ) -> Result<Vec<ApiError>, EngineError>
    where
        T: Constrained,
        I: IntoIterator<Item = Group>,
    {
        let groups = GroupSet::requested(groups);
        let snapshot = self.prepare(instance)?;
        self.execute(instance, groups, &snapshot, 0, None)
    }

    /// Validates many instances concurrently.
    ///
    /// Results are in input order, one error list per instance. The first
    /// fatal error aborts the whole batch.
    pub fn validate_batch<T, I>(
        &self,
        instances: &[T],
        groups: I,
    ) -> Result<Vec<Vec<ApiError>>, EngineError>
    where
        T: Constrained,
        I: IntoIterator<Item = Group>,
    {
        let groups = GroupSet::requested(groups);
        let Some(first) = instances.first() else {
            return Ok(Vec::new());
        };
        let snapshot = self.prepare(first)?;
        let parallel_from = self.config.parallel_threshold.unwrap_or(usize::MAX);
        instances
            .par_iter()
            .map(|instance| {
                self.execute(instance, groups.clone(), &snapshot, parallel_from, None)
            })
            .collect()
    }

    /// Validates and folds the result into a [`ValidationResult`], for
    /// composing with other stillwater validations.
    pub fn check<T, I>(&self, instance: &T, groups: I) -> Result<ValidationResult<()>, EngineError>
    where
        T: Constrained,
        I: IntoIterator<Item = Group>,
    {
        let errors = self.validate(instance, groups)?;
        Ok(match ApiErrors::from_vec(errors) {
            Some(errors) => Validation::Failure(errors),
            None => Validation::Success(()),
        })
    }

    /// Validates a type-erased instance.
    pub fn validate_node(
        &self,
        instance: &dyn Node,
        groups: GroupSet,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<ApiError>, EngineError> {
        let snapshot = self.prepare(instance)?;
        let parallel_from = self.config.parallel_threshold.unwrap_or(usize::MAX);
        self.execute(instance, groups, &snapshot, parallel_from, token)
    }

    /// Returns a snapshot that knows the root type, registering it first
    /// when lazy registration is on.
    fn prepare(&self, instance: &dyn Node) -> Result<Arc<RegistrySnapshot>, EngineError> {
        let snapshot = self.registry.snapshot();
        if snapshot.entry_for(instance).is_some() {
            return Ok(snapshot);
        }
        if !self.config.lazy_registration {
            return Err(EngineError::UnregisteredType(instance.type_name()));
        }
        tracing::debug!(type_name = instance.type_name(), "registering on first use");
        self.registry.register_node(instance)?;
        Ok(self.registry.snapshot())
    }

    fn execute(
        &self,
        instance: &dyn Node,
        groups: GroupSet,
        snapshot: &Arc<RegistrySnapshot>,
        parallel_from: usize,
        token: Option<&CancellationToken>,
    ) -> Result<Vec<ApiError>, EngineError> {
        let type_name = instance.type_name();
        tracing::debug!(type_name, groups = ?groups, "validation started");

        let run = Run {
            snapshot,
            max_depth: self.config.max_depth,
            parallel_from,
            token,
        };
        let ctx = ValidationContext::new(instance, Arc::clone(snapshot), groups)
            .with_locale(self.config.locale.clone());

        match walk_object(instance, &ctx, &run) {
            Ok(errors) => {
                tracing::debug!(type_name, errors = errors.len(), "validation finished");
                Ok(errors)
            }
            Err(EngineError::Cancelled) => {
                tracing::debug!(type_name, "validation cancelled");
                Err(EngineError::Cancelled)
            }
            Err(err) => Err(err),
        }
    }
}

fn walk_object<'a>(
    node: &'a dyn Node,
    ctx: &ValidationContext<'a>,
    run: &Run<'_>,
) -> Result<Vec<ApiError>, EngineError> {
    if ctx.depth() > run.max_depth {
        return Err(EngineError::MaxDepthExceeded(run.max_depth));
    }
    let entry = run.snapshot.require(node)?;

    if entry.table().len() >= run.parallel_from {
        let fields: Vec<_> = entry.fields().collect();
        let per_field: Vec<Vec<ApiError>> = fields
            .par_iter()
            .map(|(accessor, constraints)| check_field(node, accessor, constraints, ctx, run))
            .collect::<Result<_, _>>()?;
        return Ok(per_field.into_iter().flatten().collect());
    }

    let mut errors = Vec::new();
    for (accessor, constraints) in entry.fields() {
        errors.extend(check_field(node, accessor, constraints, ctx, run)?);
    }
    Ok(errors)
}

/// Runs one field's active constraints, then recurses into nested objects.
///
/// At most one error per code is reported for a field.
fn check_field<'a>(
    node: &'a dyn Node,
    accessor: &PropertyAccessor,
    constraints: &[Constraint],
    ctx: &ValidationContext<'a>,
    run: &Run<'_>,
) -> Result<Vec<ApiError>, EngineError> {
    let value = accessor.get(node)?;
    let path = ctx.path().push_field(accessor.resolved_name());

    let mut errors = Vec::new();
    let mut reported: Vec<ApiErrorCode> = Vec::new();
    for constraint in constraints.iter().filter(|c| c.applies_to(ctx.groups())) {
        run.check_cancelled()?;
        let Some(violation) = constraint.evaluate(&value, ctx)? else {
            continue;
        };
        if reported.contains(&violation.code) {
            continue;
        }
        tracing::trace!(path = %path, code = %violation.code, "constraint violated");
        reported.push(violation.code);
        errors.push(ApiError::new(violation.code, violation.message).at(path.clone()));
    }

    if accessor.shape().is_composite() {
        errors.extend(descend(&value, &path, ctx, run)?);
    }
    Ok(errors)
}

fn descend<'a>(
    value: &FieldValue<'a>,
    path: &FieldPath,
    ctx: &ValidationContext<'a>,
    run: &Run<'_>,
) -> Result<Vec<ApiError>, EngineError> {
    match value {
        FieldValue::Object(child) => {
            let child_ctx = ctx.descend(*child, path.clone());
            walk_object(*child, &child_ctx, run)
        }
        FieldValue::List(items) => {
            let mut errors = Vec::new();
            for (index, item) in items.iter().enumerate() {
                if let FieldValue::Object(child) = item {
                    let child_ctx = ctx.descend(*child, path.push_index(index));
                    errors.extend(walk_object(*child, &child_ctx, run)?);
                }
            }
            Ok(errors)
        }
        FieldValue::Map(entries) => {
            let mut errors = Vec::new();
            for (key, item) in entries {
                if let FieldValue::Object(child) = item {
                    let child_ctx = ctx.descend(*child, path.push_field(*key));
                    errors.extend(walk_object(*child, &child_ctx, run)?);
                }
            }
            Ok(errors)
        }
        _ => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::{NumberMax, NumberMin, Required};
    use crate::declare::TypeDecl;

    struct Score {
        value: Option<f64>,
    }

    impl Constrained for Score {
        fn declare(decl: &mut TypeDecl<Self>) {
            decl.field("value", |s: &Score| &s.value)
                .with(Required::always())
                .with(NumberMin::inclusive(0.0))
                .with(NumberMin::inclusive(10.0))
                .with(NumberMax::inclusive(100.0));
        }
    }

    fn engine() -> ValidatorEngine {
        let registry = ValidationRegistry::new();
        registry.register::<Score>().unwrap();
        ValidatorEngine::new(registry)
    }

    #[test]
    fn test_one_error_per_code_per_field() {
        let errors = engine().validate(&Score { value: Some(-1.0) }, []).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ApiErrorCode::MinValueViolation);
        assert_eq!(errors[0].message, "Must be greater than or equal to 0");
    }

    #[test]
    fn test_null_only_hits_required() {
        let errors = engine().validate(&Score { value: None }, []).unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ApiErrorCode::RequiredViolation);
        assert_eq!(errors[0].path.to_string(), "value");
    }

    #[test]
    fn test_unregistered_is_fatal_unless_lazy() {
        let strict = ValidatorEngine::new(ValidationRegistry::new());
        let err = strict.validate(&Score { value: None }, []).unwrap_err();
        assert!(matches!(err, EngineError::UnregisteredType(_)));

        let lazy = ValidatorEngine::with_config(
            ValidationRegistry::new(),
            EngineConfig::new().with_lazy_registration(true),
        );
        assert_eq!(lazy.validate(&Score { value: Some(50.0) }, []), Ok(Vec::new()));
        assert!(lazy.registry().contains::<Score>());
    }

    #[test]
    fn test_cancelled_run_returns_no_partial_result() {
        let token = CancellationToken::new();
        token.cancel();
        let result = engine().validate_with_cancel(&Score { value: None }, [], &token);
        assert_eq!(result, Err(EngineError::Cancelled));
    }

    #[test]
    fn test_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(config.locale(), None);
        assert!(!config.lazy_registration());
        assert_eq!(config.parallel_threshold(), None);
    }
}
