//! Validation failure types.
//!
//! This module provides [`ApiError`] for a single failed constraint check,
//! the closed [`ApiErrorCode`] enumeration, and [`ApiErrors`] for
//! accumulating multiple failures.

use std::fmt::{self, Display};

use serde_json::{json, Value};
use stillwater::prelude::*;

use crate::path::FieldPath;

/// Machine-readable violation kinds, one per constraint failure mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiErrorCode {
    RequiredViolation,
    MinValueViolation,
    MaxValueViolation,
    StringLengthViolation,
    ArraySizeViolation,
    MapSizeViolation,
    DivisibleByViolation,
    MultipleOfViolation,
    AllowedValueViolation,
    ForbiddenValueViolation,
    InequalityViolation,
    DependencyTypeViolation,
    RegexViolation,
    Base64FormatViolation,
    HexColorFormatViolation,
    IbanFormatViolation,
    CountryCodeViolation,
    LanguageCodeViolation,
    EnumValueViolation,
    CustomViolation,
}

impl ApiErrorCode {
    /// Returns the wire name of this code, e.g. `MIN_VALUE_VIOLATION`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiErrorCode::RequiredViolation => "REQUIRED_VIOLATION",
            ApiErrorCode::MinValueViolation => "MIN_VALUE_VIOLATION",
            ApiErrorCode::MaxValueViolation => "MAX_VALUE_VIOLATION",
            ApiErrorCode::StringLengthViolation => "STRING_LENGTH_VIOLATION",
            ApiErrorCode::ArraySizeViolation => "ARRAY_SIZE_VIOLATION",
            ApiErrorCode::MapSizeViolation => "MAP_SIZE_VIOLATION",
            ApiErrorCode::DivisibleByViolation => "DIVISIBLE_BY_VIOLATION",
            ApiErrorCode::MultipleOfViolation => "MULTIPLE_OF_VIOLATION",
            ApiErrorCode::AllowedValueViolation => "ALLOWED_VALUE_VIOLATION",
            ApiErrorCode::ForbiddenValueViolation => "FORBIDDEN_VALUE_VIOLATION",
            ApiErrorCode::InequalityViolation => "INEQUALITY_VIOLATION",
            ApiErrorCode::DependencyTypeViolation => "DEPENDENCY_TYPE_VIOLATION",
            ApiErrorCode::RegexViolation => "REGEX_VIOLATION",
            ApiErrorCode::Base64FormatViolation => "BASE64_FORMAT_VIOLATION",
            ApiErrorCode::HexColorFormatViolation => "HEX_COLOR_FORMAT_VIOLATION",
            ApiErrorCode::IbanFormatViolation => "IBAN_FORMAT_VIOLATION",
            ApiErrorCode::CountryCodeViolation => "COUNTRY_CODE_VIOLATION",
            ApiErrorCode::LanguageCodeViolation => "LANGUAGE_CODE_VIOLATION",
            ApiErrorCode::EnumValueViolation => "ENUM_VALUE_VIOLATION",
            ApiErrorCode::CustomViolation => "CUSTOM_VIOLATION",
        }
    }
}

impl Display for ApiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outcome of one failed constraint check.
///
/// `path` locates the offending field inside the validated object graph,
/// using external (renamed) field names. It is empty only for errors raised
/// against the root object itself.
///
/// # Example
///
/// ```rust
/// use warden::{ApiError, ApiErrorCode, FieldPath};
///
/// let error = ApiError::new(ApiErrorCode::MinValueViolation, "Must be greater than or equal to 10")
///     .at(FieldPath::from_field("quantity"));
///
/// assert_eq!(error.to_string(), "quantity: Must be greater than or equal to 10 [MIN_VALUE_VIOLATION]");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    /// The violation kind.
    pub code: ApiErrorCode,
    /// Human-readable message, rendered from the constraint's template.
    pub message: String,
    /// Where the violation occurred.
    pub path: FieldPath,
}

impl ApiError {
    /// Creates an error at the root path.
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: FieldPath::root(),
        }
    }

    /// Sets the path and returns self for chaining.
    pub fn at(mut self, path: FieldPath) -> Self {
        self.path = path;
        self
    }

    /// Renders the error as the JSON body an integration layer would return.
    pub fn to_json(&self) -> Value {
        json!({
            "code": self.code.as_str(),
            "message": self.message,
            "path": self.path.to_string(),
        })
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path_str = if self.path.is_empty() {
            "(root)".to_string()
        } else {
            self.path.to_string()
        };
        write!(f, "{}: {} [{}]", path_str, self.message, self.code)
    }
}

impl std::error::Error for ApiError {}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ApiError>();
    assert_sync::<ApiError>();
};

/// A non-empty collection of validation failures.
///
/// Used as the failure side of [`ValidationResult`](crate::ValidationResult),
/// so it implements `Semigroup` and can be combined with the results of
/// other validations.
///
/// ```rust
/// use warden::{ApiError, ApiErrorCode, ApiErrors};
/// use stillwater::prelude::*;
///
/// let a = ApiErrors::single(ApiError::new(ApiErrorCode::RequiredViolation, "Must not be null"));
/// let b = ApiErrors::single(ApiError::new(ApiErrorCode::RegexViolation, "bad format"));
/// assert_eq!(a.combine(b).len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiErrors(NonEmptyVec<ApiError>);

impl ApiErrors {
    /// Creates an `ApiErrors` containing a single error.
    pub fn single(error: ApiError) -> Self {
        Self(NonEmptyVec::singleton(error))
    }

    /// Creates an `ApiErrors` from a list, or `None` when the list is empty.
    pub fn from_vec(errors: Vec<ApiError>) -> Option<Self> {
        NonEmptyVec::from_vec(errors).map(Self)
    }

    /// Returns the number of errors in this collection.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `Vec`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns an iterator over the contained errors.
    pub fn iter(&self) -> impl Iterator<Item = &ApiError> {
        self.0.iter()
    }

    /// Returns the first error in the collection.
    pub fn first(&self) -> &ApiError {
        self.0.head()
    }

    /// Returns all errors with the given code.
    pub fn with_code(&self, code: ApiErrorCode) -> Vec<&ApiError> {
        self.0.iter().filter(|e| e.code == code).collect()
    }

    /// Returns all errors at the given path.
    pub fn at_path(&self, path: &FieldPath) -> Vec<&ApiError> {
        self.0.iter().filter(|e| &e.path == path).collect()
    }

    /// Converts this collection into a `Vec<ApiError>`.
    pub fn into_vec(self) -> Vec<ApiError> {
        self.0.into_vec()
    }

    /// Renders all errors as a JSON array.
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(ApiError::to_json).collect())
    }
}

impl Semigroup for ApiErrors {
    fn combine(self, other: Self) -> Self {
        ApiErrors(self.0.combine(other.0))
    }
}

impl Display for ApiErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} error(s):", self.len())?;
        for (i, error) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiErrors {}

impl IntoIterator for ApiErrors {
    type Item = ApiError;
    type IntoIter = std::vec::IntoIter<ApiError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}
