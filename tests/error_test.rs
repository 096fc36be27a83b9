use serde_json::json;
use stillwater::prelude::*;
use warden::{
    ApiError, ApiErrorCode, ApiErrors, EngineError, FieldPath, RegistryError,
};

#[test]
fn test_api_error_display_and_json() {
    let error = ApiError::new(ApiErrorCode::StringLengthViolation, "Length must be between 2 and 5")
        .at(FieldPath::from_field("code"));
    assert_eq!(
        error.to_string(),
        "code: Length must be between 2 and 5 [STRING_LENGTH_VIOLATION]"
    );
    assert_eq!(
        error.to_json(),
        json!({
            "code": "STRING_LENGTH_VIOLATION",
            "message": "Length must be between 2 and 5",
            "path": "code",
        })
    );
}

#[test]
fn test_api_errors_combine_preserves_order() {
    let first = ApiErrors::single(ApiError::new(ApiErrorCode::RequiredViolation, "a"));
    let second = ApiErrors::from_vec(vec![
        ApiError::new(ApiErrorCode::RegexViolation, "b"),
        ApiError::new(ApiErrorCode::IbanFormatViolation, "c"),
    ])
    .unwrap();

    let combined = first.combine(second);
    let messages: Vec<_> = combined.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["a", "b", "c"]);
    assert!(combined.to_string().starts_with("Validation failed with 3 error(s):"));
}

#[test]
fn test_api_errors_into_iter() {
    let errors = ApiErrors::single(ApiError::new(ApiErrorCode::CustomViolation, "x"));
    let collected: Vec<ApiError> = errors.into_iter().collect();
    assert_eq!(collected.len(), 1);
}

#[test]
fn test_fatal_error_messages() {
    let err = EngineError::UnsupportedValue {
        constraint: "NumberMin",
        kind: "text",
    };
    assert_eq!(err.to_string(), "NumberMin constraint cannot evaluate a text value");

    let registry_err = RegistryError::DuplicateField {
        type_name: "Account",
        field: "id".to_string(),
    };
    let wrapped: EngineError = registry_err.clone().into();
    assert_eq!(wrapped.to_string(), registry_err.to_string());
    assert_eq!(EngineError::MaxDepthExceeded(4).to_string(), "maximum nesting depth 4 exceeded");
}
