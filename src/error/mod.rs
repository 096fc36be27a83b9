//! Error types.
//!
//! Validation failures are values ([`ApiError`], [`ApiErrors`]); wiring and
//! configuration mistakes are fatal ([`EngineError`], [`RegistryError`]).

mod api_error;
mod engine_error;

pub use api_error::{ApiError, ApiErrorCode, ApiErrors};
pub use engine_error::{EngineError, RegistryError};
