//! HTTP API handlers.
//!
//! Thin adapters: extract identity and input, call the engine or the store,
//! let `AppError` conversions pick the status code.

pub mod bookings;
pub mod events;

use boxoffice_web::AppError;

/// Map an axum extractor rejection to our JSON error body.
pub(crate) fn rejected(rejection: impl std::fmt::Display) -> AppError {
    AppError::bad_request(rejection.to_string())
}
