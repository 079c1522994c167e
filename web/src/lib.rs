//! Axum integration for the box office.
//!
//! The HTTP layer is the caller of the reservation engine: it establishes
//! who is asking, forwards the request, and turns the typed result into a
//! status code and JSON body. This crate holds the pieces of that layer that
//! do not depend on a particular store:
//!
//! - [`AppError`]: the handler error type, with conversions from every
//!   domain error
//! - [`extractors`]: caller identity and correlation id
//! - [`middleware`]: correlation id propagation and request logging
//! - [`handlers`]: liveness and readiness
//!
//! # Example
//!
//! ```ignore
//! use boxoffice_web::{AppError, AuthenticatedUser};
//! use axum::{Json, extract::State};
//!
//! async fn my_bookings(
//!     State(state): State<AppState>,
//!     user: AuthenticatedUser,
//! ) -> Result<Json<Vec<BookingSummary>>, AppError> {
//!     Ok(Json(state.store.list_by_user(user.user_id).await?))
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;

pub use error::AppError;
pub use extractors::{AdminUser, AuthenticatedUser, CorrelationId, Role};
pub use middleware::{CORRELATION_ID_HEADER, CorrelationIdExt, correlation_id_layer};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
