//! Error types for web handlers.
//!
//! [`AppError`] is the only error a handler returns. Domain errors convert
//! into it with `?`; the conversion decides the status code and what the
//! client gets to see.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use boxoffice_core::{NewEventError, ReservationError, StoreError};
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Serialised as `{"code": ..., "message": ..., "details": ...}`. Server
/// errors keep their cause in `source` for logging; it is never sent to the
/// client.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    code: String,
    details: Option<serde_json::Value>,
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            details: None,
            source: None,
        }
    }

    /// Attach the underlying cause (logged, not returned).
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Attach structured details for the client.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// 401 Unauthorized.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// 403 Forbidden.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            message.into(),
            "FORBIDDEN".to_string(),
        )
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// 503 Service Unavailable.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                ),
                None => tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                ),
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
            details: self.details,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

/// Business outcomes become 4xx with the error's own message; `Cancelled`
/// is 503 (retry later) and storage failures are an opaque 500.
impl From<ReservationError> for AppError {
    fn from(err: ReservationError) -> Self {
        let code = err.kind().to_ascii_uppercase();
        match err {
            ReservationError::InvalidTicketClass(_) | ReservationError::InvalidQuantity(_) => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), code)
            }
            ReservationError::EventNotFound(_) => {
                Self::new(StatusCode::NOT_FOUND, err.to_string(), code)
            }
            ReservationError::InsufficientInventory {
                class,
                requested,
                remaining,
            } => Self::new(
                StatusCode::BAD_REQUEST,
                format!("Only {remaining} {class} tickets available"),
                code,
            )
            .with_details(serde_json::json!({
                "ticket_class": class,
                "requested": requested,
                "remaining": remaining,
            })),
            ReservationError::Cancelled => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "The event is busy, please try again".to_string(),
                code,
            ),
            ReservationError::TransactionFailed(_) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Booking could not be completed, please try again".to_string(),
                code,
            )
            .with_source(anyhow::Error::new(err)),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EventNotFound(id) => Self::not_found("Event", id),
            other => Self::internal("Storage error").with_source(anyhow::Error::new(other)),
        }
    }
}

impl From<NewEventError> for AppError {
    fn from(err: NewEventError) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            err.to_string(),
            "VALIDATION_ERROR".to_string(),
        )
    }
}
