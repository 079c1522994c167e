//! Booking endpoints.

use super::rejected;
use crate::notifications;
use crate::server::AppState;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use boxoffice_core::{
    Booking, BookingLedger, BookingRequest, BookingSummary, BoxOfficeStore, EventId,
    ReservationError, UserId,
};
use boxoffice_web::{AdminUser, AppError, AuthenticatedUser};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Body of `POST /api/bookings`. The buyer comes from the caller identity.
///
/// Fields stay raw JSON so a wrongly typed value is reported with the same
/// code as any other bad value for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateBookingRequest {
    /// Target event id
    pub event_id: Value,
    /// `"VIP"` or `"regular"`
    pub ticket_class: Value,
    /// Number of tickets
    pub quantity: Value,
}

impl CreateBookingRequest {
    /// Check field types and build the engine request. Values are checked
    /// in the engine's order: class, quantity, event.
    ///
    /// # Errors
    ///
    /// 400 `INVALID_TICKET_CLASS` for a non-string class, 400
    /// `INVALID_QUANTITY` for a quantity that is not an integer in range,
    /// 404 `EVENT_NOT_FOUND` for an id that names no event.
    pub fn into_request(self, user_id: UserId) -> Result<BookingRequest, AppError> {
        let ticket_class = match self.ticket_class {
            Value::String(class) => class,
            other => return Err(ReservationError::InvalidTicketClass(other.to_string()).into()),
        };
        let Some(quantity) = self.quantity.as_i64() else {
            return Err(AppError::new(
                StatusCode::BAD_REQUEST,
                format!("Invalid quantity: {}", self.quantity),
                "INVALID_QUANTITY".to_string(),
            ));
        };
        let event_id = self
            .event_id
            .as_str()
            .and_then(|raw| raw.parse::<EventId>().ok())
            .ok_or_else(|| {
                AppError::new(
                    StatusCode::NOT_FOUND,
                    format!("Event not found: {}", self.event_id),
                    "EVENT_NOT_FOUND".to_string(),
                )
            })?;

        Ok(BookingRequest::new(user_id, event_id, ticket_class, quantity))
    }
}

/// `POST /api/bookings`
///
/// 201 with the committed booking. A confirmation is sent in the background.
///
/// # Errors
///
/// Every [`ReservationError`](boxoffice_core::ReservationError) maps to its
/// status through [`AppError`]; a malformed body is 400.
pub async fn create_booking<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let Json(body) = payload.map_err(rejected)?;
    let request = body.into_request(user.user_id)?;

    let booking = match state.lock_timeout {
        Some(deadline) => state.engine.reserve_within(request, deadline).await?,
        None => state.engine.reserve(request).await?,
    };

    notifications::spawn_confirmation(
        Arc::clone(&state.store),
        Arc::clone(&state.notifier),
        booking.clone(),
    );

    Ok((StatusCode::CREATED, Json(booking)))
}

/// `GET /api/bookings/user`: the caller's bookings with event name and date,
/// newest first.
///
/// # Errors
///
/// 500 if the ledger cannot be read.
pub async fn list_my_bookings<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<BookingSummary>>, AppError> {
    Ok(Json(state.store.list_by_user(user.user_id).await?))
}

/// `GET /api/bookings`: every booking, newest first. Admin only.
///
/// # Errors
///
/// 500 if the ledger cannot be read.
pub async fn list_all_bookings<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<BookingSummary>>, AppError> {
    Ok(Json(state.store.list_all().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> CreateBookingRequest {
        serde_json::from_value(value).unwrap_or_default()
    }

    #[test]
    fn test_well_typed_body_becomes_request() {
        let event_id = EventId::new();
        let user_id = UserId::new();
        let request = body(json!({
            "event_id": event_id.to_string(),
            "ticket_class": "VIP",
            "quantity": 2
        }))
        .into_request(user_id);

        assert_eq!(
            request.ok(),
            Some(BookingRequest::new(user_id, event_id, "VIP", 2))
        );
    }

    #[test]
    fn test_wrong_types_map_to_field_codes() {
        let event_id = EventId::new().to_string();
        let cases = [
            (json!({"event_id": event_id, "ticket_class": 7, "quantity": 1}), "INVALID_TICKET_CLASS"),
            (json!({"event_id": event_id, "quantity": 1}), "INVALID_TICKET_CLASS"),
            (json!({"event_id": event_id, "ticket_class": "VIP", "quantity": 1.5}), "INVALID_QUANTITY"),
            (json!({"event_id": event_id, "ticket_class": "VIP", "quantity": "2"}), "INVALID_QUANTITY"),
            (
                json!({"event_id": event_id, "ticket_class": "VIP", "quantity": 1e30}),
                "INVALID_QUANTITY",
            ),
            (json!({"event_id": "missing", "ticket_class": "VIP", "quantity": 1}), "EVENT_NOT_FOUND"),
            (json!({"event_id": 42, "ticket_class": "VIP", "quantity": 1}), "EVENT_NOT_FOUND"),
        ];

        for (value, code) in cases {
            let err = body(value.clone()).into_request(UserId::new()).err();
            assert_eq!(err.as_ref().map(AppError::code), Some(code), "{value}");
        }
    }
}
