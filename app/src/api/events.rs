//! Event catalog endpoints.

use super::rejected;
use crate::metrics;
use crate::server::AppState;
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use boxoffice_core::environment::Clock;
use boxoffice_core::{BoxOfficeStore, Event, EventCatalog, EventId, EventUpdate, NewEvent};
use boxoffice_web::{AdminUser, AppError};

fn event_id(path: Result<Path<EventId>, PathRejection>) -> Result<EventId, AppError> {
    path.map(|Path(id)| id).map_err(rejected)
}

/// `POST /api/events`. Admin only; 201 with the stored event.
///
/// # Errors
///
/// 400 when a required field is blank or the body is malformed.
pub async fn create_event<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    AdminUser(admin): AdminUser,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), AppError> {
    let Json(input) = payload.map_err(rejected)?;
    let event = input.into_event(EventId::new(), state.clock.now())?;
    let event = state.store.create_event(event).await?;

    metrics::record_event_created();
    tracing::info!(event_id = %event.id, admin = %admin.user_id, "Event published");
    Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /api/events`: events dated today or later.
///
/// # Errors
///
/// 500 if the catalog cannot be read.
pub async fn list_upcoming_events<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Event>>, AppError> {
    let today = state.clock.now().date_naive();
    Ok(Json(state.store.list_upcoming(today).await?))
}

/// `GET /api/events/all`. Admin only.
///
/// # Errors
///
/// 500 if the catalog cannot be read.
pub async fn list_all_events<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Event>>, AppError> {
    Ok(Json(state.store.list_all_events().await?))
}

/// `GET /api/events/:id`
///
/// # Errors
///
/// 404 for an unknown event, 400 for an id that is not a UUID.
pub async fn get_event<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<Json<Event>, AppError> {
    let id = event_id(path)?;
    state
        .store
        .get_event(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Event", id))
}

/// `PUT /api/events/:id`: partial update. Admin only.
///
/// # Errors
///
/// 400 when no field is set, 404 for an unknown event.
pub async fn update_event<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    AdminUser(admin): AdminUser,
    path: Result<Path<EventId>, PathRejection>,
    payload: Result<Json<EventUpdate>, JsonRejection>,
) -> Result<Json<Event>, AppError> {
    let id = event_id(path)?;
    let Json(update) = payload.map_err(rejected)?;
    if update.is_empty() {
        return Err(AppError::bad_request("No fields to update"));
    }
    update.validate()?;

    let event = state.store.update_event(id, update).await?;
    tracing::info!(event_id = %id, admin = %admin.user_id, "Event edited");
    Ok(Json(event))
}

/// `DELETE /api/events/:id`. Admin only; 204 on success.
///
/// # Errors
///
/// 404 for an unknown event.
pub async fn delete_event<S: BoxOfficeStore>(
    State(state): State<AppState<S>>,
    AdminUser(admin): AdminUser,
    path: Result<Path<EventId>, PathRejection>,
) -> Result<StatusCode, AppError> {
    let id = event_id(path)?;
    if state.store.delete_event(id).await? {
        tracing::info!(event_id = %id, admin = %admin.user_id, "Event removed");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("Event", id))
    }
}
