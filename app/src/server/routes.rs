//! Router configuration.

use super::StorageProbe;
use super::health::{metrics_endpoint, readiness_check};
use super::state::AppState;
use crate::api::{bookings, events};
use axum::{
    Router,
    routing::{get, post},
};
use boxoffice_core::BoxOfficeStore;
use boxoffice_web::{correlation_id_layer, handlers::health_check};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the complete router over `state`.
///
/// ```text
/// GET    /health                liveness
/// GET    /ready                 storage readiness
/// GET    /metrics               Prometheus
/// POST   /api/bookings          reserve (authenticated)
/// GET    /api/bookings          all bookings (admin)
/// GET    /api/bookings/user     caller's bookings (authenticated)
/// POST   /api/events            create (admin)
/// GET    /api/events            upcoming
/// GET    /api/events/all        all events (admin)
/// GET    /api/events/:id        one event
/// PUT    /api/events/:id        partial update (admin)
/// DELETE /api/events/:id        delete (admin)
/// ```
pub fn build_router<S>(state: AppState<S>) -> Router
where
    S: BoxOfficeStore + StorageProbe,
{
    let api_routes = Router::new()
        .route(
            "/bookings",
            post(bookings::create_booking::<S>).get(bookings::list_all_bookings::<S>),
        )
        .route("/bookings/user", get(bookings::list_my_bookings::<S>))
        .route(
            "/events",
            post(events::create_event::<S>).get(events::list_upcoming_events::<S>),
        )
        .route("/events/all", get(events::list_all_events::<S>))
        .route(
            "/events/:id",
            get(events::get_event::<S>)
                .put(events::update_event::<S>)
                .delete(events::delete_event::<S>),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check::<S>))
        .route("/metrics", get(metrics_endpoint::<S>))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(correlation_id_layer())
        .with_state(state)
}
