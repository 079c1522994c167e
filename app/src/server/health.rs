//! Readiness and metrics endpoints.

use super::state::AppState;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use boxoffice_core::{BoxOfficeStore, StorageProbe};

/// `GET /ready`: 200 when storage answers, 503 otherwise.
pub async fn readiness_check<S>(State(state): State<AppState<S>>) -> Response
where
    S: BoxOfficeStore + StorageProbe,
{
    boxoffice_web::handlers::readiness(S::BACKEND, state.store.probe().await).into_response()
}

/// `GET /metrics`: Prometheus text format.
#[allow(clippy::unused_async)]
pub async fn metrics_endpoint<S>(State(state): State<AppState<S>>) -> Response {
    match &state.metrics {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics exporter not installed").into_response(),
    }
}
