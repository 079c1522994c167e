//! Health check endpoints.
//!
//! Used by load balancers and orchestrators to decide whether to route
//! traffic to this instance.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Liveness: 200 as long as the process can answer.
///
/// Does not touch storage; see [`readiness`] for that.
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness report body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReadinessReport {
    /// `"ready"` or `"unavailable"`
    pub status: &'static str,
    /// Storage backend name
    pub storage: &'static str,
    /// Failure reason, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Turn a storage probe result into a readiness response.
///
/// 200 when the probe succeeded, 503 otherwise.
pub fn readiness<E: std::fmt::Display>(
    storage: &'static str,
    probe: Result<(), E>,
) -> (StatusCode, Json<ReadinessReport>) {
    match probe {
        Ok(()) => (
            StatusCode::OK,
            Json(ReadinessReport {
                status: "ready",
                storage,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(storage, error = %e, "Readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ReadinessReport {
                    status: "unavailable",
                    storage,
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simple_health_check() {
        let (status, body) = health_check().await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[test]
    fn test_readiness_reports_failure() {
        let (status, Json(report)) = readiness("postgres", Err("connection refused"));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(report.status, "unavailable");
        assert_eq!(report.error.as_deref(), Some("connection refused"));

        let (status, Json(report)) = readiness::<String>("memory", Ok(()));
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report.storage, "memory");
    }
}
