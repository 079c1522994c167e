//! Business metrics for the box office.
//!
//! # Exported Metrics
//!
//! ## Counters
//! - `boxoffice_reservations_total{outcome,category}` - every reservation
//!   attempt; `category` is `success`, `business`, `cancelled` or
//!   `infrastructure` so sold-out and bad input never read as outages
//! - `boxoffice_tickets_sold_total{class}` - tickets in committed bookings
//! - `boxoffice_notifications_total{status}` - confirmation deliveries
//! - `boxoffice_events_created_total` - admin event creations
//!
//! ## Histograms
//! - `boxoffice_lock_wait_seconds` - time spent waiting for an event lock
//!
//! The HTTP middleware adds `boxoffice_http_requests_total{method,status}`
//! and the Postgres store adds `boxoffice_store_rollbacks_total`.

use boxoffice_core::{Booking, ReservationError};
use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;
use thiserror::Error;

/// Errors from metrics setup.
#[derive(Error, Debug)]
pub enum MetricsError {
    /// Failed to build metrics exporter
    #[error("Failed to build metrics exporter: {0}")]
    Build(String),
    /// Failed to install metrics exporter
    #[error("Failed to install metrics exporter: {0}")]
    Install(String),
}

/// Install the Prometheus recorder and describe every metric.
///
/// # Errors
///
/// Returns [`MetricsError`] if the exporter cannot be built or a recorder
/// is already installed.
pub fn install_prometheus() -> Result<PrometheusHandle, MetricsError> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Suffix("_seconds".to_string()),
            &[
                0.000_5, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ],
        )
        .map_err(|e| MetricsError::Build(e.to_string()))?
        .install_recorder()
        .map_err(|e| MetricsError::Install(e.to_string()))?;

    register_business_metrics();
    Ok(handle)
}

/// Register all metric descriptions.
pub fn register_business_metrics() {
    describe_counter!(
        "boxoffice_reservations_total",
        "Reservation attempts by outcome and category"
    );
    describe_counter!(
        "boxoffice_tickets_sold_total",
        "Tickets in committed bookings by class"
    );
    describe_counter!(
        "boxoffice_notifications_total",
        "Booking confirmation deliveries by status"
    );
    describe_counter!(
        "boxoffice_events_created_total",
        "Events created through the admin API"
    );
    describe_histogram!(
        "boxoffice_lock_wait_seconds",
        "Time spent waiting for exclusive access to an event"
    );

    tracing::info!("Business metrics registered");
}

/// Category label for a reservation outcome.
#[must_use]
pub const fn outcome_category(result: &Result<Booking, ReservationError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(ReservationError::Cancelled) => "cancelled",
        Err(ReservationError::TransactionFailed(_)) => "infrastructure",
        Err(_) => "business",
    }
}

/// Count one reservation attempt.
pub fn record_reservation_outcome(result: &Result<Booking, ReservationError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    metrics::counter!(
        "boxoffice_reservations_total",
        "outcome" => outcome,
        "category" => outcome_category(result),
    )
    .increment(1);

    if let Ok(booking) = result {
        metrics::counter!(
            "boxoffice_tickets_sold_total",
            "class" => booking.ticket_class.as_str(),
        )
        .increment(u64::from(booking.quantity));
    }
}

/// Record how long a reservation waited for its event lock.
pub fn record_lock_wait(waited: Duration) {
    metrics::histogram!("boxoffice_lock_wait_seconds").record(waited.as_secs_f64());
}

/// Count one confirmation delivery attempt.
pub fn record_notification(delivered: bool) {
    let status = if delivered { "delivered" } else { "failed" };
    metrics::counter!("boxoffice_notifications_total", "status" => status).increment(1);
}

/// Count one admin event creation.
pub fn record_event_created() {
    metrics::counter!("boxoffice_events_created_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxoffice_core::{EventId, StoreError, TicketClass};

    #[test]
    fn test_outcome_categories() {
        let sold_out = Err(ReservationError::InsufficientInventory {
            class: TicketClass::Vip,
            requested: 1,
            remaining: 0,
        });
        assert_eq!(outcome_category(&sold_out), "business");
        assert_eq!(
            outcome_category(&Err(ReservationError::EventNotFound(EventId::new()))),
            "business"
        );
        assert_eq!(
            outcome_category(&Err(ReservationError::Cancelled)),
            "cancelled"
        );
        assert_eq!(
            outcome_category(&Err(ReservationError::TransactionFailed(
                StoreError::DatabaseError("down".into())
            ))),
            "infrastructure"
        );
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_reservation_outcome(&Err(ReservationError::Cancelled));
        record_lock_wait(Duration::from_millis(3));
        record_notification(false);
        record_event_created();
    }
}
