//! Application state shared by every handler.

use crate::reservation::ReservationEngine;
use boxoffice_core::environment::Clock;
use boxoffice_core::{BookingNotifier, BoxOfficeStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;

/// Handler state, cloned per request (every field is shared).
pub struct AppState<S> {
    /// Reservation engine over `store`
    pub engine: ReservationEngine<S>,
    /// The backing store (catalog and ledger reads go here directly)
    pub store: Arc<S>,
    /// Post-commit confirmation channel
    pub notifier: Arc<dyn BookingNotifier>,
    /// Time source for event creation and "upcoming"
    pub clock: Arc<dyn Clock>,
    /// Lock-wait deadline applied to HTTP bookings
    pub lock_timeout: Option<Duration>,
    /// Prometheus renderer, when the exporter is installed
    pub metrics: Option<PrometheusHandle>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            clock: Arc::clone(&self.clock),
            lock_timeout: self.lock_timeout,
            metrics: self.metrics.clone(),
        }
    }
}

impl<S: BoxOfficeStore> AppState<S> {
    /// Wire the engine to `store` and share the rest.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn BookingNotifier>,
        lock_timeout: Option<Duration>,
    ) -> Self {
        Self {
            engine: ReservationEngine::new(Arc::clone(&store), Arc::clone(&clock)),
            store,
            notifier,
            clock,
            lock_timeout,
            metrics: None,
        }
    }

    /// Serve `/metrics` from this handle.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}
