//! Recording notifier.

use boxoffice_core::{BookingConfirmation, BookingNotifier, NotificationError};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Captures every confirmation it is asked to deliver.
///
/// Built with [`RecordingNotifier::failing`] it records the attempt and then
/// reports a delivery failure.
#[derive(Clone, Debug, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<BookingConfirmation>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// Notifier that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifier that always fails after recording.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// Confirmations seen so far.
    #[must_use]
    pub fn sent(&self) -> Vec<BookingConfirmation> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Poll until at least `count` confirmations were seen or `timeout`
    /// elapses. Returns whether the count was reached.
    pub async fn wait_for(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.sent().len() >= count {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        self.sent().len() >= count
    }
}

impl BookingNotifier for RecordingNotifier {
    fn booking_confirmed<'a>(
        &'a self,
        confirmation: &'a BookingConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotificationError>> + Send + 'a>> {
        Box::pin(async move {
            self.sent
                .lock()
                .map_err(|_| NotificationError::DeliveryFailed("recorder poisoned".to_string()))?
                .push(confirmation.clone());

            if self.fail {
                Err(NotificationError::DeliveryFailed(
                    "mail relay unavailable".to_string(),
                ))
            } else {
                Ok(())
            }
        })
    }
}
