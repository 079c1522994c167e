//! Post-commit notifications (confirmation email, ticket document).
//!
//! Notifications are fire-and-forget from the reservation engine's point of
//! view: they run after the booking is committed and their failure never
//! affects it.

use crate::booking::Booking;
use chrono::{NaiveDate, NaiveTime};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors from notification delivery.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    /// The delivery channel rejected or could not accept the message.
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
}

/// What a confirmation needs to say about a committed booking.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BookingConfirmation {
    /// The committed booking
    pub booking: Booking,
    /// Event name
    pub event_name: String,
    /// Event date
    pub event_date: NaiveDate,
    /// Event start time
    pub event_time: NaiveTime,
    /// Venue
    pub venue: String,
}

impl BookingConfirmation {
    /// Short code printed on the ticket, derived from the booking id.
    #[must_use]
    pub fn transaction_code(&self) -> String {
        self.booking
            .id
            .as_uuid()
            .simple()
            .to_string()
            .chars()
            .take(12)
            .collect::<String>()
            .to_uppercase()
    }
}

/// Outbound notification channel.
///
/// Uses explicit `Pin<Box<dyn Future>>` returns so it can be held as
/// `Arc<dyn BookingNotifier>`.
pub trait BookingNotifier: Send + Sync {
    /// Deliver confirmation (and ticket document) for a committed booking.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] if delivery fails. Callers log and
    /// drop it.
    fn booking_confirmed<'a>(
        &'a self,
        confirmation: &'a BookingConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotificationError>> + Send + 'a>>;
}
