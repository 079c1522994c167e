//! Booking confirmations.
//!
//! Confirmations run after the booking is committed, on their own task.
//! A failed delivery is logged and counted; the booking stands.

use crate::metrics;
use boxoffice_core::{
    Booking, BookingConfirmation, BookingNotifier, EventCatalog, NotificationError,
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Writes confirmations to the log instead of sending mail.
///
/// Stands in for the mail relay and ticket renderer, which live outside
/// this service.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl BookingNotifier for LogNotifier {
    fn booking_confirmed<'a>(
        &'a self,
        confirmation: &'a BookingConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotificationError>> + Send + 'a>> {
        Box::pin(async move {
            tracing::info!(
                booking_id = %confirmation.booking.id,
                user_id = %confirmation.booking.user_id,
                transaction_code = %confirmation.transaction_code(),
                event = %confirmation.event_name,
                date = %confirmation.event_date,
                time = %confirmation.event_time,
                venue = %confirmation.venue,
                class = %confirmation.booking.ticket_class,
                quantity = confirmation.booking.quantity,
                total_price = %confirmation.booking.total_price,
                "Booking confirmation issued"
            );
            Ok(())
        })
    }
}

/// Discards every confirmation. Used when notifications are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledNotifier;

impl BookingNotifier for DisabledNotifier {
    fn booking_confirmed<'a>(
        &'a self,
        _confirmation: &'a BookingConfirmation,
    ) -> Pin<Box<dyn Future<Output = Result<(), NotificationError>> + Send + 'a>> {
        Box::pin(async { Ok(()) })
    }
}

/// Look up the event and deliver a confirmation for `booking` on a
/// background task.
///
/// The returned handle is only useful to tests; callers normally drop it.
pub fn spawn_confirmation<C>(
    catalog: Arc<C>,
    notifier: Arc<dyn BookingNotifier>,
    booking: Booking,
) -> JoinHandle<()>
where
    C: EventCatalog + 'static,
{
    tokio::spawn(async move {
        let event = match catalog.get_event(booking.event_id).await {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::warn!(booking_id = %booking.id, "Event vanished before confirmation");
                metrics::record_notification(false);
                return;
            }
            Err(e) => {
                tracing::warn!(booking_id = %booking.id, error = %e, "Could not load event for confirmation");
                metrics::record_notification(false);
                return;
            }
        };

        let confirmation = BookingConfirmation {
            booking,
            event_name: event.name,
            event_date: event.date,
            event_time: event.time,
            venue: event.venue,
        };

        match notifier.booking_confirmed(&confirmation).await {
            Ok(()) => metrics::record_notification(true),
            Err(e) => {
                tracing::warn!(
                    booking_id = %confirmation.booking.id,
                    error = %e,
                    "Booking confirmation failed"
                );
                metrics::record_notification(false);
            }
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use boxoffice_core::{BookingId, Money, NewBooking, TicketClass, UserId};
    use boxoffice_testing::fixtures::EventBuilder;
    use boxoffice_testing::{InMemoryBoxOffice, RecordingNotifier, test_clock};
    use boxoffice_core::environment::Clock;

    fn booking_for(event_id: boxoffice_core::EventId) -> Booking {
        NewBooking {
            user_id: UserId::new(),
            event_id,
            ticket_class: TicketClass::Vip,
            quantity: 2,
            total_price: Money::from_cents(30_000),
            created_at: test_clock().now(),
        }
        .with_id(BookingId::new())
    }

    #[tokio::test]
    async fn test_confirmation_carries_event_details() {
        let event = EventBuilder::new().name("Jazz Night").build();
        let store = Arc::new(InMemoryBoxOffice::new().with_event(event.clone()));
        let notifier = RecordingNotifier::new();
        let booking = booking_for(event.id);

        spawn_confirmation(store, Arc::new(notifier.clone()), booking.clone())
            .await
            .unwrap();

        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].booking, booking);
        assert_eq!(sent[0].event_name, "Jazz Night");
        assert_eq!(sent[0].venue, event.venue);
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_panic_task() {
        let event = EventBuilder::new().build();
        let store = Arc::new(InMemoryBoxOffice::new().with_event(event.clone()));
        let notifier = RecordingNotifier::failing();

        let outcome =
            spawn_confirmation(store, Arc::new(notifier.clone()), booking_for(event.id)).await;

        assert!(outcome.is_ok());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_log_notifier_succeeds() {
        let confirmation = BookingConfirmation {
            booking: booking_for(boxoffice_core::EventId::new()),
            event_name: "Gala".to_string(),
            event_date: test_clock().now().date_naive(),
            event_time: test_clock().now().time(),
            venue: "Hall A".to_string(),
        };
        assert!(LogNotifier.booking_confirmed(&confirmation).await.is_ok());
        assert!(DisabledNotifier.booking_confirmed(&confirmation).await.is_ok());
    }
}
