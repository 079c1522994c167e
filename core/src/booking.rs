//! Booking requests and committed bookings.

use crate::types::{BookingId, EventId, Money, TicketClass, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A purchase request as received from the caller layer.
///
/// The class and quantity are kept in their raw form so the reservation
/// engine can reject malformed input with a typed error before any lock is
/// taken. Not persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Authenticated caller
    pub user_id: UserId,
    /// Target event
    pub event_id: EventId,
    /// Requested class name (`"VIP"` or `"regular"`)
    pub ticket_class: String,
    /// Requested number of tickets, must be positive
    pub quantity: i64,
}

impl BookingRequest {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        user_id: UserId,
        event_id: EventId,
        ticket_class: impl Into<String>,
        quantity: i64,
    ) -> Self {
        Self {
            user_id,
            event_id,
            ticket_class: ticket_class.into(),
            quantity,
        }
    }
}

/// A booking about to be appended to the ledger inside a reservation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewBooking {
    /// Buyer
    pub user_id: UserId,
    /// Event whose inventory was decremented
    pub event_id: EventId,
    /// Class purchased
    pub ticket_class: TicketClass,
    /// Number of tickets
    pub quantity: u32,
    /// Unit price at lock time times quantity
    pub total_price: Money,
    /// Commit timestamp
    pub created_at: DateTime<Utc>,
}

impl NewBooking {
    /// Attach the identity assigned by the ledger.
    #[must_use]
    pub fn with_id(self, id: BookingId) -> Booking {
        Booking {
            id,
            user_id: self.user_id,
            event_id: self.event_id,
            ticket_class: self.ticket_class,
            quantity: self.quantity,
            total_price: self.total_price,
            created_at: self.created_at,
        }
    }
}

/// A committed booking. Immutable once written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    /// Ledger identity
    pub id: BookingId,
    /// Buyer
    pub user_id: UserId,
    /// Referenced event
    pub event_id: EventId,
    /// Class purchased
    pub ticket_class: TicketClass,
    /// Number of tickets
    pub quantity: u32,
    /// Computed total, never caller-supplied
    pub total_price: Money,
    /// Commit timestamp
    pub created_at: DateTime<Utc>,
}

/// A booking as listed back to callers, joined with its event's name and
/// date. Both are `None` once the event has been deleted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingSummary {
    /// The ledger row
    #[serde(flatten)]
    pub booking: Booking,
    /// Name of the referenced event
    pub event_name: Option<String>,
    /// Date of the referenced event
    pub event_date: Option<NaiveDate>,
}

impl BookingSummary {
    /// Summary of a booking whose event is no longer in the catalog.
    #[must_use]
    pub const fn orphaned(booking: Booking) -> Self {
        Self {
            booking,
            event_name: None,
            event_date: None,
        }
    }
}
