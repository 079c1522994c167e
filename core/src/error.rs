//! Error types for the reservation core.
//!
//! Two layers:
//!
//! - [`StoreError`]: what a storage collaborator reports (connection lost,
//!   constraint violated, bad row data, injected fault in tests).
//! - [`ReservationError`]: what the reservation engine returns to its caller.
//!   Every storage failure is folded into
//!   [`ReservationError::TransactionFailed`]; all other variants are business
//!   outcomes decided before anything was mutated.

use crate::types::{EventId, TicketClass};
use thiserror::Error;

/// Result type alias for storage collaborators.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by storage collaborators.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Database connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// A row could not be converted into a domain value.
    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    /// An admin operation targeted an event that does not exist.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// A decrement would take a count below zero. Only reachable if a
    /// caller skips the availability check.
    #[error("Inventory underflow for {class} on event {event_id}")]
    Underflow {
        /// Event whose row was locked
        event_id: EventId,
        /// Class being decremented
        class: TicketClass,
    },
}

/// Errors returned by the reservation engine.
///
/// None of these are retried internally. Only
/// [`TransactionFailed`](Self::TransactionFailed) and
/// [`Cancelled`](Self::Cancelled) are worth retrying with a fresh request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReservationError {
    /// The ticket class is neither VIP nor regular.
    #[error("Invalid ticket class: {0:?}")]
    InvalidTicketClass(String),

    /// The quantity is not a positive ticket count, or its total price
    /// cannot be represented.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// No inventory row for the event.
    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    /// Fewer tickets remain than were requested.
    #[error("Insufficient inventory: requested {requested} {class}, {remaining} remaining")]
    InsufficientInventory {
        /// Class requested
        class: TicketClass,
        /// Quantity requested
        requested: u32,
        /// Count read under the lock
        remaining: u32,
    },

    /// The caller gave up while waiting for the event lock. Nothing was mutated.
    #[error("Reservation cancelled before the event was locked")]
    Cancelled,

    /// Storage failed inside the reservation unit; it was rolled back.
    #[error("Transaction failed: {0}")]
    TransactionFailed(#[from] StoreError),
}

impl ReservationError {
    /// Short, stable label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidTicketClass(_) => "invalid_ticket_class",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::EventNotFound(_) => "event_not_found",
            Self::InsufficientInventory { .. } => "insufficient_inventory",
            Self::Cancelled => "cancelled",
            Self::TransactionFailed(_) => "transaction_failed",
        }
    }

    /// Business outcome (bad input, unknown event, sold out) as opposed to an
    /// infrastructure failure or a caller-side abort.
    #[must_use]
    pub const fn is_business_outcome(&self) -> bool {
        matches!(
            self,
            Self::InvalidTicketClass(_)
                | Self::InvalidQuantity(_)
                | Self::EventNotFound(_)
                | Self::InsufficientInventory { .. }
        )
    }

    /// Whether an identical fresh request could succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Cancelled | Self::TransactionFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        let sold_out = ReservationError::InsufficientInventory {
            class: TicketClass::Vip,
            requested: 2,
            remaining: 1,
        };
        assert!(sold_out.is_business_outcome());
        assert!(!sold_out.is_retryable());
        assert_eq!(
            sold_out.to_string(),
            "Insufficient inventory: requested 2 VIP, 1 remaining"
        );

        let failed = ReservationError::from(StoreError::DatabaseError("boom".to_string()));
        assert!(!failed.is_business_outcome());
        assert!(failed.is_retryable());
        assert_eq!(failed.kind(), "transaction_failed");

        assert!(!ReservationError::Cancelled.is_business_outcome());
        assert!(ReservationError::Cancelled.is_retryable());
    }
}
