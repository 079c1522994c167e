//! # Box Office Core
//!
//! Domain types and collaborator traits for booking tickets against a finite,
//! typed inventory (VIP / regular) without ever overselling an event.
//!
//! This crate contains no I/O. It defines:
//!
//! - **Values**: [`EventId`], [`UserId`], [`BookingId`], [`Money`], [`TicketClass`]
//! - **Entities**: [`Event`] with its [`EventInventory`], the immutable [`Booking`]
//!   and the [`BookingSummary`] the ledger lists
//! - **Inputs**: [`BookingRequest`] (raw, unvalidated), [`NewEvent`], [`EventUpdate`]
//! - **Errors**: [`ReservationError`] (the engine's taxonomy) and [`StoreError`]
//! - **Collaborators**: [`InventoryStore`] / [`EventLock`], [`BookingLedger`],
//!   [`EventCatalog`], [`StorageProbe`] and [`BookingNotifier`]
//!
//! ## Reservation unit
//!
//! ```text
//! lock_event(id) ──► EventLock ──► inventory()   (counts + prices, read under the lock)
//!                          │
//!                          ├──► decrement(class, n)
//!                          ├──► append_booking(new)
//!                          └──► commit()  |  release() / drop  (rollback)
//! ```
//!
//! Implementations live in `boxoffice-postgres` (row locks inside a database
//! transaction) and `boxoffice-testing` (per-event async mutexes).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod booking;
pub mod error;
pub mod event;
pub mod notify;
pub mod store;
pub mod types;

pub use booking::{Booking, BookingRequest, BookingSummary, NewBooking};
pub use error::{ReservationError, StoreError, StoreResult};
pub use event::{Event, EventInventory, EventUpdate, NewEvent, NewEventError};
pub use notify::{BookingConfirmation, BookingNotifier, NotificationError};
pub use store::{
    BookingLedger, BoxOfficeStore, EventCatalog, EventLock, InventoryStore, StorageProbe,
};
pub use types::{BookingId, EventId, Money, TicketClass, UnknownTicketClass, UserId};

// Re-export commonly used types
pub use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Environment module - injected dependencies that are not storage.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use boxoffice_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let before = clock.now();
    /// assert!(clock.now() >= before);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
