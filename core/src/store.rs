//! Storage collaborator traits.
//!
//! # Exclusive access
//!
//! [`InventoryStore::lock_event`] is the only way to mutate an event's
//! counts. It resolves once the caller holds exclusive access to that one
//! event row; every other lock request for the same event waits until the
//! returned [`EventLock`] is committed, released or dropped. Requests for
//! different events never wait on each other.
//!
//! A reservation unit holds at most one lock, so there is no lock ordering
//! to get wrong.
//!
//! # Atomicity
//!
//! [`EventLock::decrement`] and [`EventLock::append_booking`] are staged
//! inside the unit. They become visible together on
//! [`EventLock::commit`], or not at all. Dropping a lock without committing
//! is a rollback.
//!
//! # Implementations
//!
//! - `PostgresBoxOffice` (in `boxoffice-postgres`): `SELECT ... FOR UPDATE`
//!   inside a transaction
//! - `InMemoryBoxOffice` (in `boxoffice-testing`): one async mutex per event

use crate::booking::{Booking, BookingSummary, NewBooking};
use crate::error::StoreResult;
use crate::event::{Event, EventInventory, EventUpdate};
use crate::types::{BookingId, EventId, TicketClass, UserId};
use chrono::NaiveDate;
use std::future::Future;

/// Inventory rows that can be locked one event at a time.
pub trait InventoryStore: Send + Sync {
    /// Exclusive handle type.
    type Lock: EventLock;

    /// Wait for exclusive access to an event's inventory row.
    ///
    /// Returns `Ok(None)` if the event does not exist; nothing is held in
    /// that case.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`](crate::StoreError) if the store cannot be
    /// reached or the row cannot be read.
    fn lock_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = StoreResult<Option<Self::Lock>>> + Send;
}

/// Exclusive access to one event's inventory, scoped to a reservation unit.
pub trait EventLock: Send {
    /// The locked event.
    fn event_id(&self) -> EventId;

    /// Counts and prices as read when the lock was granted.
    fn inventory(&self) -> &EventInventory;

    /// Stage a decrement of `amount` tickets of `class`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Underflow`](crate::StoreError::Underflow) if the
    /// count would go negative, or a storage error.
    fn decrement(
        &mut self,
        class: TicketClass,
        amount: u32,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Stage a ledger append; returns the booking with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the row cannot be written.
    fn append_booking(
        &mut self,
        booking: NewBooking,
    ) -> impl Future<Output = StoreResult<Booking>> + Send;

    /// Make every staged change durable and release the lock.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the commit fails; the unit is rolled back
    /// and the lock released.
    fn commit(self) -> impl Future<Output = StoreResult<()>> + Send;

    /// Discard staged changes and release the lock.
    fn release(self) -> impl Future<Output = ()> + Send;
}

/// Append-only record of committed bookings (read side).
pub trait BookingLedger: Send + Sync {
    /// Bookings made by one user with their event's name and date, newest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the ledger cannot be read.
    fn list_by_user(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = StoreResult<Vec<BookingSummary>>> + Send;

    /// Every booking with its event's name and date, newest first.
    /// Privileged.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the ledger cannot be read.
    fn list_all(&self) -> impl Future<Output = StoreResult<Vec<BookingSummary>>> + Send;

    /// One booking by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the ledger cannot be read.
    fn find_booking(
        &self,
        booking_id: BookingId,
    ) -> impl Future<Output = StoreResult<Option<Booking>>> + Send;
}

/// Admin CRUD over events.
///
/// Updates and deletes take the same per-event exclusive access as a
/// reservation, so a price change never lands between a reservation's read
/// and its commit.
pub trait EventCatalog: Send + Sync {
    /// Insert a new event row.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the row cannot be written.
    fn create_event(&self, event: Event) -> impl Future<Output = StoreResult<Event>> + Send;

    /// Latest committed state of one event.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the row cannot be read.
    fn get_event(&self, event_id: EventId)
        -> impl Future<Output = StoreResult<Option<Event>>> + Send;

    /// Events dated on or after `today`, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the rows cannot be read.
    fn list_upcoming(&self, today: NaiveDate)
        -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    /// Every event, soonest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the rows cannot be read.
    fn list_all_events(&self) -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    /// Apply a partial update under the event's exclusive access.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EventNotFound`](crate::StoreError::EventNotFound)
    /// if there is no such event, or a storage error.
    fn update_event(
        &self,
        event_id: EventId,
        update: EventUpdate,
    ) -> impl Future<Output = StoreResult<Event>> + Send;

    /// Remove an event. Returns whether a row was deleted. Bookings that
    /// reference it stay in the ledger.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the row cannot be deleted.
    fn delete_event(&self, event_id: EventId) -> impl Future<Output = StoreResult<bool>> + Send;
}

/// A store that can say whether it is reachable.
pub trait StorageProbe: Send + Sync {
    /// Backend name reported by readiness checks.
    const BACKEND: &'static str;

    /// Cheap round trip to the backing storage.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend is unreachable.
    fn probe(&self) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Everything the HTTP application needs from one backing store.
pub trait BoxOfficeStore: InventoryStore + BookingLedger + EventCatalog + 'static {}

impl<T> BoxOfficeStore for T where T: InventoryStore + BookingLedger + EventCatalog + 'static {}
