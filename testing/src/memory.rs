//! In-memory box office store.
//!
//! Each event lives behind its own `tokio::sync::Mutex`, so holding one
//! event's lock never blocks another event. A reservation unit stages its
//! decrement and ledger rows on the [`InMemoryEventLock`] and publishes both
//! in one synchronous step on commit; dropping the lock discards them.

use crate::faults::{FaultInjector, FaultPoint};
use boxoffice_core::{
    Booking, BookingId, BookingLedger, BookingSummary, Event, EventCatalog, EventId,
    EventInventory, EventLock, EventUpdate, InventoryStore, NewBooking, StorageProbe, StoreError,
    StoreResult, TicketClass, UserId,
};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::OwnedMutexGuard;

type EventSlot = Arc<tokio::sync::Mutex<Event>>;

fn poisoned<T>(_: T) -> StoreError {
    StoreError::DatabaseError("in-memory store lock poisoned".to_string())
}

/// Inventory store, booking ledger and event catalog in one process.
///
/// Cheap to clone; clones share state.
#[derive(Clone, Debug, Default)]
pub struct InMemoryBoxOffice {
    events: Arc<RwLock<HashMap<EventId, EventSlot>>>,
    bookings: Arc<Mutex<Vec<Booking>>>,
    faults: FaultInjector,
}

impl InMemoryBoxOffice {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event (builder style).
    #[must_use]
    pub fn with_event(self, event: Event) -> Self {
        self.insert_event(event);
        self
    }

    /// Seed an event, replacing any row with the same id.
    pub fn insert_event(&self, event: Event) {
        if let Ok(mut events) = self.events.write() {
            events.insert(event.id, Arc::new(tokio::sync::Mutex::new(event)));
        }
    }

    /// Fault injector shared with every lock this store hands out.
    #[must_use]
    pub const fn faults(&self) -> &FaultInjector {
        &self.faults
    }

    /// Latest committed inventory of an event (waits for any holder).
    pub async fn inventory_of(&self, event_id: EventId) -> Option<EventInventory> {
        let slot = self.slot(event_id).ok().flatten()?;
        let event = slot.lock().await;
        Some(event.inventory)
    }

    /// Every committed booking, in commit order.
    #[must_use]
    pub fn bookings(&self) -> Vec<Booking> {
        self.bookings.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Total committed quantity for one event and class.
    #[must_use]
    pub fn booked_quantity(&self, event_id: EventId, class: TicketClass) -> u64 {
        self.bookings()
            .iter()
            .filter(|b| b.event_id == event_id && b.ticket_class == class)
            .map(|b| u64::from(b.quantity))
            .sum()
    }

    fn slot(&self, event_id: EventId) -> StoreResult<Option<EventSlot>> {
        let events = self.events.read().map_err(poisoned)?;
        Ok(events.get(&event_id).map(Arc::clone))
    }

    fn all_slots(&self) -> StoreResult<Vec<EventSlot>> {
        let events = self.events.read().map_err(poisoned)?;
        Ok(events.values().map(Arc::clone).collect())
    }

    /// The slot is still the one registered for this id (not deleted or
    /// replaced while we waited for it).
    fn is_current(&self, event_id: EventId, slot: &EventSlot) -> StoreResult<bool> {
        let events = self.events.read().map_err(poisoned)?;
        Ok(events
            .get(&event_id)
            .is_some_and(|current| Arc::ptr_eq(current, slot)))
    }

    /// Lock a slot and re-check it is still registered.
    async fn acquire(&self, event_id: EventId) -> StoreResult<Option<OwnedMutexGuard<Event>>> {
        let Some(slot) = self.slot(event_id)? else {
            return Ok(None);
        };
        let guard = Arc::clone(&slot).lock_owned().await;
        if self.is_current(event_id, &slot)? {
            Ok(Some(guard))
        } else {
            Ok(None)
        }
    }

    async fn snapshot_events(&self) -> StoreResult<Vec<Event>> {
        let mut events = Vec::new();
        for slot in self.all_slots()? {
            let event = slot.lock().await;
            events.push(Event::clone(&event));
        }
        events.sort_by(|a, b| (a.date, a.time, a.id).cmp(&(b.date, b.time, b.id)));
        Ok(events)
    }

    fn newest_first(&self, mut keep: impl FnMut(&Booking) -> bool) -> StoreResult<Vec<Booking>> {
        let bookings = self.bookings.lock().map_err(poisoned)?;
        let mut selected: Vec<Booking> = bookings.iter().rev().filter(|b| keep(b)).cloned().collect();
        drop(bookings);
        selected.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(selected)
    }

    /// Join each booking with its event's current name and date.
    async fn summarize(&self, bookings: Vec<Booking>) -> StoreResult<Vec<BookingSummary>> {
        let mut events: HashMap<EventId, Option<(String, NaiveDate)>> = HashMap::new();
        let mut summaries = Vec::with_capacity(bookings.len());
        for booking in bookings {
            let joined = match events.get(&booking.event_id) {
                Some(joined) => joined.clone(),
                None => {
                    let joined = self
                        .acquire(booking.event_id)
                        .await?
                        .map(|event| (event.name.clone(), event.date));
                    events.insert(booking.event_id, joined.clone());
                    joined
                }
            };
            summaries.push(match joined {
                Some((name, date)) => BookingSummary {
                    booking,
                    event_name: Some(name),
                    event_date: Some(date),
                },
                None => BookingSummary::orphaned(booking),
            });
        }
        Ok(summaries)
    }
}

impl InventoryStore for InMemoryBoxOffice {
    type Lock = InMemoryEventLock;

    async fn lock_event(&self, event_id: EventId) -> StoreResult<Option<InMemoryEventLock>> {
        self.faults.check(FaultPoint::Lock)?;

        let Some(guard) = self.acquire(event_id).await? else {
            return Ok(None);
        };

        let read = guard.inventory;
        tracing::trace!(%event_id, "In-memory event lock granted");

        Ok(Some(InMemoryEventLock {
            guard,
            read,
            staged: read,
            pending: Vec::new(),
            bookings: Arc::clone(&self.bookings),
            faults: self.faults.clone(),
        }))
    }
}

/// Exclusive handle on one in-memory event.
///
/// Holds the event's mutex until committed, released or dropped.
#[derive(Debug)]
pub struct InMemoryEventLock {
    guard: OwnedMutexGuard<Event>,
    read: EventInventory,
    staged: EventInventory,
    pending: Vec<Booking>,
    bookings: Arc<Mutex<Vec<Booking>>>,
    faults: FaultInjector,
}

impl EventLock for InMemoryEventLock {
    fn event_id(&self) -> EventId {
        self.guard.id
    }

    fn inventory(&self) -> &EventInventory {
        &self.read
    }

    async fn decrement(&mut self, class: TicketClass, amount: u32) -> StoreResult<()> {
        self.faults.check(FaultPoint::Decrement)?;
        self.staged = self
            .staged
            .checked_decrement(class, amount)
            .ok_or(StoreError::Underflow {
                event_id: self.guard.id,
                class,
            })?;
        Ok(())
    }

    async fn append_booking(&mut self, booking: NewBooking) -> StoreResult<Booking> {
        self.faults.check(FaultPoint::AppendBooking)?;
        let booking = booking.with_id(BookingId::new());
        self.pending.push(booking.clone());
        Ok(booking)
    }

    async fn commit(mut self) -> StoreResult<()> {
        self.faults.check(FaultPoint::Commit)?;

        // Ledger mutex held across both writes so readers see both or neither.
        let mut ledger = self.bookings.lock().map_err(poisoned)?;
        self.guard.inventory = self.staged;
        ledger.append(&mut self.pending);
        Ok(())
    }

    async fn release(self) {
        tracing::trace!(event_id = %self.guard.id, "In-memory event lock released");
    }
}

impl BookingLedger for InMemoryBoxOffice {
    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<BookingSummary>> {
        let bookings = self.newest_first(|b| b.user_id == user_id)?;
        self.summarize(bookings).await
    }

    async fn list_all(&self) -> StoreResult<Vec<BookingSummary>> {
        let bookings = self.newest_first(|_| true)?;
        self.summarize(bookings).await
    }

    async fn find_booking(&self, booking_id: BookingId) -> StoreResult<Option<Booking>> {
        let bookings = self.bookings.lock().map_err(poisoned)?;
        Ok(bookings.iter().find(|b| b.id == booking_id).cloned())
    }
}

impl EventCatalog for InMemoryBoxOffice {
    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        self.insert_event(event.clone());
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.acquire(event_id).await?.map(|guard| Event::clone(&guard)))
    }

    async fn list_upcoming(&self, today: NaiveDate) -> StoreResult<Vec<Event>> {
        let mut events = self.snapshot_events().await?;
        events.retain(|e| e.is_upcoming(today));
        Ok(events)
    }

    async fn list_all_events(&self) -> StoreResult<Vec<Event>> {
        self.snapshot_events().await
    }

    async fn update_event(&self, event_id: EventId, update: EventUpdate) -> StoreResult<Event> {
        let mut guard = self
            .acquire(event_id)
            .await?
            .ok_or(StoreError::EventNotFound(event_id))?;
        update.apply_to(&mut guard);
        Ok(Event::clone(&guard))
    }

    async fn delete_event(&self, event_id: EventId) -> StoreResult<bool> {
        // Wait for in-flight units on this event before removing it.
        let Some(guard) = self.acquire(event_id).await? else {
            return Ok(false);
        };
        let removed = self
            .events
            .write()
            .map_err(poisoned)?
            .remove(&event_id)
            .is_some();
        drop(guard);
        Ok(removed)
    }
}

impl StorageProbe for InMemoryBoxOffice {
    const BACKEND: &'static str = "memory";

    #[allow(clippy::unused_async)]
    async fn probe(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::fixtures::EventBuilder;
    use boxoffice_core::Money;
    use chrono::Utc;
    use std::time::Duration;

    fn new_booking(event_id: EventId, quantity: u32) -> NewBooking {
        NewBooking {
            user_id: UserId::new(),
            event_id,
            ticket_class: TicketClass::Vip,
            quantity,
            total_price: Money::from_cents(100),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_commit_publishes_decrement_and_booking_together() {
        let event = EventBuilder::new().tickets(TicketClass::Vip, 5).build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());

        let Ok(Some(mut lock)) = store.lock_event(event.id).await else {
            panic!("event should lock");
        };
        assert!(lock.decrement(TicketClass::Vip, 2).await.is_ok());
        assert!(lock.append_booking(new_booking(event.id, 2)).await.is_ok());
        assert!(store.bookings().is_empty(), "staged rows must not be visible");
        assert!(lock.commit().await.is_ok());

        assert_eq!(store.inventory_of(event.id).await.map(|i| i.tickets_vip), Some(3));
        assert_eq!(store.bookings().len(), 1);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let event = EventBuilder::new().tickets(TicketClass::Vip, 5).build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());

        {
            let Ok(Some(mut lock)) = store.lock_event(event.id).await else {
                panic!("event should lock");
            };
            assert!(lock.decrement(TicketClass::Vip, 5).await.is_ok());
            assert!(lock.append_booking(new_booking(event.id, 5)).await.is_ok());
        }

        assert_eq!(store.inventory_of(event.id).await.map(|i| i.tickets_vip), Some(5));
        assert!(store.bookings().is_empty());
    }

    #[tokio::test]
    async fn test_commit_fault_discards_staged_changes() {
        let event = EventBuilder::new().tickets(TicketClass::Regular, 4).build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());
        store.faults().fail_next(FaultPoint::Commit);

        let Ok(Some(mut lock)) = store.lock_event(event.id).await else {
            panic!("event should lock");
        };
        assert!(lock.decrement(TicketClass::Regular, 1).await.is_ok());
        assert!(lock.commit().await.is_err());

        assert_eq!(store.inventory_of(event.id).await.map(|i| i.tickets_regular), Some(4));
    }

    #[tokio::test]
    async fn test_decrement_below_zero_is_rejected() {
        let event = EventBuilder::new().tickets(TicketClass::Vip, 1).build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());

        let Ok(Some(mut lock)) = store.lock_event(event.id).await else {
            panic!("event should lock");
        };
        assert_eq!(
            lock.decrement(TicketClass::Vip, 2).await,
            Err(StoreError::Underflow {
                event_id: event.id,
                class: TicketClass::Vip
            })
        );
    }

    #[tokio::test]
    async fn test_missing_event_locks_nothing() {
        let store = InMemoryBoxOffice::new();
        assert!(matches!(store.lock_event(EventId::new()).await, Ok(None)));
    }

    #[tokio::test]
    async fn test_second_lock_waits_for_first() {
        let event = EventBuilder::new().build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());

        let Ok(Some(first)) = store.lock_event(event.id).await else {
            panic!("event should lock");
        };
        let blocked = tokio::time::timeout(Duration::from_millis(50), store.lock_event(event.id)).await;
        assert!(blocked.is_err(), "second lock must wait");

        first.release().await;
        let granted = tokio::time::timeout(Duration::from_secs(1), store.lock_event(event.id)).await;
        assert!(matches!(granted, Ok(Ok(Some(_)))));
    }

    #[tokio::test]
    async fn test_listed_bookings_carry_event_name_and_date() {
        let event = EventBuilder::new().name("Gala").build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());

        let Ok(Some(mut lock)) = store.lock_event(event.id).await else {
            panic!("event should lock");
        };
        assert!(lock.decrement(TicketClass::Vip, 1).await.is_ok());
        let Ok(booking) = lock.append_booking(new_booking(event.id, 1)).await else {
            panic!("append should succeed");
        };
        assert!(lock.commit().await.is_ok());

        let Ok(listed) = store.list_by_user(booking.user_id).await else {
            panic!("ledger should read");
        };
        assert_eq!(
            listed,
            vec![BookingSummary {
                booking: booking.clone(),
                event_name: Some("Gala".to_string()),
                event_date: Some(event.date),
            }]
        );

        assert_eq!(store.delete_event(event.id).await, Ok(true));
        assert_eq!(store.list_all().await, Ok(vec![BookingSummary::orphaned(booking)]));
    }

    #[tokio::test]
    async fn test_delete_waits_then_lock_sees_missing() {
        let event = EventBuilder::new().build();
        let store = InMemoryBoxOffice::new().with_event(event.clone());

        assert_eq!(store.delete_event(event.id).await, Ok(true));
        assert_eq!(store.delete_event(event.id).await, Ok(false));
        assert!(matches!(store.lock_event(event.id).await, Ok(None)));
    }
}
