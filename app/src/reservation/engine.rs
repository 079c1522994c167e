//! The reservation unit.

use crate::metrics;
use boxoffice_core::environment::Clock;
use boxoffice_core::{
    Booking, BookingRequest, EventLock, InventoryStore, NewBooking, ReservationError,
    TicketClass,
};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Books tickets against an [`InventoryStore`] without overselling.
///
/// Each call runs one reservation unit: validate, lock the event, check and
/// price under the lock, stage decrement and ledger append, commit. Calls for
/// the same event are serialised by the store's lock; calls for different
/// events never wait on each other. Nothing is retried here.
pub struct ReservationEngine<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> Clone for ReservationEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<S> std::fmt::Debug for ReservationEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationEngine").finish_non_exhaustive()
    }
}

impl<S: InventoryStore> ReservationEngine<S> {
    /// Build an engine over a shared store.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The store this engine books against.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Reserve, waiting for the event lock as long as it takes.
    ///
    /// # Errors
    ///
    /// See [`reserve_with_cancel`](Self::reserve_with_cancel); never returns
    /// [`ReservationError::Cancelled`].
    pub async fn reserve(&self, request: BookingRequest) -> Result<Booking, ReservationError> {
        self.reserve_with_cancel(request, std::future::pending::<()>())
            .await
    }

    /// Reserve, giving up if the event lock is not granted within `deadline`.
    ///
    /// # Errors
    ///
    /// See [`reserve_with_cancel`](Self::reserve_with_cancel).
    pub async fn reserve_within(
        &self,
        request: BookingRequest,
        deadline: Duration,
    ) -> Result<Booking, ReservationError> {
        self.reserve_with_cancel(request, tokio::time::sleep(deadline))
            .await
    }

    /// Reserve, abandoning the lock wait as soon as `cancel` completes.
    ///
    /// `cancel` only races the lock acquisition. Once the lock is held the
    /// unit runs to commit or rollback regardless.
    ///
    /// # Errors
    ///
    /// - [`InvalidTicketClass`](ReservationError::InvalidTicketClass) /
    ///   [`InvalidQuantity`](ReservationError::InvalidQuantity): rejected
    ///   before any lock
    /// - [`Cancelled`](ReservationError::Cancelled): `cancel` won the race
    /// - [`EventNotFound`](ReservationError::EventNotFound)
    /// - [`InsufficientInventory`](ReservationError::InsufficientInventory):
    ///   carries the count read under the lock
    /// - [`TransactionFailed`](ReservationError::TransactionFailed): storage
    ///   failed; the unit was rolled back
    pub async fn reserve_with_cancel<C>(
        &self,
        request: BookingRequest,
        cancel: C,
    ) -> Result<Booking, ReservationError>
    where
        C: Future<Output = ()> + Send,
    {
        let event_id = request.event_id;
        let user_id = request.user_id;

        let result = self.run_unit(request, cancel).await;
        metrics::record_reservation_outcome(&result);

        match &result {
            Ok(booking) => tracing::info!(
                %event_id,
                %user_id,
                booking_id = %booking.id,
                class = %booking.ticket_class,
                quantity = booking.quantity,
                total_price = %booking.total_price,
                "Reservation committed"
            ),
            Err(e) if e.is_business_outcome() => tracing::info!(
                %event_id,
                %user_id,
                outcome = e.kind(),
                error = %e,
                "Reservation rejected"
            ),
            Err(ReservationError::Cancelled) => tracing::warn!(
                %event_id,
                %user_id,
                "Reservation cancelled while waiting for the event lock"
            ),
            Err(e) => tracing::error!(
                %event_id,
                %user_id,
                error = %e,
                "Reservation failed"
            ),
        }

        result
    }

    async fn run_unit<C>(
        &self,
        request: BookingRequest,
        cancel: C,
    ) -> Result<Booking, ReservationError>
    where
        C: Future<Output = ()> + Send,
    {
        let (class, quantity) = validate(&request)?;

        let waiting = Instant::now();
        let acquired = tokio::select! {
            biased;
            () = cancel => return Err(ReservationError::Cancelled),
            acquired = self.store.lock_event(request.event_id) => acquired?,
        };
        metrics::record_lock_wait(waiting.elapsed());

        let Some(mut lock) = acquired else {
            return Err(ReservationError::EventNotFound(request.event_id));
        };

        let inventory = *lock.inventory();
        let remaining = inventory.remaining(class);
        if quantity > remaining {
            lock.release().await;
            return Err(ReservationError::InsufficientInventory {
                class,
                requested: quantity,
                remaining,
            });
        }

        let Some(total_price) = inventory.price(class).checked_times(quantity) else {
            lock.release().await;
            return Err(ReservationError::InvalidQuantity(request.quantity));
        };

        if let Err(e) = lock.decrement(class, quantity).await {
            lock.release().await;
            return Err(e.into());
        }

        let staged = NewBooking {
            user_id: request.user_id,
            event_id: request.event_id,
            ticket_class: class,
            quantity,
            total_price,
            created_at: self.clock.now(),
        };
        let booking = match lock.append_booking(staged).await {
            Ok(booking) => booking,
            Err(e) => {
                lock.release().await;
                return Err(e.into());
            }
        };

        lock.commit().await?;
        Ok(booking)
    }
}

/// Parse the class and bound the quantity before anything is locked.
///
/// # Errors
///
/// Returns [`ReservationError::InvalidTicketClass`] or
/// [`ReservationError::InvalidQuantity`].
pub fn validate(request: &BookingRequest) -> Result<(TicketClass, u32), ReservationError> {
    let class = request
        .ticket_class
        .parse::<TicketClass>()
        .map_err(|_| ReservationError::InvalidTicketClass(request.ticket_class.clone()))?;

    let quantity = u32::try_from(request.quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or(ReservationError::InvalidQuantity(request.quantity))?;

    Ok((class, quantity))
}
