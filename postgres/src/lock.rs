//! Row lock held for the length of one reservation unit.

use crate::rows::{cents_param, db_error};
use boxoffice_core::{
    Booking, BookingId, EventId, EventInventory, EventLock, NewBooking, StoreError, StoreResult,
    TicketClass,
};
use sqlx::{Postgres, Transaction};

/// An open transaction holding `FOR UPDATE` on one `events` row.
///
/// Dropping it without [`commit`](EventLock::commit) rolls the transaction
/// back when the connection returns to the pool.
pub struct PgEventLock {
    tx: Transaction<'static, Postgres>,
    event_id: EventId,
    inventory: EventInventory,
}

impl std::fmt::Debug for PgEventLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgEventLock")
            .field("event_id", &self.event_id)
            .field("inventory", &self.inventory)
            .finish_non_exhaustive()
    }
}

impl PgEventLock {
    pub(crate) const fn new(
        tx: Transaction<'static, Postgres>,
        event_id: EventId,
        inventory: EventInventory,
    ) -> Self {
        Self {
            tx,
            event_id,
            inventory,
        }
    }
}

impl EventLock for PgEventLock {
    fn event_id(&self) -> EventId {
        self.event_id
    }

    fn inventory(&self) -> &EventInventory {
        &self.inventory
    }

    async fn decrement(&mut self, class: TicketClass, amount: u32) -> StoreResult<()> {
        // The guard in the WHERE clause backs up the CHECK constraint.
        let sql = match class {
            TicketClass::Vip => {
                "UPDATE events SET tickets_vip = tickets_vip - $2
                 WHERE id = $1 AND tickets_vip >= $2"
            }
            TicketClass::Regular => {
                "UPDATE events SET tickets_regular = tickets_regular - $2
                 WHERE id = $1 AND tickets_regular >= $2"
            }
        };

        let result = sqlx::query(sql)
            .bind(self.event_id.as_uuid())
            .bind(i64::from(amount))
            .execute(&mut *self.tx)
            .await
            .map_err(db_error("decrement inventory"))?;

        if result.rows_affected() == 1 {
            Ok(())
        } else {
            Err(StoreError::Underflow {
                event_id: self.event_id,
                class,
            })
        }
    }

    async fn append_booking(&mut self, booking: NewBooking) -> StoreResult<Booking> {
        let booking = booking.with_id(BookingId::new());

        sqlx::query(
            "INSERT INTO bookings
                (id, user_id, event_id, ticket_class, quantity, total_price_cents, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(booking.id.as_uuid())
        .bind(booking.user_id.as_uuid())
        .bind(booking.event_id.as_uuid())
        .bind(booking.ticket_class.as_str())
        .bind(i64::from(booking.quantity))
        .bind(cents_param(booking.total_price)?)
        .bind(booking.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(db_error("append booking"))?;

        Ok(booking)
    }

    async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await.map_err(db_error("commit reservation"))
    }

    async fn release(self) {
        if let Err(e) = self.tx.rollback().await {
            tracing::warn!(event_id = %self.event_id, error = %e, "Rollback failed");
        }
        metrics::counter!("boxoffice_store_rollbacks_total").increment(1);
    }
}
