//! Event catalog.

use crate::rows::{EVENT_COLUMNS, cents_param, db_error, event_from_row};
use crate::store::PostgresBoxOffice;
use boxoffice_core::{
    Event, EventCatalog, EventId, EventUpdate, NaiveDate, StoreError, StoreResult,
};

impl EventCatalog for PostgresBoxOffice {
    async fn create_event(&self, event: Event) -> StoreResult<Event> {
        sqlx::query(&format!(
            "INSERT INTO events ({EVENT_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.host)
        .bind(&event.venue)
        .bind(event.date)
        .bind(event.time)
        .bind(event.image.as_deref())
        .bind(cents_param(event.inventory.price_vip)?)
        .bind(cents_param(event.inventory.price_regular)?)
        .bind(i64::from(event.inventory.tickets_vip))
        .bind(i64::from(event.inventory.tickets_regular))
        .bind(event.created_at)
        .execute(self.pool())
        .await
        .map_err(db_error("create event"))?;

        tracing::info!(event_id = %event.id, name = %event.name, "Event created");
        Ok(event)
    }

    async fn get_event(&self, event_id: EventId) -> StoreResult<Option<Event>> {
        sqlx::query(&format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"))
            .bind(event_id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(db_error("get event"))?
            .as_ref()
            .map(event_from_row)
            .transpose()
    }

    async fn list_upcoming(&self, today: NaiveDate) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE event_date >= $1
             ORDER BY event_date, event_time, id"
        ))
        .bind(today)
        .fetch_all(self.pool())
        .await
        .map_err(db_error("list upcoming events"))?;

        rows.iter().map(event_from_row).collect()
    }

    async fn list_all_events(&self) -> StoreResult<Vec<Event>> {
        let rows = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY event_date, event_time, id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(db_error("list events"))?;

        rows.iter().map(event_from_row).collect()
    }

    async fn update_event(&self, event_id: EventId, update: EventUpdate) -> StoreResult<Event> {
        let mut tx = self.pool().begin().await.map_err(db_error("begin transaction"))?;

        let row = sqlx::query(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE"
        ))
        .bind(event_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("lock event"))?;

        let Some(row) = row else {
            if let Err(e) = tx.rollback().await {
                tracing::warn!(%event_id, error = %e, "Rollback failed");
            }
            return Err(StoreError::EventNotFound(event_id));
        };

        let mut event = event_from_row(&row)?;
        update.apply_to(&mut event);

        sqlx::query(
            "UPDATE events SET
                name = $2, description = $3, location = $4, host = $5, venue = $6,
                event_date = $7, event_time = $8, image = $9,
                price_vip_cents = $10, price_regular_cents = $11,
                tickets_vip = $12, tickets_regular = $13
             WHERE id = $1",
        )
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(&event.description)
        .bind(&event.location)
        .bind(&event.host)
        .bind(&event.venue)
        .bind(event.date)
        .bind(event.time)
        .bind(event.image.as_deref())
        .bind(cents_param(event.inventory.price_vip)?)
        .bind(cents_param(event.inventory.price_regular)?)
        .bind(i64::from(event.inventory.tickets_vip))
        .bind(i64::from(event.inventory.tickets_regular))
        .execute(&mut *tx)
        .await
        .map_err(db_error("update event"))?;

        tx.commit().await.map_err(db_error("commit event update"))?;

        tracing::info!(%event_id, "Event updated");
        Ok(event)
    }

    async fn delete_event(&self, event_id: EventId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id.as_uuid())
            .execute(self.pool())
            .await
            .map_err(db_error("delete event"))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(%event_id, "Event deleted");
        }
        Ok(deleted)
    }
}
