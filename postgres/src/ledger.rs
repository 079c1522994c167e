//! Booking ledger reads.

use crate::rows::{BOOKING_COLUMNS, SUMMARY_COLUMNS, booking_from_row, db_error, summary_from_row};
use crate::store::PostgresBoxOffice;
use boxoffice_core::{Booking, BookingId, BookingLedger, BookingSummary, StoreResult, UserId};

impl BookingLedger for PostgresBoxOffice {
    async fn list_by_user(&self, user_id: UserId) -> StoreResult<Vec<BookingSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM bookings b LEFT JOIN events e ON e.id = b.event_id
             WHERE b.user_id = $1
             ORDER BY b.created_at DESC, b.id"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(self.pool())
        .await
        .map_err(db_error("list bookings by user"))?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn list_all(&self) -> StoreResult<Vec<BookingSummary>> {
        let rows = sqlx::query(&format!(
            "SELECT {SUMMARY_COLUMNS}
             FROM bookings b LEFT JOIN events e ON e.id = b.event_id
             ORDER BY b.created_at DESC, b.id"
        ))
        .fetch_all(self.pool())
        .await
        .map_err(db_error("list bookings"))?;

        rows.iter().map(summary_from_row).collect()
    }

    async fn find_booking(&self, booking_id: BookingId) -> StoreResult<Option<Booking>> {
        sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"))
            .bind(booking_id.as_uuid())
            .fetch_optional(self.pool())
            .await
            .map_err(db_error("find booking"))?
            .as_ref()
            .map(booking_from_row)
            .transpose()
    }
}
