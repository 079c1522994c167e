//! Row decoding and column conversions.
//!
//! Counts and cents are stored as `BIGINT`; every conversion is checked and a
//! value that does not fit is reported as [`StoreError::InvalidData`].

use boxoffice_core::{
    Booking, BookingId, BookingSummary, Event, EventId, EventInventory, Money, StoreError, StoreResult,
    TicketClass, UserId,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

pub(crate) const EVENT_COLUMNS: &str = "id, name, description, location, host, venue, \
     event_date, event_time, image, price_vip_cents, price_regular_cents, \
     tickets_vip, tickets_regular, created_at";

pub(crate) const BOOKING_COLUMNS: &str =
    "id, user_id, event_id, ticket_class, quantity, total_price_cents, created_at";

/// Booking columns plus the event's name and date. Select from
/// `bookings b LEFT JOIN events e ON e.id = b.event_id`.
pub(crate) const SUMMARY_COLUMNS: &str = "b.id, b.user_id, b.event_id, b.ticket_class, \
     b.quantity, b.total_price_cents, b.created_at, \
     e.name AS event_name, e.event_date AS event_date";

/// Map a sqlx error into [`StoreError::DatabaseError`] with context.
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> StoreError {
    move |e| StoreError::DatabaseError(format!("Failed to {context}: {e}"))
}

fn column<'r, T>(row: &'r PgRow, name: &str) -> StoreResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| StoreError::InvalidData(format!("column {name}: {e}")))
}

fn count(row: &PgRow, name: &str) -> StoreResult<u32> {
    let raw: i64 = column(row, name)?;
    u32::try_from(raw).map_err(|_| StoreError::InvalidData(format!("{name} out of range: {raw}")))
}

fn cents(row: &PgRow, name: &str) -> StoreResult<Money> {
    let raw: i64 = column(row, name)?;
    u64::try_from(raw)
        .map(Money::from_cents)
        .map_err(|_| StoreError::InvalidData(format!("{name} out of range: {raw}")))
}

/// Money as a `BIGINT` bind value.
pub(crate) fn cents_param(money: Money) -> StoreResult<i64> {
    i64::try_from(money.cents())
        .map_err(|_| StoreError::InvalidData(format!("amount too large to store: {money}")))
}

pub(crate) fn inventory_from_row(row: &PgRow) -> StoreResult<EventInventory> {
    Ok(EventInventory {
        tickets_vip: count(row, "tickets_vip")?,
        tickets_regular: count(row, "tickets_regular")?,
        price_vip: cents(row, "price_vip_cents")?,
        price_regular: cents(row, "price_regular_cents")?,
    })
}

pub(crate) fn event_from_row(row: &PgRow) -> StoreResult<Event> {
    let id: Uuid = column(row, "id")?;
    let date: NaiveDate = column(row, "event_date")?;
    let time: NaiveTime = column(row, "event_time")?;
    let created_at: DateTime<Utc> = column(row, "created_at")?;

    Ok(Event {
        id: EventId::from_uuid(id),
        name: column(row, "name")?,
        description: column(row, "description")?,
        location: column(row, "location")?,
        host: column(row, "host")?,
        venue: column(row, "venue")?,
        date,
        time,
        image: column(row, "image")?,
        inventory: inventory_from_row(row)?,
        created_at,
    })
}

pub(crate) fn booking_from_row(row: &PgRow) -> StoreResult<Booking> {
    let id: Uuid = column(row, "id")?;
    let user_id: Uuid = column(row, "user_id")?;
    let event_id: Uuid = column(row, "event_id")?;
    let class: String = column(row, "ticket_class")?;
    let ticket_class = class
        .parse::<TicketClass>()
        .map_err(|e| StoreError::InvalidData(e.to_string()))?;

    Ok(Booking {
        id: BookingId::from_uuid(id),
        user_id: UserId::from_uuid(user_id),
        event_id: EventId::from_uuid(event_id),
        ticket_class,
        quantity: count(row, "quantity")?,
        total_price: cents(row, "total_price_cents")?,
        created_at: column(row, "created_at")?,
    })
}

pub(crate) fn summary_from_row(row: &PgRow) -> StoreResult<BookingSummary> {
    Ok(BookingSummary {
        booking: booking_from_row(row)?,
        event_name: column(row, "event_name")?,
        event_date: column(row, "event_date")?,
    })
}
