//! Reservation engine.
//!
//! ```text
//! BookingRequest ─► validate ─► lock_event ─► check remaining ─► price
//!                      │            │               │              │
//!                  Invalid*    Cancelled /     Insufficient    InvalidQuantity
//!                              NotFound /      Inventory       (overflow)
//!                              TransactionFailed
//!
//!                 ─► decrement ─► append_booking ─► commit ─► Booking
//!                        └──────────────┴──────────────┴─► TransactionFailed (rolled back)
//! ```

mod engine;

pub use engine::{ReservationEngine, validate};
