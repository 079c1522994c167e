//! # Box Office
//!
//! Ticket reservations against a finite VIP / regular inventory, served
//! over HTTP.
//!
//! - [`reservation::ReservationEngine`]: the reservation unit (validate, lock
//!   one event, check, price, decrement + ledger append, commit)
//! - [`api`]: booking and event endpoints
//! - [`server`]: state, router, readiness, graceful shutdown
//! - [`config`]: environment configuration
//! - [`metrics`]: Prometheus business metrics
//! - [`notifications`]: post-commit confirmations
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use boxoffice::reservation::ReservationEngine;
//! use boxoffice_core::{BookingRequest, TicketClass, UserId};
//! use boxoffice_core::environment::SystemClock;
//! use boxoffice_testing::{fixtures::EventBuilder, InMemoryBoxOffice};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let event = EventBuilder::new().tickets(TicketClass::Vip, 2).build();
//! let store = Arc::new(InMemoryBoxOffice::new().with_event(event.clone()));
//! let engine = ReservationEngine::new(store, Arc::new(SystemClock));
//!
//! let booking = engine
//!     .reserve(BookingRequest::new(UserId::new(), event.id, "VIP", 2))
//!     .await?;
//! assert_eq!(booking.quantity, 2);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod metrics;
pub mod notifications;
pub mod reservation;
pub mod server;

pub use config::{Config, ConfigError};
pub use reservation::ReservationEngine;
pub use server::{AppState, build_router};
