//! # Box Office Testing
//!
//! Testing utilities for the box office reservation core.
//!
//! This crate provides:
//! - [`InMemoryBoxOffice`]: inventory store, booking ledger and event catalog
//!   backed by one async mutex per event
//! - [`FaultInjector`]: make the next decrement, append or commit fail
//! - [`RecordingNotifier`]: captures (or rejects) booking confirmations
//! - [`fixtures`]: event builders with sensible prices and dates
//! - [`FixedClock`]: deterministic time
//!
//! ## Example
//!
//! ```
//! use boxoffice_core::{InventoryStore, EventLock, TicketClass};
//! use boxoffice_testing::{fixtures::EventBuilder, InMemoryBoxOffice};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let event = EventBuilder::new().tickets(TicketClass::Vip, 1).build();
//! let store = InMemoryBoxOffice::new().with_event(event.clone());
//!
//! let lock = store.lock_event(event.id).await?.ok_or("missing")?;
//! assert_eq!(lock.inventory().tickets_vip, 1);
//! lock.release().await;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod faults;
pub mod fixtures;
pub mod memory;
pub mod notifier;

use boxoffice_core::environment::Clock;
use chrono::{DateTime, Utc};

/// Mock implementations of environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use boxoffice_testing::mocks::FixedClock;
    /// use boxoffice_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default())
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,boxoffice=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use faults::{FaultInjector, FaultPoint};
pub use memory::{InMemoryBoxOffice, InMemoryEventLock};
pub use mocks::{test_clock, FixedClock};
pub use notifier::RecordingNotifier;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }
}
