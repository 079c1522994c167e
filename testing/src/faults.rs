//! Failure injection for the in-memory store.
//!
//! Arm a [`FaultPoint`] and the next call that reaches it returns
//! [`StoreError::DatabaseError`] instead of doing its work.
//!
//! ```
//! use boxoffice_testing::{FaultInjector, FaultPoint};
//!
//! let faults = FaultInjector::new();
//! faults.fail_next(FaultPoint::AppendBooking);
//! assert!(faults.check(FaultPoint::AppendBooking).is_err());
//! assert!(faults.check(FaultPoint::AppendBooking).is_ok());
//! ```

use boxoffice_core::{StoreError, StoreResult};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Places in a reservation unit where a fault can be injected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaultPoint {
    /// Acquiring the event lock
    Lock,
    /// Staging the inventory decrement
    Decrement,
    /// Staging the ledger append
    AppendBooking,
    /// Committing the unit
    Commit,
}

/// Shared, cloneable set of armed faults.
#[derive(Clone, Debug, Default)]
pub struct FaultInjector {
    armed: Arc<Mutex<HashMap<FaultPoint, usize>>>,
    fired: Arc<Mutex<Vec<FaultPoint>>>,
}

impl FaultInjector {
    /// No faults armed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next call that reaches `point`.
    pub fn fail_next(&self, point: FaultPoint) {
        self.fail_times(point, 1);
    }

    /// Fail the next `times` calls that reach `point`.
    pub fn fail_times(&self, point: FaultPoint, times: usize) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed.entry(point).or_default() += times;
        }
    }

    /// Disarm everything.
    pub fn clear(&self) {
        if let Ok(mut armed) = self.armed.lock() {
            armed.clear();
        }
    }

    /// Faults that have fired so far, in order.
    #[must_use]
    pub fn fired(&self) -> Vec<FaultPoint> {
        self.fired.lock().map(|f| f.clone()).unwrap_or_default()
    }

    /// Consume one armed fault at `point`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DatabaseError`] when a fault was armed.
    pub fn check(&self, point: FaultPoint) -> StoreResult<()> {
        let mut armed = self
            .armed
            .lock()
            .map_err(|_| StoreError::DatabaseError("fault injector poisoned".to_string()))?;

        match armed.get_mut(&point) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                drop(armed);
                if let Ok(mut fired) = self.fired.lock() {
                    fired.push(point);
                }
                tracing::debug!(?point, "Injected storage fault");
                Err(StoreError::DatabaseError(format!("injected fault at {point:?}")))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_times_counts_down() {
        let faults = FaultInjector::new();
        faults.fail_times(FaultPoint::Commit, 2);

        assert!(faults.check(FaultPoint::Decrement).is_ok());
        assert!(faults.check(FaultPoint::Commit).is_err());
        assert!(faults.check(FaultPoint::Commit).is_err());
        assert!(faults.check(FaultPoint::Commit).is_ok());
        assert_eq!(faults.fired(), vec![FaultPoint::Commit, FaultPoint::Commit]);
    }

    #[test]
    fn test_clear_disarms() {
        let faults = FaultInjector::new();
        faults.fail_next(FaultPoint::Lock);
        faults.clear();
        assert!(faults.check(FaultPoint::Lock).is_ok());
        assert!(faults.fired().is_empty());
    }
}
