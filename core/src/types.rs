//! Value types shared by every layer: identifiers, money, ticket classes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random `", stringify!($name), "`")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Create a `", stringify!($name), "` from a `Uuid`")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Get the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

uuid_id!(
    /// Unique identifier for an event (one inventory row)
    EventId
);

uuid_id!(
    /// Unique identifier for a user, supplied by the authenticated caller
    UserId
);

uuid_id!(
    /// Unique identifier for a committed booking, assigned by the ledger
    BookingId
);

// ============================================================================
// Money
// ============================================================================

/// Monetary amount in cents.
///
/// Serialized as a bare integer number of cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    /// Zero cents.
    pub const ZERO: Self = Self(0);

    /// Largest amount the box office accepts: amounts are persisted as
    /// signed 64-bit cents.
    pub const MAX: Self = Self(i64::MAX.unsigned_abs());

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from dollars with overflow checking
    #[must_use]
    pub const fn checked_from_dollars(dollars: u64) -> Option<Self> {
        match dollars.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Whether the amount is at most [`Money::MAX`].
    #[must_use]
    pub const fn is_storable(&self) -> bool {
        self.0 <= Self::MAX.0
    }

    /// Unit price times a ticket quantity, `None` if the total exceeds
    /// [`Money::MAX`].
    #[must_use]
    pub fn checked_times(&self, quantity: u32) -> Option<Self> {
        self.0
            .checked_mul(u64::from(quantity))
            .map(Self)
            .filter(Self::is_storable)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

// ============================================================================
// Ticket class
// ============================================================================

/// Category of ticket, each with its own remaining count and price.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketClass {
    /// VIP seating
    #[serde(rename = "VIP")]
    Vip,
    /// Regular seating
    #[serde(rename = "regular")]
    Regular,
}

impl TicketClass {
    /// Both classes, VIP first.
    pub const ALL: [Self; 2] = [Self::Vip, Self::Regular];

    /// Wire and storage representation (`"VIP"` / `"regular"`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Vip => "VIP",
            Self::Regular => "regular",
        }
    }
}

impl fmt::Display for TicketClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ticket class name that is neither VIP nor regular.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown ticket class: {0:?}")]
pub struct UnknownTicketClass(pub String);

impl FromStr for TicketClass {
    type Err = UnknownTicketClass;

    /// Exactly `"VIP"` or `"regular"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VIP" => Ok(Self::Vip),
            "regular" => Ok(Self::Regular),
            _ => Err(UnknownTicketClass(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_ticket_class_parse() {
        assert_eq!("VIP".parse::<TicketClass>(), Ok(TicketClass::Vip));
        assert_eq!("regular".parse::<TicketClass>(), Ok(TicketClass::Regular));
        for near_miss in ["vip", "Vip", " VIP", "Regular", "REGULAR", " Regular "] {
            assert_eq!(
                near_miss.parse::<TicketClass>(),
                Err(UnknownTicketClass(near_miss.to_string()))
            );
        }
        assert_eq!(
            "student".parse::<TicketClass>(),
            Err(UnknownTicketClass("student".to_string()))
        );
        assert!("".parse::<TicketClass>().is_err());
    }

    #[test]
    fn test_ticket_class_wire_format() {
        assert_eq!(serde_json::to_string(&TicketClass::Vip).ok().as_deref(), Some("\"VIP\""));
        assert_eq!(
            serde_json::to_string(&TicketClass::Regular).ok().as_deref(),
            Some("\"regular\"")
        );
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(0).to_string(), "$0.00");
        assert_eq!(Money::from_cents(12_345).to_string(), "$123.45");
        assert_eq!(Money::checked_from_dollars(7), Some(Money::from_cents(700)));
        assert_eq!(Money::checked_from_dollars(u64::MAX), None);
    }

    #[test]
    fn test_money_checked_times_overflow() {
        assert_eq!(Money::from_cents(u64::MAX).checked_times(2), None);
        assert_eq!(Money::from_cents(2_500).checked_times(0), Some(Money::ZERO));
        assert_eq!(Money::MAX.checked_times(1), Some(Money::MAX));
    }

    #[test]
    fn test_money_checked_times_stays_storable() {
        // Fits in u64 but not in signed 64-bit cents.
        let half = Money::from_cents(Money::MAX.cents() / 2 + 1);
        assert_eq!(half.checked_times(1), Some(half));
        assert_eq!(half.checked_times(2), None);
        assert!(!Money::from_cents(u64::MAX).is_storable());
        assert_eq!(Money::from_cents(u64::MAX).checked_times(1), None);
    }

    #[test]
    fn test_id_round_trips_through_display() {
        let id = EventId::new();
        assert_eq!(id.to_string().parse::<EventId>().ok(), Some(id));
        assert!("missing".parse::<EventId>().is_err());
    }

    proptest! {
        #[test]
        fn prop_checked_times_matches_widened_product(cents in 0u64..=10_000_000, qty in 0u32..=100_000) {
            let expected = u128::from(cents) * u128::from(qty);
            let total = Money::from_cents(cents).checked_times(qty);
            prop_assert_eq!(total.map(|m| u128::from(m.cents())), Some(expected));
        }

        #[test]
        fn prop_unknown_class_names_are_rejected(name in "[a-z]{1,12}") {
            prop_assume!(name != "regular");
            prop_assert!(name.parse::<TicketClass>().is_err());
        }
    }
}
