//! Events and their ticket inventory.
//!
//! An [`Event`] is one inventory row: descriptive fields plus an
//! [`EventInventory`] holding the remaining count and unit price for each
//! [`TicketClass`]. Counts are unsigned, so "never below zero" is a property
//! of the type; [`EventInventory::checked_decrement`] is the only way down.

use crate::types::{EventId, Money, TicketClass};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default VIP allocation when an event is created without one.
pub const DEFAULT_TICKETS_VIP: u32 = 50;

/// Default regular allocation when an event is created without one.
pub const DEFAULT_TICKETS_REGULAR: u32 = 100;

/// Default host when an event is created without one.
pub const DEFAULT_HOST: &str = "Admin";

/// Remaining counts and prices for both ticket classes.
///
/// This is the snapshot an exclusive handle reads: the price used for a
/// booking's total comes from the same read as the count it is checked against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInventory {
    /// Remaining VIP tickets
    pub tickets_vip: u32,
    /// Remaining regular tickets
    pub tickets_regular: u32,
    /// Unit price of a VIP ticket
    pub price_vip: Money,
    /// Unit price of a regular ticket
    pub price_regular: Money,
}

impl EventInventory {
    /// Remaining count for a class.
    #[must_use]
    pub const fn remaining(&self, class: TicketClass) -> u32 {
        match class {
            TicketClass::Vip => self.tickets_vip,
            TicketClass::Regular => self.tickets_regular,
        }
    }

    /// Unit price for a class.
    #[must_use]
    pub const fn price(&self, class: TicketClass) -> Money {
        match class {
            TicketClass::Vip => self.price_vip,
            TicketClass::Regular => self.price_regular,
        }
    }

    /// Inventory with `amount` fewer tickets of `class`, or `None` if that
    /// would go below zero.
    #[must_use]
    pub fn checked_decrement(&self, class: TicketClass, amount: u32) -> Option<Self> {
        let mut next = *self;
        match class {
            TicketClass::Vip => next.tickets_vip = self.tickets_vip.checked_sub(amount)?,
            TicketClass::Regular => {
                next.tickets_regular = self.tickets_regular.checked_sub(amount)?;
            }
        }
        Some(next)
    }
}

/// A scheduled event with its inventory row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identity
    pub id: EventId,
    /// Display name
    pub name: String,
    /// Long description
    pub description: String,
    /// City or address
    pub location: String,
    /// Organiser
    pub host: String,
    /// Venue name
    pub venue: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Start time
    pub time: NaiveTime,
    /// Path of an uploaded image, if any
    pub image: Option<String>,
    /// Remaining counts and prices
    #[serde(flatten)]
    pub inventory: EventInventory,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event takes place on or after `today`.
    #[must_use]
    pub fn is_upcoming(&self, today: NaiveDate) -> bool {
        self.date >= today
    }
}

/// Reasons a [`NewEvent`] is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NewEventError {
    /// A required text field is missing or blank.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    /// A price is above [`Money::MAX`].
    #[error("Price out of range: {0}")]
    PriceOutOfRange(&'static str),
}

fn check_price(field: &'static str, price: Option<Money>) -> Result<(), NewEventError> {
    match price {
        Some(price) if !price.is_storable() => Err(NewEventError::PriceOutOfRange(field)),
        _ => Ok(()),
    }
}

/// Admin input for creating an event. Optional fields take the defaults the
/// box office has always used.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Display name (required)
    pub name: String,
    /// Description (required)
    pub description: String,
    /// Location (required)
    pub location: String,
    /// Calendar date
    pub date: NaiveDate,
    /// Start time
    pub time: NaiveTime,
    /// Organiser, defaults to `"Admin"`
    #[serde(default)]
    pub host: Option<String>,
    /// Venue, defaults to the location
    #[serde(default)]
    pub venue: Option<String>,
    /// VIP price, defaults to zero
    #[serde(default)]
    pub price_vip: Option<Money>,
    /// Regular price, defaults to zero
    #[serde(default)]
    pub price_regular: Option<Money>,
    /// VIP allocation, defaults to 50
    #[serde(default)]
    pub tickets_vip: Option<u32>,
    /// Regular allocation, defaults to 100
    #[serde(default)]
    pub tickets_regular: Option<u32>,
    /// Image path
    #[serde(default)]
    pub image: Option<String>,
}

impl NewEvent {
    /// Validate required fields and build the event row.
    ///
    /// # Errors
    ///
    /// Returns [`NewEventError::MissingField`] when name, description or
    /// location is blank, and [`NewEventError::PriceOutOfRange`] for a price
    /// above [`Money::MAX`].
    pub fn into_event(
        self,
        id: EventId,
        created_at: DateTime<Utc>,
    ) -> Result<Event, NewEventError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(NewEventError::MissingField(field));
            }
        }
        check_price("price_vip", self.price_vip)?;
        check_price("price_regular", self.price_regular)?;

        let host = self
            .host
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let venue = self
            .venue
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.location.clone());

        Ok(Event {
            id,
            name: self.name,
            description: self.description,
            location: self.location,
            host,
            venue,
            date: self.date,
            time: self.time,
            image: self.image,
            inventory: EventInventory {
                tickets_vip: self.tickets_vip.unwrap_or(DEFAULT_TICKETS_VIP),
                tickets_regular: self.tickets_regular.unwrap_or(DEFAULT_TICKETS_REGULAR),
                price_vip: self.price_vip.unwrap_or(Money::ZERO),
                price_regular: self.price_regular.unwrap_or(Money::ZERO),
            },
            created_at,
        })
    }
}

/// Partial update of an event: every `Some` field replaces the stored value.
///
/// Count fields are admin corrections; they are the only way inventory goes
/// back up.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New location
    pub location: Option<String>,
    /// New host
    pub host: Option<String>,
    /// New VIP price
    pub price_vip: Option<Money>,
    /// New regular price
    pub price_regular: Option<Money>,
    /// New venue
    pub venue: Option<String>,
    /// New date
    pub date: Option<NaiveDate>,
    /// New time
    pub time: Option<NaiveTime>,
    /// Corrected VIP count
    pub tickets_vip: Option<u32>,
    /// Corrected regular count
    pub tickets_regular: Option<u32>,
    /// New image path
    pub image: Option<String>,
}

impl EventUpdate {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.host.is_none()
            && self.price_vip.is_none()
            && self.price_regular.is_none()
            && self.venue.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.tickets_vip.is_none()
            && self.tickets_regular.is_none()
            && self.image.is_none()
    }

    /// Reject prices the store cannot hold.
    ///
    /// # Errors
    ///
    /// Returns [`NewEventError::PriceOutOfRange`] for a price above
    /// [`Money::MAX`].
    pub fn validate(&self) -> Result<(), NewEventError> {
        check_price("price_vip", self.price_vip)?;
        check_price("price_regular", self.price_regular)
    }

    /// Apply the set fields to `event`.
    pub fn apply_to(self, event: &mut Event) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut event.name, self.name);
        set(&mut event.description, self.description);
        set(&mut event.location, self.location);
        set(&mut event.host, self.host);
        set(&mut event.venue, self.venue);
        set(&mut event.date, self.date);
        set(&mut event.time, self.time);
        set(&mut event.inventory.price_vip, self.price_vip);
        set(&mut event.inventory.price_regular, self.price_regular);
        set(&mut event.inventory.tickets_vip, self.tickets_vip);
        set(&mut event.inventory.tickets_regular, self.tickets_regular);
        if self.image.is_some() {
            event.image = self.image;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event() -> NewEvent {
        NewEvent {
            name: "Jazz Night".to_string(),
            description: "Late set".to_string(),
            location: "Nairobi".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
            time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
            ..NewEvent::default()
        }
    }

    #[test]
    fn test_checked_decrement_only_touches_requested_class() {
        let inv = EventInventory {
            tickets_vip: 3,
            tickets_regular: 10,
            price_vip: Money::from_cents(5_000),
            price_regular: Money::from_cents(1_000),
        };

        let after = inv.checked_decrement(TicketClass::Vip, 2);
        assert_eq!(
            after,
            Some(EventInventory {
                tickets_vip: 1,
                ..inv
            })
        );
        assert_eq!(inv.checked_decrement(TicketClass::Vip, 4), None);
        assert_eq!(
            inv.checked_decrement(TicketClass::Regular, 10).map(|i| i.tickets_regular),
            Some(0)
        );
    }

    #[test]
    fn test_new_event_defaults() {
        let event = new_event()
            .into_event(EventId::new(), Utc::now())
            .unwrap_or_else(|e| unreachable!("{e}"));

        assert_eq!(event.host, "Admin");
        assert_eq!(event.venue, "Nairobi");
        assert_eq!(event.inventory.tickets_vip, 50);
        assert_eq!(event.inventory.tickets_regular, 100);
        assert_eq!(event.inventory.price_vip, Money::ZERO);
        assert_eq!(event.inventory.price_regular, Money::ZERO);
    }

    #[test]
    fn test_new_event_requires_text_fields() {
        let missing = NewEvent {
            description: "  ".to_string(),
            ..new_event()
        };
        assert_eq!(
            missing.into_event(EventId::new(), Utc::now()),
            Err(NewEventError::MissingField("description"))
        );
    }

    #[test]
    fn test_prices_above_storable_range_are_rejected() {
        let too_big = Money::from_cents(Money::MAX.cents() + 1);

        let create = NewEvent {
            price_regular: Some(too_big),
            ..new_event()
        };
        assert_eq!(
            create.into_event(EventId::new(), Utc::now()),
            Err(NewEventError::PriceOutOfRange("price_regular"))
        );

        let update = EventUpdate {
            price_vip: Some(too_big),
            ..EventUpdate::default()
        };
        assert_eq!(update.validate(), Err(NewEventError::PriceOutOfRange("price_vip")));

        let at_limit = EventUpdate {
            price_vip: Some(Money::MAX),
            ..EventUpdate::default()
        };
        assert_eq!(at_limit.validate(), Ok(()));
    }

    #[test]
    fn test_update_applies_only_set_fields() {
        let mut event = new_event()
            .into_event(EventId::new(), Utc::now())
            .unwrap_or_else(|e| unreachable!("{e}"));
        let before = event.clone();

        let update = EventUpdate {
            price_vip: Some(Money::from_cents(9_900)),
            venue: Some("Main Hall".to_string()),
            ..EventUpdate::default()
        };
        assert!(!update.is_empty());
        update.apply_to(&mut event);

        assert_eq!(event.inventory.price_vip, Money::from_cents(9_900));
        assert_eq!(event.venue, "Main Hall");
        assert_eq!(event.name, before.name);
        assert_eq!(event.inventory.tickets_vip, before.inventory.tickets_vip);
        assert!(EventUpdate::default().is_empty());
    }
}
