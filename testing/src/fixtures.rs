//! Event fixtures.

use boxoffice_core::{Event, EventId, EventInventory, Money, TicketClass};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

/// Builder for [`Event`] rows with test-friendly defaults:
/// 10 VIP at $150.00, 100 regular at $50.00, dated 2025-06-01 20:00.
#[derive(Clone, Debug)]
pub struct EventBuilder {
    event: Event,
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBuilder {
    /// Start from the defaults with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            event: Event {
                id: EventId::new(),
                name: "Summer Concert".to_string(),
                description: "Open air".to_string(),
                location: "Riverside Park".to_string(),
                host: "Admin".to_string(),
                venue: "Main Stage".to_string(),
                date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default(),
                time: NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default(),
                image: None,
                inventory: EventInventory {
                    tickets_vip: 10,
                    tickets_regular: 100,
                    price_vip: Money::from_cents(15_000),
                    price_regular: Money::from_cents(5_000),
                },
                created_at: DateTime::<Utc>::from_timestamp(1_735_689_600, 0).unwrap_or_default(),
            },
        }
    }

    /// Fixed id.
    #[must_use]
    pub fn id(mut self, id: EventId) -> Self {
        self.event.id = id;
        self
    }

    /// Display name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.event.name = name.into();
        self
    }

    /// Remaining count for a class.
    #[must_use]
    pub fn tickets(mut self, class: TicketClass, count: u32) -> Self {
        match class {
            TicketClass::Vip => self.event.inventory.tickets_vip = count,
            TicketClass::Regular => self.event.inventory.tickets_regular = count,
        }
        self
    }

    /// Unit price for a class.
    #[must_use]
    pub fn price(mut self, class: TicketClass, price: Money) -> Self {
        match class {
            TicketClass::Vip => self.event.inventory.price_vip = price,
            TicketClass::Regular => self.event.inventory.price_regular = price,
        }
        self
    }

    /// Calendar date.
    #[must_use]
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.event.date = date;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> Event {
        self.event
    }
}
