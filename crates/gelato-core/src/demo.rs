//! Built-in demonstration dataset shown when nothing else is available.

use chrono::{NaiveDate, Utc};

use crate::models::{Entry, EntryId};

/// Two sample entries, one per featured shop.
///
/// The store never assigned these, so they carry client-only ids.
pub fn demo_entries() -> Vec<Entry> {
    let timestamp = Utc::now();
    let sample = |flavor: &str, shop: &str, day, notes: &str| Entry {
        id: EntryId::new_local(),
        shop: shop.to_string(),
        flavor: flavor.to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap_or_default(),
        notes: notes.to_string(),
        person: "Demo".to_string(),
        timestamp,
    };

    vec![
        sample("Chocolate", "Joelato", 15, "Sample entry"),
        sample("Vanilla", "Mary's Milk Bar", 14, "Another sample"),
    ]
}
