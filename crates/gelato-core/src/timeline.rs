//! Date-grouped view of an entry collection, newest day first.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::models::{Entry, EntryId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TastedFlavour {
    pub id: EntryId,
    pub flavor: String,
}

/// Everything tasted at one shop on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShopVisit {
    pub shop: String,
    pub flavors: Vec<TastedFlavour>,
    /// Distinct tasters, first-seen order.
    pub people: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub shops: Vec<ShopVisit>,
}

impl TimelineDay {
    pub fn flavour_count(&self) -> usize {
        self.shops.iter().map(|visit| visit.flavors.len()).sum()
    }
}

/// Group entries by date (descending), then by shop in the order shops first
/// appear in `entries`.
pub fn build_timeline(entries: &[Entry]) -> Vec<TimelineDay> {
    let mut days: IndexMap<NaiveDate, IndexMap<&str, ShopVisit>> = IndexMap::new();

    for entry in entries {
        let visit = days
            .entry(entry.date)
            .or_default()
            .entry(entry.shop.as_str())
            .or_insert_with(|| ShopVisit {
                shop: entry.shop.clone(),
                flavors: Vec::new(),
                people: Vec::new(),
            });
        visit.flavors.push(TastedFlavour {
            id: entry.id,
            flavor: entry.flavor.clone(),
        });
        if !visit.people.contains(&entry.person) {
            visit.people.push(entry.person.clone());
        }
    }

    // Stable, so equal dates cannot reorder and shops keep first-seen order.
    days.sort_by(|left, _, right, _| right.cmp(left));

    days.into_iter()
        .map(|(date, shops)| TimelineDay {
            date,
            shops: shops.into_values().collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_entries;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_by_date_then_shop() {
        let mut entries = demo_entries();
        let mut extra = entries[0].clone();
        extra.flavor = "Hazelnut".to_string();
        extra.person = "Ana".to_string();
        entries.push(extra);
        let mut older = entries[1].clone();
        older.date = NaiveDate::from_ymd_opt(2024, 1, 20).unwrap();
        entries.push(older);

        let timeline = build_timeline(&entries);

        let dates = timeline.iter().map(|day| day.date.to_string()).collect::<Vec<_>>();
        assert_eq!(dates, vec!["2024-01-20", "2024-01-15", "2024-01-14"]);

        let joelato = &timeline[1].shops[0];
        assert_eq!(joelato.shop, "Joelato");
        let flavors = joelato
            .flavors
            .iter()
            .map(|tasted| tasted.flavor.as_str())
            .collect::<Vec<_>>();
        assert_eq!(flavors, vec!["Chocolate", "Hazelnut"]);
        assert_eq!(joelato.people, vec!["Demo", "Ana"]);
        assert_eq!(timeline[1].flavour_count(), 2);
    }

    #[test]
    fn empty_collection_has_no_days() {
        assert!(build_timeline(&[]).is_empty());
    }
}
