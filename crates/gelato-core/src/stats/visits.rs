//! Per-visit figures. A visit is every entry sharing a date and a taster.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::Serialize;

use crate::models::Entry;
use crate::util::round1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisitStats {
    pub visits: usize,
    /// Mean flavours per visit, one decimal.
    pub average: f64,
    pub max: usize,
    pub min: usize,
    pub median: f64,
}

impl VisitStats {
    /// `None` for an empty collection.
    pub fn from_entries(entries: &[Entry]) -> Option<Self> {
        let mut groups: IndexMap<(NaiveDate, &str), usize> = IndexMap::new();
        for entry in entries {
            *groups.entry((entry.date, entry.person.as_str())).or_insert(0) += 1;
        }

        let mut counts = groups.into_values().collect::<Vec<_>>();
        counts.sort_unstable();

        let (&min, &max) = (counts.first()?, counts.last()?);
        let total: usize = counts.iter().sum();

        Some(Self {
            visits: counts.len(),
            average: round1(total as f64 / counts.len() as f64),
            max,
            min,
            median: median(&counts),
        })
    }
}

/// Median of an ascending slice; the mean of the middle pair when even.
fn median(sorted: &[usize]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.is_empty() {
        0.0
    } else if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}
