//! Statistics over an entry collection.
//!
//! Aggregation is pure: the same collection, filter and day always give the
//! same [`FlavourStats`]. Maps are insertion-ordered so that ties resolve to
//! whatever was encountered first.

mod tally;
mod visits;

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::filter::ShopFilter;
use crate::models::Entry;
use crate::util::{fold_flavour, percentage, round2};

pub use tally::Ranked;
pub use visits::VisitStats;

pub const DEFAULT_PRIMARY_SHOP: &str = "Joelato";
pub const DEFAULT_SECONDARY_SHOP: &str = "Mary's Milk Bar";

const TOP_FLAVOURS: usize = 10;
const RECENT_WINDOW_DAYS: i64 = 7;

/// The two shops compared head to head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopPair {
    pub primary: String,
    pub secondary: String,
}

impl ShopPair {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }
}

impl Default for ShopPair {
    fn default() -> Self {
        Self::new(DEFAULT_PRIMARY_SHOP, DEFAULT_SECONDARY_SHOP)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub first_visit: NaiveDate,
    pub last_visit: NaiveDate,
    /// Never below 1.
    pub days_between: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShopComparison {
    pub primary: Ranked,
    pub secondary: Ranked,
    /// Primary count over secondary count, two decimals; `None` when the
    /// secondary shop has no entries. The secondary shop is the "1" of the
    /// label, so `1 : 1.50` means 1.5 primary entries per secondary entry.
    pub ratio: Option<f64>,
}

impl ShopComparison {
    /// `"1 : 1.50"` read as secondary : primary, or `"N/A"` when there is
    /// no ratio.
    pub fn ratio_label(&self) -> String {
        self.ratio
            .map_or_else(|| "N/A".to_string(), |ratio| format!("1 : {ratio:.2}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    /// e.g. `Mar 2024`
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub count: usize,
}

/// Entries dated today or in the six days before it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentActivity {
    pub since: NaiveDate,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlavourStats {
    pub total_flavours: usize,
    pub unique_flavours: usize,
    pub shop_breakdown: IndexMap<String, usize>,
    pub most_popular_shop: Option<Ranked>,
    pub person_breakdown: IndexMap<String, usize>,
    pub most_active_taster: Option<Ranked>,
    pub visits: Option<VisitStats>,
    pub top_flavours: Vec<Ranked>,
    pub most_common_flavour: Ranked,
    pub date_range: Option<DateRange>,
    pub flavours_per_day: f64,
    pub shop_comparison: ShopComparison,
    pub shop_variety: IndexMap<String, usize>,
    /// Oldest month first.
    pub monthly: Vec<MonthBucket>,
    pub recent: RecentActivity,
    pub favourites_by_person: IndexMap<String, Ranked>,
    pub todays_flavours: usize,
    pub distinct_dates: usize,
    pub last_updated: Option<DateTime<Utc>>,
}

impl FlavourStats {
    /// The most recent `n` monthly buckets, oldest first.
    pub fn recent_months(&self, n: usize) -> &[MonthBucket] {
        let start = self.monthly.len().saturating_sub(n);
        &self.monthly[start..]
    }

    pub const fn is_empty(&self) -> bool {
        self.total_flavours == 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalyticsAggregator {
    shops: ShopPair,
}

impl AnalyticsAggregator {
    pub const fn new(shops: ShopPair) -> Self {
        Self { shops }
    }

    pub const fn shops(&self) -> &ShopPair {
        &self.shops
    }

    /// Filter `all` by `filter`, then summarize with `all` as context.
    pub fn aggregate(&self, all: &[Entry], filter: &ShopFilter, today: NaiveDate) -> FlavourStats {
        if filter.is_all() {
            self.summarize(all, all, today)
        } else {
            self.summarize(&filter.apply(all), all, today)
        }
    }

    /// Statistics for `entries`. Cross-shop figures come from `context`, the
    /// unfiltered collection.
    pub fn summarize(&self, entries: &[Entry], context: &[Entry], today: NaiveDate) -> FlavourStats {
        let total_flavours = entries.len();

        let shop_breakdown = tally::tally(entries.iter().map(|e| e.shop.as_str()));
        let person_breakdown = tally::tally(entries.iter().map(|e| e.person.as_str()));
        let flavour_counts = tally::tally(entries.iter().map(|e| fold_flavour(&e.flavor)));

        let mut top_flavours = tally::ranking(&flavour_counts);
        top_flavours.truncate(TOP_FLAVOURS);
        let most_common_flavour = top_flavours
            .first()
            .cloned()
            .unwrap_or_else(|| Ranked::new("None", 0));

        let date_range = date_range(entries);
        let flavours_per_day = date_range.as_ref().map_or(0.0, |range| {
            round2(total_flavours as f64 / range.days_between as f64)
        });

        let since = today - Duration::days(RECENT_WINDOW_DAYS - 1);
        let recent_count = entries
            .iter()
            .filter(|e| e.date >= since && e.date <= today)
            .count();

        FlavourStats {
            total_flavours,
            unique_flavours: flavour_counts.len(),
            most_popular_shop: tally::leader(&shop_breakdown),
            shop_breakdown,
            most_active_taster: tally::leader(&person_breakdown),
            person_breakdown,
            visits: VisitStats::from_entries(entries),
            top_flavours,
            most_common_flavour,
            date_range,
            flavours_per_day,
            shop_comparison: self.compare_shops(context),
            shop_variety: shop_variety(context),
            monthly: monthly_buckets(entries),
            recent: RecentActivity {
                since,
                count: recent_count,
                percentage: percentage(recent_count, total_flavours),
            },
            favourites_by_person: favourites_by_person(entries),
            todays_flavours: entries.iter().filter(|e| e.date == today).count(),
            distinct_dates: entries.iter().map(|e| e.date).collect::<HashSet<_>>().len(),
            last_updated: entries.iter().map(|e| e.timestamp).max(),
        }
    }

    fn compare_shops(&self, context: &[Entry]) -> ShopComparison {
        let count = |shop: &str| context.iter().filter(|e| e.shop == shop).count();
        let primary = Ranked::new(self.shops.primary.clone(), count(&self.shops.primary));
        let secondary = Ranked::new(self.shops.secondary.clone(), count(&self.shops.secondary));
        let ratio = (secondary.count > 0)
            .then(|| round2(primary.count as f64 / secondary.count as f64));

        ShopComparison {
            primary,
            secondary,
            ratio,
        }
    }
}

fn date_range(entries: &[Entry]) -> Option<DateRange> {
    let first_visit = entries.iter().map(|e| e.date).min()?;
    let last_visit = entries.iter().map(|e| e.date).max()?;
    Some(DateRange {
        first_visit,
        last_visit,
        days_between: (last_visit - first_visit).num_days().max(1),
    })
}

fn shop_variety(entries: &[Entry]) -> IndexMap<String, usize> {
    let mut seen: IndexMap<&str, HashSet<String>> = IndexMap::new();
    for entry in entries {
        seen.entry(entry.shop.as_str())
            .or_default()
            .insert(fold_flavour(&entry.flavor));
    }
    seen.into_iter()
        .map(|(shop, flavours)| (shop.to_string(), flavours.len()))
        .collect()
}

fn monthly_buckets(entries: &[Entry]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<(i32, u32), (String, usize)> = BTreeMap::new();
    for entry in entries {
        months
            .entry((entry.date.year(), entry.date.month()))
            .or_insert_with(|| (entry.date.format("%b %Y").to_string(), 0))
            .1 += 1;
    }
    months
        .into_iter()
        .map(|((year, month), (label, count))| MonthBucket {
            label,
            year,
            month,
            count,
        })
        .collect()
}

fn favourites_by_person(entries: &[Entry]) -> IndexMap<String, Ranked> {
    let mut per_person: IndexMap<&str, IndexMap<String, usize>> = IndexMap::new();
    for entry in entries {
        *per_person
            .entry(entry.person.as_str())
            .or_default()
            .entry(fold_flavour(&entry.flavor))
            .or_insert(0) += 1;
    }
    per_person
        .into_iter()
        .filter_map(|(person, counts)| {
            tally::leader(&counts).map(|favourite| (person.to_string(), favourite))
        })
        .collect()
}
