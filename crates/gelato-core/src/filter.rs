//! Shop filter applied before aggregation and display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Entry;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopFilter {
    #[default]
    All,
    Shop(String),
}

impl ShopFilter {
    /// Shop names match exactly, as they are picked from a fixed list.
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            Self::All => true,
            Self::Shop(shop) => entry.shop == *shop,
        }
    }

    pub fn apply(&self, entries: &[Entry]) -> Vec<Entry> {
        entries
            .iter()
            .filter(|entry| self.matches(entry))
            .cloned()
            .collect()
    }

    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

impl From<&str> for ShopFilter {
    fn from(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Shop(value.to_string())
        }
    }
}

impl FromStr for ShopFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ShopFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Shop(shop) => write!(f, "{shop}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_entries;

    #[test]
    fn parse_treats_all_and_blank_as_unfiltered() {
        assert_eq!("ALL".parse::<ShopFilter>().unwrap(), ShopFilter::All);
        assert_eq!(ShopFilter::from(" "), ShopFilter::All);
        assert_eq!(
            " Joelato ".parse::<ShopFilter>().unwrap(),
            ShopFilter::Shop("Joelato".to_string())
        );
    }

    #[test]
    fn apply_keeps_only_matching_shop() {
        let entries = demo_entries();
        assert_eq!(ShopFilter::All.apply(&entries).len(), 2);

        let marys = ShopFilter::Shop("Mary's Milk Bar".to_string()).apply(&entries);
        assert_eq!(marys.len(), 1);
        assert_eq!(marys[0].flavor, "Vanilla");
    }
}
