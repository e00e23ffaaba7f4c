//! Multi-flavour submission draft

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::NewEntry;
use crate::error::{Error, Result};
use crate::util::is_blank;

/// One form submission: a shop visit with any number of flavours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub shop: String,
    pub person: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    /// Candidate flavours in the order they were typed; blanks are skipped
    pub flavors: Vec<String>,
}

impl EntryDraft {
    /// Flavours that survive trimming, in submission order.
    pub fn flavors(&self) -> Vec<String> {
        self.flavors
            .iter()
            .map(|flavor| flavor.trim())
            .filter(|flavor| !flavor.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Build one create request per non-blank flavour.
    pub fn requests(&self) -> Result<Vec<NewEntry>> {
        let flavors = self.flavors();
        if flavors.is_empty() || is_blank(&self.person) {
            return Err(Error::Validation(
                "Please fill in at least one flavour and your name".to_string(),
            ));
        }

        let notes = self.notes.clone().unwrap_or_default();
        let requests = flavors
            .into_iter()
            .map(|flavor| NewEntry {
                shop: self.shop.clone(),
                flavor,
                date: self.date,
                notes: notes.clone(),
                person: self.person.clone(),
            })
            .collect::<Vec<_>>();

        for request in &requests {
            request.validate()?;
        }
        Ok(requests)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(flavors: &[&str], person: &str) -> EntryDraft {
        EntryDraft {
            shop: "Joelato".to_string(),
            person: person.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            notes: None,
            flavors: flavors.iter().map(|flavor| (*flavor).to_string()).collect(),
        }
    }

    #[test]
    fn requests_skip_blank_flavours_and_trim() {
        let requests = draft(&["  Mint ", "", "   ", "Choc"], "Ana")
            .requests()
            .unwrap();
        let flavors = requests
            .iter()
            .map(|request| request.flavor.as_str())
            .collect::<Vec<_>>();
        assert_eq!(flavors, vec!["Mint", "Choc"]);
        assert!(requests.iter().all(|request| request.notes.is_empty()));
    }

    #[test]
    fn requests_require_a_flavour_and_a_person() {
        assert!(matches!(
            draft(&["", " "], "Ana").requests(),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            draft(&["Mint"], "  ").requests(),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn requests_reject_blank_shop() {
        let mut blank_shop = draft(&["Mint"], "Ana");
        blank_shop.shop = String::new();
        assert!(matches!(blank_shop.requests(), Err(Error::Validation(_))));
    }
}
