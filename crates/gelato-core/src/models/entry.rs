//! Entry model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::util::is_blank;

const LOCAL_ID_PREFIX: &str = "local-";

/// Identifier of an entry.
///
/// Remote ids are integers assigned by the store. Entries committed only to
/// the local collection carry a UUID v7 (time-sortable), which can never be
/// mistaken for a remote id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntryId {
    Remote(i64),
    Local(Uuid),
}

impl EntryId {
    /// Create a new client-only identifier
    #[must_use]
    pub fn new_local() -> Self {
        Self::Local(Uuid::now_v7())
    }

    #[must_use]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(id) => write!(f, "{id}"),
            Self::Local(id) => write!(f, "{LOCAL_ID_PREFIX}{id}"),
        }
    }
}

impl FromStr for EntryId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(id) = s.parse::<i64>() {
            return Ok(Self::Remote(id));
        }
        let raw = s.strip_prefix(LOCAL_ID_PREFIX).unwrap_or(s);
        Uuid::parse_str(raw)
            .map(Self::Local)
            .map_err(|_| Error::Validation(format!("invalid entry id '{s}'")))
    }
}

/// One recorded flavour tasting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Unique identifier
    pub id: EntryId,
    /// Venue the flavour was tasted at
    pub shop: String,
    /// Flavour name, stored verbatim
    pub flavor: String,
    /// Day of the tasting
    pub date: NaiveDate,
    /// Free text notes, empty when none were given
    #[serde(default)]
    pub notes: String,
    /// Who tasted it
    pub person: String,
    /// Creation instant assigned by the store (or the client for local commits)
    pub timestamp: DateTime<Utc>,
}

impl Entry {
    /// Build a client-only entry from a create request.
    #[must_use]
    pub fn local(request: &NewEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: EntryId::new_local(),
            shop: request.shop.clone(),
            flavor: request.flavor.clone(),
            date: request.date,
            notes: request.notes.clone(),
            person: request.person.clone(),
            timestamp,
        }
    }
}

/// Create request sent to the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEntry {
    pub shop: String,
    pub flavor: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: String,
    pub person: String,
}

impl NewEntry {
    /// Reject requests with a blank shop, flavour, or person.
    pub fn validate(&self) -> Result<()> {
        let missing = [
            ("shop", &self.shop),
            ("flavor", &self.flavor),
            ("person", &self.person),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(field, _)| field)
        .collect::<Vec<_>>();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}
