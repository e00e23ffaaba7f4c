//! SQLite entry store

pub mod migrations;

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use gelato_core::{Entry, EntryId, NewEntry};
use rusqlite::{params, Connection, Row};
use thiserror::Error;

/// Stored timestamps sort lexically in time order.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Stored entry {id} is corrupt: {reason}")]
    Corrupt { id: i64, reason: String },
    #[error("Database connection lock poisoned")]
    Poisoned,
    #[error("Database task failed: {0}")]
    Task(String),
}

/// Entry table behind a single connection. Queries run on the blocking pool.
#[derive(Clone)]
pub struct EntryStore {
    conn: Arc<Mutex<Connection>>,
}

impl EntryStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        migrations::run(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// All entries, newest first. Rows that cannot be decoded are skipped.
    pub async fn list(&self) -> Result<Vec<Entry>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, shop, flavor, date, notes, person, timestamp
                 FROM entries ORDER BY timestamp DESC, id DESC",
            )?;
            let rows = stmt
                .query_map([], EntryRow::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows
                .into_iter()
                .filter_map(|row| {
                    let id = row.id;
                    Entry::try_from(row)
                        .inspect_err(|error| {
                            tracing::warn!(id, %error, "Skipping unreadable entry");
                        })
                        .ok()
                })
                .collect())
        })
        .await
    }

    /// Insert a validated request; the store assigns id and timestamp.
    pub async fn insert(&self, request: NewEntry) -> Result<Entry, StoreError> {
        let timestamp = Utc::now().trunc_subsecs(3);
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO entries (shop, flavor, date, notes, person, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    request.shop,
                    request.flavor,
                    request.date.format("%Y-%m-%d").to_string(),
                    request.notes,
                    request.person,
                    timestamp.format(TIMESTAMP_FORMAT).to_string(),
                ],
            )?;
            Ok(Entry {
                id: EntryId::Remote(conn.last_insert_rowid()),
                shop: request.shop,
                flavor: request.flavor,
                date: request.date,
                notes: request.notes,
                person: request.person,
                timestamp,
            })
        })
        .await
    }

    /// Returns `false` when no entry has this id.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        self.with_conn(move |conn| {
            let deleted = conn.execute("DELETE FROM entries WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn with_conn<T, F>(&self, work: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock().map_err(|_| StoreError::Poisoned)?;
            work(&conn)
        })
        .await
        .map_err(|error| StoreError::Task(error.to_string()))?
    }
}

/// Raw row; legacy rows may hold NULLs.
struct EntryRow {
    id: i64,
    shop: Option<String>,
    flavor: Option<String>,
    date: Option<String>,
    notes: Option<String>,
    person: Option<String>,
    timestamp: Option<String>,
}

impl EntryRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            shop: row.get(1)?,
            flavor: row.get(2)?,
            date: row.get(3)?,
            notes: row.get(4)?,
            person: row.get(5)?,
            timestamp: row.get(6)?,
        })
    }
}

impl TryFrom<EntryRow> for Entry {
    type Error = StoreError;

    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let corrupt = |reason: &str| StoreError::Corrupt {
            id: row.id,
            reason: reason.to_string(),
        };

        let date = row
            .date
            .as_deref()
            .and_then(|value| value.get(..10))
            .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok());
        let timestamp = row
            .timestamp
            .as_deref()
            .map(|value| {
                DateTime::parse_from_rfc3339(value)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .map_err(|_| corrupt("invalid timestamp"))
            })
            .transpose()?;

        // Either column can stand in for a missing one, but not both.
        let (date, timestamp) = match (date, timestamp) {
            (Some(date), Some(timestamp)) => (date, timestamp),
            (Some(date), None) => (date, date.and_time(chrono::NaiveTime::MIN).and_utc()),
            (None, Some(timestamp)) => (timestamp.date_naive(), timestamp),
            (None, None) => return Err(corrupt("no readable date or timestamp")),
        };

        Ok(Self {
            id: EntryId::Remote(row.id),
            shop: row.shop.unwrap_or_default(),
            flavor: row.flavor.unwrap_or_default(),
            date,
            notes: row.notes.unwrap_or_default(),
            person: row.person.unwrap_or_default(),
            timestamp,
        })
    }
}
