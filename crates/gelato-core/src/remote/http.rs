//! HTTP client for the Gelato Base entry API.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{AdminGate, RemoteEntryClient};
use crate::error::{Error, Result};
use crate::models::{Entry, EntryId, NewEntry};
use crate::util::{compact_text, is_http_url, normalize_text_option};

const ENTRIES_PATH: &str = "/api/entries";
const VERIFY_ADMIN_PATH: &str = "/api/verify-admin";

/// reqwest-backed [`RemoteEntryClient`] and [`AdminGate`].
#[derive(Clone)]
pub struct HttpEntryClient {
    base_url: String,
    client: Client,
}

impl HttpEntryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn entries_url(&self) -> String {
        format!("{}{ENTRIES_PATH}", self.base_url)
    }
}

impl RemoteEntryClient for HttpEntryClient {
    async fn list_entries(&self) -> Result<Vec<Entry>> {
        let response = self
            .client
            .get(self.entries_url())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let records = response.json::<Vec<WireEntry>>().await?;
        Ok(decode_entries(records))
    }

    async fn create_entry(&self, request: &NewEntry) -> Result<Entry> {
        let response = self
            .client
            .post(self.entries_url())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        response.json::<WireEntry>().await?.try_into()
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let EntryId::Remote(remote_id) = id else {
            return Err(Error::NotFound(id.to_string()));
        };

        let response = self
            .client
            .delete(format!("{}/{remote_id}", self.entries_url()))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

#[derive(Debug, Serialize)]
struct VerifyAdminRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct VerifyAdminResponse {
    #[serde(default)]
    valid: bool,
}

impl AdminGate for HttpEntryClient {
    async fn verify_admin(&self, password: &str) -> Result<bool> {
        let response = self
            .client
            .post(format!("{}{VERIFY_ADMIN_PATH}", self.base_url))
            .json(&VerifyAdminRequest { password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                Ok(response.json::<VerifyAdminResponse>().await?.valid)
            }
            StatusCode::UNAUTHORIZED => Ok(false),
            _ => Err(error_from_response(response).await),
        }
    }
}

/// Entry record as sent over the wire.
///
/// Older deployments spelled the flavour key `flavour`; both spellings are
/// accepted here and nowhere else.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireEntry {
    pub id: Option<EntryId>,
    pub shop: Option<String>,
    pub flavor: Option<String>,
    pub flavour: Option<String>,
    pub date: Option<String>,
    pub notes: Option<String>,
    pub person: Option<String>,
    pub timestamp: Option<String>,
}

impl TryFrom<WireEntry> for Entry {
    type Error = Error;

    fn try_from(value: WireEntry) -> Result<Self> {
        let id = value
            .id
            .ok_or_else(|| invalid_payload("entry record did not include an id"))?;
        let date = value.date.as_deref().and_then(parse_wire_date);
        let timestamp = value
            .timestamp
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
            .map(|timestamp| timestamp.with_timezone(&Utc));

        let (date, timestamp) = match (date, timestamp) {
            (Some(date), Some(timestamp)) => (date, timestamp),
            (Some(date), None) => {
                tracing::debug!(entry = %id, "Entry has no timestamp; using its date");
                (date, date.and_time(NaiveTime::MIN).and_utc())
            }
            (None, Some(timestamp)) => {
                tracing::debug!(entry = %id, "Entry has no valid date; using its timestamp");
                (timestamp.date_naive(), timestamp)
            }
            (None, None) => {
                return Err(invalid_payload(&format!(
                    "entry {id} has no valid date or timestamp"
                )))
            }
        };

        Ok(Self {
            id,
            shop: value.shop.unwrap_or_default(),
            flavor: value.flavor.or(value.flavour).unwrap_or_default(),
            date,
            notes: value.notes.unwrap_or_default(),
            person: value.person.unwrap_or_default(),
            timestamp,
        })
    }
}

/// Decode a listing, dropping records that cannot become entries.
fn decode_entries(records: Vec<WireEntry>) -> Vec<Entry> {
    let total = records.len();
    let entries = records
        .into_iter()
        .filter_map(|record| {
            Entry::try_from(record)
                .inspect_err(|error| tracing::warn!(%error, "Skipping unreadable entry record"))
                .ok()
        })
        .collect::<Vec<_>>();
    if entries.len() < total {
        tracing::warn!(
            skipped = total - entries.len(),
            kept = entries.len(),
            "Some entry records were unreadable"
        );
    }
    entries
}

fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    // Some stores serialize dates as full ISO instants.
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

fn invalid_payload(message: &str) -> Error {
    Error::Transport(format!("invalid entry payload: {message}"))
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

async fn error_from_response(response: reqwest::Response) -> Error {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    error_for_status(status, &body)
}

fn error_for_status(status: StatusCode, body: &str) -> Error {
    let message = parse_api_error(status, body);
    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Permission(message),
        _ => Error::Transport(message),
    }
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.message.or(payload.error) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> Result<String> {
    let base_url = normalize_text_option(Some(raw))
        .ok_or_else(|| Error::Configuration("API base URL must not be empty".to_string()))?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(Error::Configuration(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("gelato.example.com".to_string()).is_err());
        assert_eq!(
            normalize_base_url(" https://gelato.example.com/ ".to_string()).unwrap(),
            "https://gelato.example.com"
        );
    }

    #[test]
    fn wire_entry_accepts_legacy_flavour_key() {
        let record: WireEntry = serde_json::from_str(
            r#"{"id": 3, "shop": "Joelato", "flavour": "Hazelnut", "date": "2024-03-01",
                "person": "Ana", "timestamp": "2024-03-01T12:30:00.000Z"}"#,
        )
        .unwrap();
        let entry = Entry::try_from(record).unwrap();

        assert_eq!(entry.id, EntryId::Remote(3));
        assert_eq!(entry.flavor, "Hazelnut");
        assert_eq!(entry.notes, "");
        assert_eq!(entry.timestamp.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    }

    #[test]
    fn wire_entry_prefers_canonical_flavor_key() {
        let record = WireEntry {
            id: Some(EntryId::Remote(1)),
            flavor: Some("Mint".to_string()),
            flavour: Some("Old Mint".to_string()),
            date: Some("2024-03-01".to_string()),
            ..WireEntry::default()
        };
        assert_eq!(Entry::try_from(record).unwrap().flavor, "Mint");
    }

    #[test]
    fn wire_entry_accepts_iso_instant_dates() {
        let record = WireEntry {
            id: Some(EntryId::Remote(1)),
            date: Some("2024-03-01T00:00:00.000Z".to_string()),
            ..WireEntry::default()
        };
        let entry = Entry::try_from(record).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(entry.timestamp, entry.date.and_hms_opt(0, 0, 0).unwrap().and_utc());
    }

    #[test]
    fn wire_entry_without_id_or_date_is_a_protocol_error() {
        let no_id = WireEntry {
            date: Some("2024-03-01".to_string()),
            ..WireEntry::default()
        };
        assert!(matches!(Entry::try_from(no_id), Err(Error::Transport(_))));

        let no_date = WireEntry {
            id: Some(EntryId::Remote(1)),
            ..WireEntry::default()
        };
        assert!(matches!(Entry::try_from(no_date), Err(Error::Transport(_))));
    }

    #[test]
    fn wire_entry_without_date_uses_timestamp_day() {
        let record = WireEntry {
            id: Some(EntryId::Remote(4)),
            date: Some("someday".to_string()),
            timestamp: Some("2024-03-09T18:00:00.000Z".to_string()),
            ..WireEntry::default()
        };
        let entry = Entry::try_from(record).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
    }

    #[test]
    fn one_bad_record_does_not_sink_the_listing() {
        let records: Vec<WireEntry> = serde_json::from_str(
            r#"[{"id": 1, "shop": "Joelato", "flavor": "Mint", "date": "2024-03-01"},
                {"shop": "Joelato", "flavor": "No id", "date": "2024-03-01"},
                {"id": 3, "shop": "Joelato", "flavor": "No day"},
                {"id": 4, "shop": "Joelato", "flavor": "Lemon", "date": "2024-03-02"}]"#,
        )
        .unwrap();

        let flavors = decode_entries(records)
            .into_iter()
            .map(|entry| entry.flavor)
            .collect::<Vec<_>>();
        assert_eq!(flavors, vec!["Mint", "Lemon"]);
    }

    #[test]
    fn error_for_status_maps_taxonomy() {
        assert!(matches!(
            error_for_status(StatusCode::BAD_REQUEST, r#"{"error":"Missing required fields"}"#),
            Error::Validation(message) if message == "Missing required fields (400)"
        ));
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, ""),
            Error::NotFound(message) if message == "HTTP 404"
        ));
        assert!(matches!(
            error_for_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            Error::Transport(message) if message == "boom (500)"
        ));
    }

    #[tokio::test]
    async fn delete_of_local_id_never_reaches_the_network() {
        let client =
            HttpEntryClient::new("http://127.0.0.1:9", Duration::from_millis(50)).unwrap();
        let result = client.delete_entry(&EntryId::new_local()).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let client =
            HttpEntryClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
        let result = client.list_entries().await;
        assert!(matches!(result, Err(Error::Transport(_))));
    }
}
