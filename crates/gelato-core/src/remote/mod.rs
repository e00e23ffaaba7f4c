//! Remote persistence collaborator and admin gate.

mod http;

pub use http::{HttpEntryClient, WireEntry};

use crate::error::{Error, Result};
use crate::models::{Entry, EntryId, NewEntry};

/// Operations offered by the remote entry store
#[allow(async_fn_in_trait)]
pub trait RemoteEntryClient {
    /// All entries, newest first
    async fn list_entries(&self) -> Result<Vec<Entry>>;

    /// Persist one entry; the store assigns its id and timestamp
    async fn create_entry(&self, request: &NewEntry) -> Result<Entry>;

    /// Remove one entry
    async fn delete_entry(&self, id: &EntryId) -> Result<()>;
}

/// Grants the elevated privilege required for deletions
#[allow(async_fn_in_trait)]
pub trait AdminGate {
    async fn verify_admin(&self, password: &str) -> Result<bool>;
}

/// Admin gate comparing against a server-held secret.
///
/// This is a plain string equality check: no hashing, no constant-time
/// comparison, no rate limiting. A missing secret is a configuration error.
#[derive(Clone, Default)]
pub struct SecretAdminGate {
    secret: Option<String>,
}

impl SecretAdminGate {
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: crate::util::normalize_text_option(secret),
        }
    }

    pub fn check(&self, password: &str) -> Result<bool> {
        let secret = self.secret.as_deref().ok_or_else(|| {
            Error::Configuration("admin password is not configured".to_string())
        })?;
        Ok(password == secret)
    }
}

impl std::fmt::Debug for SecretAdminGate {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SecretAdminGate")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AdminGate for SecretAdminGate {
    async fn verify_admin(&self, password: &str) -> Result<bool> {
        self.check(password)
    }
}
