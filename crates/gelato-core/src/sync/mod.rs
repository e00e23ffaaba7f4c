//! Session-scoped owner of the canonical entry collection.
//!
//! The synchronizer reconciles the remote store with a local durable cache.
//! Remote failures never drop user input: loads fall back to the cache (or
//! the demo dataset), submissions and deletions are committed locally and a
//! dismissible warning is raised.

mod outcome;

pub use outcome::{LoadSource, OperationState, SyncOutcome, SyncWarning};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::cache::EntryCache;
use crate::demo::demo_entries;
use crate::error::{Error, Result};
use crate::models::{Entry, EntryDraft, EntryId};
use crate::remote::{AdminGate, RemoteEntryClient};

/// Owns the canonical, newest-first entry collection for one session.
///
/// Mutations replace the whole collection, so a snapshot handed out earlier
/// is never modified. Overlapping operations are not queued; whichever
/// commits last determines the visible state.
pub struct EntrySynchronizer<R, C> {
    remote: R,
    cache: C,
    entries: RwLock<Arc<Vec<Entry>>>,
    warning: RwLock<Option<SyncWarning>>,
    elevated: AtomicBool,
    in_flight: AtomicUsize,
}

impl<R: RemoteEntryClient, C: EntryCache> EntrySynchronizer<R, C> {
    /// Create a synchronizer with an empty collection. Call [`Self::load`] next.
    pub fn new(remote: R, cache: C) -> Self {
        Self {
            remote,
            cache,
            entries: RwLock::new(Arc::new(Vec::new())),
            warning: RwLock::new(None),
            elevated: AtomicBool::new(false),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Fetch the full collection from the remote store.
    ///
    /// On failure the collection comes from the local cache, or from the demo
    /// dataset when the cache is empty or unreadable.
    pub async fn load(&self) -> SyncOutcome<LoadSource> {
        let _in_flight = self.begin();
        self.dismiss_warning().await;

        match self.remote.list_entries().await {
            Ok(mut entries) => {
                sort_newest_first(&mut entries);
                tracing::info!(count = entries.len(), "Loaded entries from remote store");
                self.replace(entries, true).await;
                SyncOutcome::Committed(LoadSource::Remote)
            }
            Err(cause) => {
                tracing::warn!(error = %cause, "Could not load entries from remote store");
                let (entries, source) = match self.cache.load() {
                    Ok(Some(entries)) => (entries, LoadSource::Cache),
                    Ok(None) => (demo_entries(), LoadSource::Demo),
                    Err(error) => {
                        tracing::warn!(%error, "Local entry cache is unreadable");
                        (demo_entries(), LoadSource::Demo)
                    }
                };
                tracing::info!(count = entries.len(), ?source, "Using fallback entries");
                self.replace(entries, false).await;
                self.raise(SyncWarning::LoadFellBack { source }).await;
                SyncOutcome::DegradedFallback {
                    value: source,
                    cause,
                }
            }
        }
    }

    /// Persist one entry per non-blank flavour of the draft, in order.
    ///
    /// If the store fails partway, every requested flavour (including the
    /// ones already confirmed) is committed locally with client-only ids.
    pub async fn submit_entries(&self, draft: &EntryDraft) -> SyncOutcome<Vec<Entry>> {
        let requests = match draft.requests() {
            Ok(requests) => requests,
            Err(error) => return SyncOutcome::Rejected(error),
        };

        let _in_flight = self.begin();
        let mut confirmed = Vec::with_capacity(requests.len());

        for request in &requests {
            match self.remote.create_entry(request).await {
                Ok(entry) => confirmed.push(entry),
                Err(cause) => {
                    tracing::warn!(
                        error = %cause,
                        confirmed = confirmed.len(),
                        requested = requests.len(),
                        "Failed to save entries to remote store; saving locally"
                    );
                    let now = Utc::now();
                    let local = requests
                        .iter()
                        .map(|request| Entry::local(request, now))
                        .collect::<Vec<_>>();
                    self.prepend(local.clone()).await;
                    self.raise(SyncWarning::SavedLocally { count: local.len() })
                        .await;
                    return SyncOutcome::DegradedFallback {
                        value: local,
                        cause,
                    };
                }
            }
        }

        tracing::info!(count = confirmed.len(), shop = %draft.shop, "Saved entries");
        self.prepend(confirmed.clone()).await;
        SyncOutcome::Committed(confirmed)
    }

    /// Delete one entry. Requires a prior successful [`Self::verify_admin`].
    ///
    /// A remote failure still removes the entry from this session's view.
    /// Client-only ids (demo rows, local saves) are removed without contacting
    /// the store.
    pub async fn delete_entry(&self, id: EntryId) -> SyncOutcome<EntryId> {
        if !self.is_admin() {
            return SyncOutcome::Rejected(Error::Permission(
                "admin verification is required to delete entries".to_string(),
            ));
        }

        let _in_flight = self.begin();
        if id.is_local() {
            // Never assigned by the store, so there is nothing remote to delete.
            tracing::info!(entry = %id, "Deleted client-only entry");
            self.remove(id).await;
            return SyncOutcome::Committed(id);
        }

        match self.remote.delete_entry(&id).await {
            Ok(()) => {
                tracing::info!(entry = %id, "Deleted entry");
                self.remove(id).await;
                SyncOutcome::Committed(id)
            }
            Err(cause) => {
                tracing::warn!(
                    entry = %id,
                    error = %cause,
                    "Failed to delete from remote store; deleting locally"
                );
                self.remove(id).await;
                self.raise(SyncWarning::DeletedLocally { id }).await;
                SyncOutcome::DegradedFallback { value: id, cause }
            }
        }
    }

    /// Ask the admin gate to grant the elevated privilege for this session.
    ///
    /// Configuration faults behind the gate surface as a generic failure.
    pub async fn verify_admin(&self, gate: &impl AdminGate, password: &str) -> Result<bool> {
        if password.is_empty() {
            return Err(Error::Validation("Password is required".to_string()));
        }

        match gate.verify_admin(password).await {
            Ok(valid) => {
                if valid {
                    self.elevated.store(true, Ordering::SeqCst);
                    tracing::info!("Admin privilege granted");
                } else {
                    tracing::warn!("Admin verification rejected");
                }
                Ok(valid)
            }
            Err(Error::Configuration(detail)) => {
                tracing::error!(%detail, "Admin gate is misconfigured");
                Err(Error::Transport("admin verification failed".to_string()))
            }
            Err(error) => Err(error),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.elevated.load(Ordering::SeqCst)
    }

    pub fn revoke_admin(&self) {
        self.elevated.store(false, Ordering::SeqCst);
    }

    /// Immutable view of the canonical collection, newest first.
    pub async fn snapshot(&self) -> Arc<Vec<Entry>> {
        Arc::clone(&*self.entries.read().await)
    }

    /// Current warning banner, if any.
    pub async fn warning(&self) -> Option<SyncWarning> {
        self.warning.read().await.clone()
    }

    pub async fn dismiss_warning(&self) {
        *self.warning.write().await = None;
    }

    /// Whether any operation is awaiting the remote store.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn activity(&self) -> OperationState {
        if self.is_busy() {
            OperationState::InFlight
        } else {
            OperationState::Idle
        }
    }

    fn begin(&self) -> InFlightGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlightGuard(&self.in_flight)
    }

    async fn raise(&self, warning: SyncWarning) {
        *self.warning.write().await = Some(warning);
    }

    async fn replace(&self, entries: Vec<Entry>, persist: bool) {
        let committed = self.commit(entries).await;
        if persist {
            self.persist(&committed);
        }
    }

    async fn prepend(&self, fresh: Vec<Entry>) {
        let committed = {
            let mut guard = self.entries.write().await;
            let mut next = Vec::with_capacity(fresh.len() + guard.len());
            next.extend(fresh);
            next.extend(guard.iter().cloned());
            *guard = Arc::new(next);
            Arc::clone(&guard)
        };
        self.persist(&committed);
    }

    async fn remove(&self, id: EntryId) {
        let committed = {
            let mut guard = self.entries.write().await;
            let next = guard
                .iter()
                .filter(|entry| entry.id != id)
                .cloned()
                .collect::<Vec<_>>();
            if next.len() == guard.len() {
                tracing::debug!(entry = %id, "Entry was not in the local collection");
            }
            *guard = Arc::new(next);
            Arc::clone(&guard)
        };
        self.persist(&committed);
    }

    async fn commit(&self, entries: Vec<Entry>) -> Arc<Vec<Entry>> {
        let committed = Arc::new(entries);
        *self.entries.write().await = Arc::clone(&committed);
        committed
    }

    // Called with no lock held. Best effort: the cache is a mirror, never a
    // reason to fail a mutation.
    fn persist(&self, entries: &[Entry]) {
        if let Err(error) = self.cache.store(entries) {
            tracing::warn!(%error, "Could not update local entry cache");
        }
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Sort by timestamp, newest first. Ties keep their incoming order.
pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
}
