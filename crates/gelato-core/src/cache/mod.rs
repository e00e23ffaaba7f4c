//! Local durable mirror of the canonical entry collection.
//!
//! The cache is a single named slot holding the whole collection as JSON. It
//! is overwritten wholesale after every committed mutation and only read when
//! the remote store cannot be reached at load time.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::Result;
use crate::models::Entry;

/// Name of the cache slot.
pub const CACHE_SLOT_NAME: &str = "ice-cream-entries";

/// Storage for the entry snapshot
pub trait EntryCache {
    /// Read the last stored snapshot, `None` when the slot is empty
    fn load(&self) -> Result<Option<Vec<Entry>>>;

    /// Replace the slot with the given snapshot
    fn store(&self, entries: &[Entry]) -> Result<()>;
}

/// File-backed cache slot (`<dir>/ice-cream-entries.json`).
#[derive(Debug, Clone)]
pub struct FileEntryCache {
    path: PathBuf,
}

impl FileEntryCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Cache slot inside the given directory.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(format!("{CACHE_SLOT_NAME}.json")))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntryCache for FileEntryCache {
    fn load(&self) -> Result<Option<Vec<Entry>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn store(&self, entries: &[Entry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_string(entries)?;
        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, serialized)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

/// In-process cache slot holding the serialized snapshot.
///
/// Clones share the same slot, so a fresh session built from a clone sees
/// what the previous one stored.
#[derive(Debug, Clone, Default)]
pub struct MemoryEntryCache {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryEntryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw JSON currently held by the slot.
    pub fn raw(&self) -> Option<String> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl EntryCache for MemoryEntryCache {
    fn load(&self) -> Result<Option<Vec<Entry>>> {
        self.raw()
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(Into::into)
    }

    fn store(&self, entries: &[Entry]) -> Result<()> {
        let serialized = serde_json::to_string(entries)?;
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(serialized);
        Ok(())
    }
}
