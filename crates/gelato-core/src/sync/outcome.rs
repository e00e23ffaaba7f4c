//! Terminal states of synchronizer operations.

use std::fmt;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::EntryId;

/// Lifecycle of one operation: `Idle -> InFlight -> {Committed, DegradedFallback, Rejected}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationState {
    Idle,
    InFlight,
    Committed,
    DegradedFallback,
    Rejected,
}

/// Result of a synchronizer operation.
#[derive(Debug)]
pub enum SyncOutcome<T> {
    /// The remote store confirmed the change
    Committed(T),
    /// The remote store failed; the change was applied locally only
    DegradedFallback { value: T, cause: Error },
    /// Nothing was attempted (validation or permission failure)
    Rejected(Error),
}

impl<T> SyncOutcome<T> {
    pub const fn state(&self) -> OperationState {
        match self {
            Self::Committed(_) => OperationState::Committed,
            Self::DegradedFallback { .. } => OperationState::DegradedFallback,
            Self::Rejected(_) => OperationState::Rejected,
        }
    }

    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::DegradedFallback { .. })
    }

    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Committed(value) | Self::DegradedFallback { value, .. } => Some(value),
            Self::Rejected(_) => None,
        }
    }

    /// Committed and degraded outcomes both carry a usable value.
    pub fn into_result(self) -> Result<T> {
        match self {
            Self::Committed(value) | Self::DegradedFallback { value, .. } => Ok(value),
            Self::Rejected(error) => Err(error),
        }
    }
}

/// Where a load got its entries from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadSource {
    Remote,
    Cache,
    Demo,
}

/// Dismissible, non-fatal warning raised after a fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    LoadFellBack { source: LoadSource },
    SavedLocally { count: usize },
    DeletedLocally { id: EntryId },
}

impl fmt::Display for SyncWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoadFellBack {
                source: LoadSource::Demo,
            } => write!(f, "Could not connect to the entry store. Using demo data."),
            Self::LoadFellBack { .. } => {
                write!(f, "Could not connect to the entry store. Using cached entries.")
            }
            Self::SavedLocally { count } => write!(
                f,
                "Failed to save to the entry store. Saved {count} flavour(s) locally."
            ),
            Self::DeletedLocally { id } => write!(
                f,
                "Failed to delete entry {id} from the entry store. Deleted locally."
            ),
        }
    }
}
