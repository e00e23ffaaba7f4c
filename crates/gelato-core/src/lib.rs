//! gelato-core - Core library for Gelato Base
//!
//! This crate contains the entry model, the synchronizer that keeps the
//! session's entry collection consistent with the remote store, and the
//! analytics used by every Gelato Base interface (CLI, API, dashboards).

pub mod cache;
pub mod config;
pub mod demo;
pub mod error;
pub mod filter;
pub mod models;
pub mod remote;
pub mod stats;
pub mod sync;
pub mod timeline;
pub mod util;

pub use error::{Error, Result};
pub use filter::ShopFilter;
pub use models::{Entry, EntryDraft, EntryId, NewEntry};
pub use stats::{AnalyticsAggregator, FlavourStats};
pub use sync::{EntrySynchronizer, LoadSource, OperationState, SyncOutcome};
