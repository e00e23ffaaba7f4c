//! Data models for Gelato Base

mod draft;
mod entry;

pub use draft::EntryDraft;
pub use entry::{Entry, EntryId, NewEntry};
