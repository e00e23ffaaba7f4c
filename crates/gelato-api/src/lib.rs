//! gelato-api - entry store and admin gate for Gelato Base
//!
//! Serves the entry collection over HTTP from a SQLite database and checks
//! the admin password that unlocks deletions.

pub mod config;
pub mod db;
pub mod error;
pub mod routes;

pub use config::{AppConfig, ConfigError};
pub use db::{EntryStore, StoreError};
pub use error::AppError;
pub use routes::{app_router, AppState};
