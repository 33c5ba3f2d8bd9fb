//! Storage module for database access and user preferences.

pub mod database;
pub mod preferences;
pub mod schema;

pub use database::{Database, DatabaseError};
pub use preferences::{AppPreferences, PreferencesStore};
