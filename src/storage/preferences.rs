//! User preferences persisted in the settings table.

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const CLOSE_TO_SERVICE_KEY: &str = "close_to_service_health_threshold";
const DEFAULT_ALERT_KEY: &str = "default_alert_threshold_percent";

/// Default health % at or below which a component shows up on the due list.
pub const DEFAULT_CLOSE_TO_SERVICE_THRESHOLD: i32 = 20;
/// Default per-component alert threshold applied to newly created components.
pub const DEFAULT_ALERT_THRESHOLD_PERCENT: i32 = 10;
pub const MIN_THRESHOLD: i32 = 1;
pub const MAX_THRESHOLD: i32 = 100;

/// User-configurable preferences. Defaults match app defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPreferences {
    /// Health % below which a "close to service" item appears on the due list.
    pub close_to_service_threshold: i32,
    /// Alert threshold applied to components that don't override it.
    pub default_alert_threshold_percent: i32,
}

impl Default for AppPreferences {
    fn default() -> Self {
        Self {
            close_to_service_threshold: DEFAULT_CLOSE_TO_SERVICE_THRESHOLD,
            default_alert_threshold_percent: DEFAULT_ALERT_THRESHOLD_PERCENT,
        }
    }
}

/// Store for reading and writing preferences.
pub struct PreferencesStore<'a> {
    conn: &'a Connection,
}

impl<'a> PreferencesStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Load preferences, falling back to defaults for unset keys.
    pub fn load(&self) -> Result<AppPreferences, PreferencesError> {
        Ok(AppPreferences {
            close_to_service_threshold: self
                .get_int(CLOSE_TO_SERVICE_KEY)?
                .unwrap_or(DEFAULT_CLOSE_TO_SERVICE_THRESHOLD),
            default_alert_threshold_percent: self
                .get_int(DEFAULT_ALERT_KEY)?
                .unwrap_or(DEFAULT_ALERT_THRESHOLD_PERCENT),
        })
    }

    /// Set the close-to-service threshold, clamped to the valid range.
    pub fn set_close_to_service_threshold(&self, value: i32) -> Result<(), PreferencesError> {
        self.set_int(CLOSE_TO_SERVICE_KEY, value.clamp(MIN_THRESHOLD, MAX_THRESHOLD))
    }

    /// Set the default alert threshold, clamped to the valid range.
    pub fn set_default_alert_threshold(&self, value: i32) -> Result<(), PreferencesError> {
        self.set_int(DEFAULT_ALERT_KEY, value.clamp(MIN_THRESHOLD, MAX_THRESHOLD))
    }

    fn get_int(&self, key: &str) -> Result<Option<i32>, PreferencesError> {
        let value: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    fn set_int(&self, key: &str, value: i32) -> Result<(), PreferencesError> {
        self.conn.execute(
            "INSERT INTO settings (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value.to_string()],
        )?;
        Ok(())
    }
}

/// Preferences store errors.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::Database;

    #[test]
    fn test_defaults_when_unset() {
        let db = Database::open_in_memory().unwrap();
        let store = PreferencesStore::new(db.connection());
        let prefs = store.load().unwrap();
        assert_eq!(prefs.close_to_service_threshold, 20);
        assert_eq!(prefs.default_alert_threshold_percent, 10);
    }

    #[test]
    fn test_set_and_reload() {
        let db = Database::open_in_memory().unwrap();
        let store = PreferencesStore::new(db.connection());
        store.set_close_to_service_threshold(35).unwrap();
        store.set_default_alert_threshold(15).unwrap();
        let prefs = store.load().unwrap();
        assert_eq!(prefs.close_to_service_threshold, 35);
        assert_eq!(prefs.default_alert_threshold_percent, 15);
    }

    #[test]
    fn test_threshold_clamped() {
        let db = Database::open_in_memory().unwrap();
        let store = PreferencesStore::new(db.connection());
        store.set_close_to_service_threshold(0).unwrap();
        assert_eq!(store.load().unwrap().close_to_service_threshold, 1);
        store.set_close_to_service_threshold(250).unwrap();
        assert_eq!(store.load().unwrap().close_to_service_threshold, 100);
    }
}
