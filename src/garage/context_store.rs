//! Per-component context records: notes, purchase details, serial number.
//!
//! At most one record per component, saved whole via upsert. Optional text
//! fields are trimmed on save and collapse to NULL when blank. The record is
//! removed with its component; see `ComponentStore::delete`.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use url::Url;

use crate::garage::types::ComponentContext;
use crate::garage::GarageError;

pub struct ContextStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "component_id, notes, purchase_url, serial_number,
     last_service_notes, purchase_price, purchased_at";

impl<'a> ContextStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// The component's context record, if one was ever saved.
    pub fn get(&self, component_id: i64) -> Result<Option<ComponentContext>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM component_context WHERE component_id = ?1");
        self.conn
            .query_row(&sql, params![component_id], parse_context_row)
            .optional()
            .map_err(GarageError::from)
    }

    /// Validate and save a context record, replacing any existing one for
    /// the component. Notes must contain at least one character after
    /// trimming; the purchase link must be an http(s) URL when present.
    pub fn upsert(&self, context: &ComponentContext) -> Result<ComponentContext, GarageError> {
        let notes = context.notes.trim();
        if notes.is_empty() {
            return Err(GarageError::Validation("Notes are required".to_string()));
        }
        let purchase_url = trimmed_or_none(context.purchase_url.as_deref());
        if let Some(link) = &purchase_url {
            if !is_valid_http_url(link) {
                return Err(GarageError::Validation(
                    "Purchase link must be a valid URL".to_string(),
                ));
            }
        }

        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM components WHERE id = ?1",
            params![context.component_id],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Err(GarageError::ComponentNotFound(context.component_id));
        }

        let saved = ComponentContext {
            component_id: context.component_id,
            notes: notes.to_string(),
            purchase_url,
            serial_number: trimmed_or_none(context.serial_number.as_deref()),
            last_service_notes: trimmed_or_none(context.last_service_notes.as_deref()),
            purchase_price: trimmed_or_none(context.purchase_price.as_deref()),
            purchased_at: context.purchased_at,
        };
        self.conn.execute(
            "INSERT INTO component_context
             (component_id, notes, purchase_url, serial_number, last_service_notes,
              purchase_price, purchased_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(component_id) DO UPDATE SET
             notes = excluded.notes, purchase_url = excluded.purchase_url,
             serial_number = excluded.serial_number,
             last_service_notes = excluded.last_service_notes,
             purchase_price = excluded.purchase_price,
             purchased_at = excluded.purchased_at",
            params![
                saved.component_id,
                saved.notes,
                saved.purchase_url,
                saved.serial_number,
                saved.last_service_notes,
                saved.purchase_price,
                saved.purchased_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(saved)
    }

    /// Remove a component's context record. Runs as part of component
    /// deletion; not exposed as a standalone operation.
    pub fn delete_for_component(&self, component_id: i64) -> Result<usize, GarageError> {
        let deleted = self.conn.execute(
            "DELETE FROM component_context WHERE component_id = ?1",
            params![component_id],
        )?;
        Ok(deleted)
    }
}

fn trimmed_or_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn is_valid_http_url(s: &str) -> bool {
    match Url::parse(s) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

fn parse_context_row(row: &rusqlite::Row) -> rusqlite::Result<ComponentContext> {
    let purchased_at: Option<String> = row.get(6)?;
    Ok(ComponentContext {
        component_id: row.get(0)?,
        notes: row.get(1)?,
        purchase_url: row.get(2)?,
        serial_number: row.get(3)?,
        last_service_notes: row.get(4)?,
        purchase_price: row.get(5)?,
        purchased_at: purchased_at.and_then(|s| parse_timestamp(&s)),
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garage::bike_store::BikeStore;
    use crate::garage::component_store::ComponentStore;
    use crate::garage::types::{Bike, Component, ComponentKind};
    use crate::storage::database::Database;

    fn seed_component(db: &Database) -> i64 {
        let bike_id = BikeStore::new(db.connection())
            .insert(&Bike::new("Bike"))
            .unwrap();
        ComponentStore::new(db.connection())
            .insert(&Component::new(Some(bike_id), ComponentKind::Chain, "Chain", 3_500.0))
            .unwrap()
    }

    #[test]
    fn test_upsert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let component_id = seed_component(&db);
        let store = ContextStore::new(db.connection());

        assert!(store.get(component_id).unwrap().is_none());

        let mut context = ComponentContext::new(component_id, "Waxed, 11-speed");
        context.purchase_url = Some("https://example.com/chain".to_string());
        context.serial_number = Some(" KMC-123 ".to_string());
        context.purchase_price = Some("$32".to_string());
        store.upsert(&context).unwrap();

        let loaded = store.get(component_id).unwrap().unwrap();
        assert_eq!(loaded.notes, "Waxed, 11-speed");
        assert_eq!(loaded.purchase_url.as_deref(), Some("https://example.com/chain"));
        // Optional fields are trimmed on save
        assert_eq!(loaded.serial_number.as_deref(), Some("KMC-123"));

        // Saving again replaces the record
        let replacement = ComponentContext::new(component_id, "Replaced with X11");
        store.upsert(&replacement).unwrap();
        let loaded = store.get(component_id).unwrap().unwrap();
        assert_eq!(loaded.notes, "Replaced with X11");
        assert!(loaded.purchase_url.is_none());
    }

    #[test]
    fn test_blank_notes_rejected() {
        let db = Database::open_in_memory().unwrap();
        let component_id = seed_component(&db);
        let store = ContextStore::new(db.connection());

        let blank = ComponentContext::new(component_id, "   ");
        assert!(matches!(store.upsert(&blank), Err(GarageError::Validation(_))));
        assert!(store.get(component_id).unwrap().is_none());
    }

    #[test]
    fn test_purchase_url_must_be_http() {
        let db = Database::open_in_memory().unwrap();
        let component_id = seed_component(&db);
        let store = ContextStore::new(db.connection());

        let mut context = ComponentContext::new(component_id, "Notes");
        context.purchase_url = Some("not a url".to_string());
        assert!(matches!(store.upsert(&context), Err(GarageError::Validation(_))));

        context.purchase_url = Some("ftp://example.com/file".to_string());
        assert!(matches!(store.upsert(&context), Err(GarageError::Validation(_))));

        // Blank link collapses to None instead of failing validation
        context.purchase_url = Some("  ".to_string());
        let saved = store.upsert(&context).unwrap();
        assert!(saved.purchase_url.is_none());
    }

    #[test]
    fn test_unknown_component_rejected() {
        let db = Database::open_in_memory().unwrap();
        let store = ContextStore::new(db.connection());
        let context = ComponentContext::new(9_999, "Notes");
        assert!(matches!(
            store.upsert(&context),
            Err(GarageError::ComponentNotFound(9_999))
        ));
    }
}
