//! Append-only install/uninstall history for components.
//!
//! Every install opens a swap row; moving or shelving the component closes
//! the open row with an uninstall timestamp. The ledger is how "which bike
//! wore this part when" stays answerable after the part moves on.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::garage::types::ComponentSwap;
use crate::garage::GarageError;

pub struct SwapLedger<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "id, component_id, bike_id, installed_at, uninstalled_at";

impl<'a> SwapLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Open a swap row for a component installed on a bike.
    pub fn open(
        &self,
        component_id: i64,
        bike_id: i64,
        installed_at: DateTime<Utc>,
    ) -> Result<i64, GarageError> {
        self.conn.execute(
            "INSERT INTO component_swaps (component_id, bike_id, installed_at, uninstalled_at)
             VALUES (?1, ?2, ?3, NULL)",
            params![component_id, bike_id, installed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Close the component's open swap row, if it has one. Returns whether a
    /// row was closed.
    pub fn close(&self, component_id: i64, uninstalled_at: DateTime<Utc>) -> Result<bool, GarageError> {
        let changed = self.conn.execute(
            "UPDATE component_swaps SET uninstalled_at = ?1
             WHERE component_id = ?2 AND uninstalled_at IS NULL",
            params![uninstalled_at.to_rfc3339(), component_id],
        )?;
        Ok(changed > 0)
    }

    /// The component's open swap row, if it is currently installed.
    pub fn current(&self, component_id: i64) -> Result<Option<ComponentSwap>, GarageError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM component_swaps
             WHERE component_id = ?1 AND uninstalled_at IS NULL
             ORDER BY installed_at DESC LIMIT 1"
        );
        self.conn
            .query_row(&sql, params![component_id], parse_swap_row)
            .optional()
            .map_err(GarageError::from)
    }

    /// Full history for a component, newest install first.
    pub fn history_for_component(&self, component_id: i64) -> Result<Vec<ComponentSwap>, GarageError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM component_swaps
             WHERE component_id = ?1 ORDER BY installed_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![component_id], parse_swap_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(GarageError::from)
    }

    /// History of everything that was ever on a bike, newest install first.
    pub fn history_for_bike(&self, bike_id: i64) -> Result<Vec<ComponentSwap>, GarageError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM component_swaps
             WHERE bike_id = ?1 ORDER BY installed_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![bike_id], parse_swap_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(GarageError::from)
    }

    /// Remove a component's entire history. Runs as part of component
    /// deletion; not exposed as a standalone operation.
    pub fn delete_for_component(&self, component_id: i64) -> Result<usize, GarageError> {
        let deleted = self.conn.execute(
            "DELETE FROM component_swaps WHERE component_id = ?1",
            params![component_id],
        )?;
        Ok(deleted)
    }
}

fn parse_swap_row(row: &rusqlite::Row) -> rusqlite::Result<ComponentSwap> {
    let installed_at: String = row.get(3)?;
    let uninstalled_at: Option<String> = row.get(4)?;
    Ok(ComponentSwap {
        id: row.get(0)?,
        component_id: row.get(1)?,
        bike_id: row.get(2)?,
        installed_at: parse_timestamp(&installed_at).unwrap_or_else(Utc::now),
        uninstalled_at: uninstalled_at.and_then(|s| parse_timestamp(&s)),
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
    use crate::storage::database::Database;

    fn seed_bike(conn: &Connection, name: &str) -> i64 {
        conn.execute(
            "INSERT INTO bikes (name, created_at) VALUES (?1, datetime('now'))",
            params![name],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn seed_component(conn: &Connection) -> i64 {
        conn.execute(
            "INSERT INTO components (kind, name, lifespan_km, installed_at)
             VALUES ('chain', 'Chain', 3500, datetime('now'))",
            [],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    #[test]
    fn test_open_and_current() {
        let db = Database::open_in_memory().unwrap();
        let ledger = SwapLedger::new(db.connection());
        let bike_id = seed_bike(db.connection(), "Roadie");
        let component_id = seed_component(db.connection());

        assert!(ledger.current(component_id).unwrap().is_none());
        ledger.open(component_id, bike_id, Utc::now()).unwrap();

        let current = ledger.current(component_id).unwrap().unwrap();
        assert_eq!(current.bike_id, bike_id);
        assert!(current.uninstalled_at.is_none());
    }

    #[test]
    fn test_close_then_reopen_keeps_history() {
        let db = Database::open_in_memory().unwrap();
        let ledger = SwapLedger::new(db.connection());
        let first_bike = seed_bike(db.connection(), "First");
        let second_bike = seed_bike(db.connection(), "Second");
        let component_id = seed_component(db.connection());

        let t0 = Utc::now() - chrono::Duration::days(30);
        ledger.open(component_id, first_bike, t0).unwrap();
        assert!(ledger.close(component_id, Utc::now()).unwrap());
        ledger.open(component_id, second_bike, Utc::now()).unwrap();

        let history = ledger.history_for_component(component_id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].bike_id, second_bike);
        assert!(history[0].uninstalled_at.is_none());
        assert_eq!(history[1].bike_id, first_bike);
        assert!(history[1].uninstalled_at.is_some());
    }

    #[test]
    fn test_close_without_open_row_is_noop() {
        let db = Database::open_in_memory().unwrap();
        let ledger = SwapLedger::new(db.connection());
        let component_id = seed_component(db.connection());
        assert!(!ledger.close(component_id, Utc::now()).unwrap());
    }

    #[test]
    fn test_delete_for_component() {
        let db = Database::open_in_memory().unwrap();
        let ledger = SwapLedger::new(db.connection());
        let bike_id = seed_bike(db.connection(), "Roadie");
        let component_id = seed_component(db.connection());

        ledger.open(component_id, bike_id, Utc::now()).unwrap();
        ledger.close(component_id, Utc::now()).unwrap();
        ledger.open(component_id, bike_id, Utc::now()).unwrap();

        assert_eq!(ledger.delete_for_component(component_id).unwrap(), 2);
        assert!(ledger.history_for_component(component_id).unwrap().is_empty());
    }
}
