//! Ride persistence.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::rides::types::{Ride, RideSource};
use crate::rides::RideError;

/// Store for ride rows.
pub struct RideStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "id, bike_id, distance_km, duration_ms, avg_speed_kmh,
     max_speed_kmh, elev_gain_m, elev_loss_m, started_at, ended_at, source";

impl<'a> RideStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a ride. Fails if the ride id was already recorded.
    pub fn insert(&self, ride: &Ride) -> Result<(), RideError> {
        self.conn.execute(
            "INSERT INTO rides
             (id, bike_id, distance_km, duration_ms, avg_speed_kmh, max_speed_kmh,
              elev_gain_m, elev_loss_m, started_at, ended_at, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                ride.id.to_string(),
                ride.bike_id,
                ride.distance_km,
                ride.duration_ms,
                ride.avg_speed_kmh,
                ride.max_speed_kmh,
                ride.elev_gain_m,
                ride.elev_loss_m,
                ride.started_at.to_rfc3339(),
                ride.ended_at.to_rfc3339(),
                ride.source.as_str(),
            ],
        )?;
        Ok(())
    }

    /// Whether a ride id has already been recorded.
    pub fn exists(&self, id: &Uuid) -> Result<bool, RideError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM rides WHERE id = ?1",
            params![id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Get a ride by id.
    pub fn get(&self, id: &Uuid) -> Result<Option<Ride>, RideError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM rides WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id.to_string()], parse_ride_row)
            .optional()
            .map_err(RideError::from)
    }

    /// All rides, newest first.
    pub fn list(&self) -> Result<Vec<Ride>, RideError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM rides ORDER BY started_at DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], parse_ride_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RideError::from)
    }

    /// Rides on one bike, newest first.
    pub fn list_for_bike(&self, bike_id: i64) -> Result<Vec<Ride>, RideError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM rides WHERE bike_id = ?1 ORDER BY started_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![bike_id], parse_ride_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(RideError::from)
    }

    /// Delete a ride row. Roll-ups are not unwound; deleting a ride is a
    /// record correction, not an undo of its aggregation.
    pub fn delete(&self, id: &Uuid) -> Result<bool, RideError> {
        let deleted = self
            .conn
            .execute("DELETE FROM rides WHERE id = ?1", params![id.to_string()])?;
        Ok(deleted > 0)
    }
}

fn parse_ride_row(row: &rusqlite::Row) -> rusqlite::Result<Ride> {
    let id_str: String = row.get(0)?;
    let started_at: String = row.get(8)?;
    let ended_at: String = row.get(9)?;
    let source_str: String = row.get(10)?;
    Ok(Ride {
        id: Uuid::parse_str(&id_str).unwrap_or_else(|_| Uuid::nil()),
        bike_id: row.get(1)?,
        distance_km: row.get(2)?,
        duration_ms: row.get(3)?,
        avg_speed_kmh: row.get(4)?,
        max_speed_kmh: row.get(5)?,
        elev_gain_m: row.get(6)?,
        elev_loss_m: row.get(7)?,
        started_at: parse_timestamp(&started_at).unwrap_or_else(Utc::now),
        ended_at: parse_timestamp(&ended_at).unwrap_or_else(Utc::now),
        source: RideSource::parse(&source_str),
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

    #[test]
    fn test_insert_and_get() {
        let db = Database::open_in_memory().unwrap();
        let store = RideStore::new(db.connection());
        let mut ride = Ride::new(None, Utc::now(), Utc::now());
        ride.distance_km = 25.4;
        ride.duration_ms = 3_600_000;
        store.insert(&ride).unwrap();

        let loaded = store.get(&ride.id).unwrap().unwrap();
        assert_eq!(loaded.distance_km, 25.4);
        assert_eq!(loaded.source, RideSource::App);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let db = Database::open_in_memory().unwrap();
        let store = RideStore::new(db.connection());
        let ride = Ride::new(None, Utc::now(), Utc::now());
        store.insert(&ride).unwrap();
        assert!(store.exists(&ride.id).unwrap());
        assert!(store.insert(&ride).is_err());
    }

    #[test]
    fn test_list_for_bike_filters() {
        let db = Database::open_in_memory().unwrap();
        db.connection()
            .execute(
                "INSERT INTO bikes (name, created_at) VALUES ('A', datetime('now'))",
                [],
            )
            .unwrap();
        let bike_id = db.connection().last_insert_rowid();
        let store = RideStore::new(db.connection());
        store.insert(&Ride::new(Some(bike_id), Utc::now(), Utc::now())).unwrap();
        store.insert(&Ride::new(None, Utc::now(), Utc::now())).unwrap();

        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.list_for_bike(bike_id).unwrap().len(), 1);
    }
}
