//! Bike persistence and roll-up bookkeeping.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::garage::types::Bike;
use crate::garage::GarageError;

/// Store for bike rows.
pub struct BikeStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "id, name, make, model, year, description,
     total_distance_km, total_time_seconds, avg_speed_kmh, max_speed_kmh,
     total_elev_gain_m, total_elev_loss_m, last_ride_at,
     chain_replacement_count, created_at, version";

impl<'a> BikeStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a bike and return its id.
    pub fn insert(&self, bike: &Bike) -> Result<i64, GarageError> {
        self.conn.execute(
            "INSERT INTO bikes
             (name, make, model, year, description, total_distance_km,
              total_time_seconds, avg_speed_kmh, max_speed_kmh,
              total_elev_gain_m, total_elev_loss_m, last_ride_at,
              chain_replacement_count, created_at, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, 0)",
            params![
                bike.name,
                bike.make,
                bike.model,
                bike.year,
                bike.description,
                bike.total_distance_km,
                bike.total_time_seconds,
                bike.avg_speed_kmh,
                bike.max_speed_kmh,
                bike.total_elev_gain_m,
                bike.total_elev_loss_m,
                bike.last_ride_at.map(|t| t.to_rfc3339()),
                bike.chain_replacement_count,
                bike.created_at.to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get a bike by id.
    pub fn get(&self, id: i64) -> Result<Option<Bike>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM bikes WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], parse_bike_row)
            .optional()
            .map_err(GarageError::from)
    }

    /// All bikes, newest first.
    pub fn list(&self) -> Result<Vec<Bike>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM bikes ORDER BY created_at DESC");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], parse_bike_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(GarageError::from)
    }

    /// The bike with the most recent completed ride, if any has one.
    pub fn most_recently_ridden(&self) -> Result<Option<Bike>, GarageError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM bikes
             WHERE last_ride_at IS NOT NULL
             ORDER BY last_ride_at DESC LIMIT 1"
        );
        self.conn
            .query_row(&sql, [], parse_bike_row)
            .optional()
            .map_err(GarageError::from)
    }

    /// Update a bike with an optimistic version check. The caller's copy must
    /// carry the version it read; a stale version yields `Conflict` and the
    /// caller retries with fresh data.
    pub fn update(&self, bike: &Bike) -> Result<Bike, GarageError> {
        let changed = self.conn.execute(
            "UPDATE bikes SET
             name = ?1, make = ?2, model = ?3, year = ?4, description = ?5,
             total_distance_km = ?6, total_time_seconds = ?7,
             avg_speed_kmh = ?8, max_speed_kmh = ?9,
             total_elev_gain_m = ?10, total_elev_loss_m = ?11,
             last_ride_at = ?12, chain_replacement_count = ?13,
             version = version + 1
             WHERE id = ?14 AND version = ?15",
            params![
                bike.name,
                bike.make,
                bike.model,
                bike.year,
                bike.description,
                bike.total_distance_km,
                bike.total_time_seconds,
                bike.avg_speed_kmh,
                bike.max_speed_kmh,
                bike.total_elev_gain_m,
                bike.total_elev_loss_m,
                bike.last_ride_at.map(|t| t.to_rfc3339()),
                bike.chain_replacement_count,
                bike.id,
                bike.version,
            ],
        )?;
        if changed == 0 {
            return match self.get(bike.id)? {
                Some(_) => Err(GarageError::Conflict {
                    entity: "bike",
                    id: bike.id,
                    version: bike.version,
                }),
                None => Err(GarageError::BikeNotFound(bike.id)),
            };
        }
        let mut updated = bike.clone();
        updated.version += 1;
        Ok(updated)
    }

    /// Delete a bike. Components and rides are detached, not deleted; the
    /// bike's swap history goes with it. Cascades run in the store because
    /// the persistence layer is not trusted to do them.
    pub fn delete(&self, id: i64) -> Result<bool, GarageError> {
        self.conn.execute(
            "UPDATE components SET bike_id = NULL, version = version + 1 WHERE bike_id = ?1",
            params![id],
        )?;
        self.conn
            .execute("UPDATE rides SET bike_id = NULL WHERE bike_id = ?1", params![id])?;
        self.conn
            .execute("DELETE FROM component_swaps WHERE bike_id = ?1", params![id])?;
        let deleted = self
            .conn
            .execute("DELETE FROM bikes WHERE id = ?1", params![id])?;
        if deleted > 0 {
            tracing::info!(bike_id = id, "Deleted bike and detached its parts");
        }
        Ok(deleted > 0)
    }

    /// Manual override for the chain replacement advisory counter.
    pub fn reset_chain_replacement_count(&self, id: i64) -> Result<(), GarageError> {
        let changed = self.conn.execute(
            "UPDATE bikes SET chain_replacement_count = 0, version = version + 1 WHERE id = ?1",
            params![id],
        )?;
        if changed == 0 {
            return Err(GarageError::BikeNotFound(id));
        }
        Ok(())
    }
}

/// Parse a database row into a Bike.
fn parse_bike_row(row: &rusqlite::Row) -> rusqlite::Result<Bike> {
    let last_ride_at: Option<String> = row.get(12)?;
    let created_at: String = row.get(14)?;
    Ok(Bike {
        id: row.get(0)?,
        name: row.get(1)?,
        make: row.get(2)?,
        model: row.get(3)?,
        year: row.get(4)?,
        description: row.get(5)?,
        total_distance_km: row.get(6)?,
        total_time_seconds: row.get(7)?,
        avg_speed_kmh: row.get(8)?,
        max_speed_kmh: row.get(9)?,
        total_elev_gain_m: row.get(10)?,
        total_elev_loss_m: row.get(11)?,
        last_ride_at: last_ride_at.and_then(|s| parse_timestamp(&s)),
        chain_replacement_count: row.get(13)?,
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
        version: row.get(15)?,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}
