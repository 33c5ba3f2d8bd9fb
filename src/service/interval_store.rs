//! Service interval persistence and lifecycle.

use rusqlite::{params, Connection, OptionalExtension};

use crate::garage::types::ComponentKind;
use crate::service::catalog;
use crate::service::types::{ServiceInterval, ServiceKind};
use crate::service::ServiceError;

/// Store for service interval rows.
pub struct ServiceIntervalStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "id, component_id, name, interval_km, tracked_km, kind,
     interval_time_seconds, tracked_time_seconds";

impl<'a> ServiceIntervalStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert an interval and return its id.
    pub fn insert(&self, interval: &ServiceInterval) -> Result<i64, ServiceError> {
        self.conn.execute(
            "INSERT INTO service_intervals
             (component_id, name, interval_km, tracked_km, kind,
              interval_time_seconds, tracked_time_seconds)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                interval.component_id,
                interval.name,
                interval.interval_km,
                interval.tracked_km,
                interval.kind.as_str(),
                interval.interval_time_seconds,
                interval.tracked_time_seconds,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Get an interval by id.
    pub fn get(&self, id: i64) -> Result<Option<ServiceInterval>, ServiceError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM service_intervals WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], parse_interval_row)
            .optional()
            .map_err(ServiceError::from)
    }

    /// All intervals of one component, catalog insertion order.
    pub fn list_for_component(&self, component_id: i64) -> Result<Vec<ServiceInterval>, ServiceError> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM service_intervals WHERE component_id = ?1 ORDER BY id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![component_id], parse_interval_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(ServiceError::from)
    }

    /// All intervals across every component, for list-level views.
    pub fn list_all(&self) -> Result<Vec<ServiceInterval>, ServiceError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM service_intervals ORDER BY component_id, id");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], parse_interval_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(ServiceError::from)
    }

    /// Update an interval row.
    pub fn update(&self, interval: &ServiceInterval) -> Result<(), ServiceError> {
        let changed = self.conn.execute(
            "UPDATE service_intervals SET
             name = ?1, interval_km = ?2, tracked_km = ?3, kind = ?4,
             interval_time_seconds = ?5, tracked_time_seconds = ?6
             WHERE id = ?7",
            params![
                interval.name,
                interval.interval_km,
                interval.tracked_km,
                interval.kind.as_str(),
                interval.interval_time_seconds,
                interval.tracked_time_seconds,
                interval.id,
            ],
        )?;
        if changed == 0 {
            return Err(ServiceError::IntervalNotFound(interval.id));
        }
        Ok(())
    }

    /// Delete an interval. Returns whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool, ServiceError> {
        let deleted = self
            .conn
            .execute("DELETE FROM service_intervals WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Delete all intervals of a component (explicit cascade from component delete).
    pub fn delete_for_component(&self, component_id: i64) -> Result<usize, ServiceError> {
        self.conn
            .execute(
                "DELETE FROM service_intervals WHERE component_id = ?1",
                params![component_id],
            )
            .map_err(ServiceError::from)
    }

    /// Provision default intervals for a freshly created component.
    ///
    /// Uses the per-kind catalog when it has entries (skipping on-failure
    /// specs), otherwise creates a single "Max life" Replace interval from
    /// `lifespan_km`. Tracked values seed from the component's current usage;
    /// time is seeded only on time-tracked specs. Call once per component;
    /// calling again without clearing existing intervals duplicates them.
    pub fn provision_for_component(
        &self,
        component_id: i64,
        kind: &ComponentKind,
        lifespan_km: f64,
        initial_distance_km: f64,
        initial_time_seconds: i64,
    ) -> Result<usize, ServiceError> {
        let specs = catalog::specs_for_kind(kind);
        if specs.is_empty() {
            let mut fallback =
                ServiceInterval::new(component_id, "Max life", lifespan_km, ServiceKind::Replace);
            fallback.tracked_km = initial_distance_km;
            self.insert(&fallback)?;
            return Ok(1);
        }

        let mut created = 0;
        for spec in specs
            .iter()
            .filter(|s| s.service_kind != ServiceKind::OnFailure)
        {
            let interval = ServiceInterval {
                id: 0,
                component_id,
                name: spec.service_name.to_string(),
                interval_km: spec.interval_km,
                tracked_km: initial_distance_km,
                kind: spec.service_kind,
                interval_time_seconds: spec.interval_time_seconds,
                tracked_time_seconds: spec
                    .interval_time_seconds
                    .map(|_| initial_time_seconds),
            };
            self.insert(&interval)?;
            created += 1;
        }
        Ok(created)
    }

    /// Advance every interval of a component to the component's new
    /// cumulative usage. Time accrues only on time-tracked intervals.
    pub fn advance(
        &self,
        component_id: i64,
        new_distance_km: f64,
        new_time_seconds: i64,
    ) -> Result<usize, ServiceError> {
        self.conn
            .execute(
                "UPDATE service_intervals SET
                 tracked_km = ?1,
                 tracked_time_seconds = CASE
                     WHEN interval_time_seconds IS NOT NULL THEN ?2
                     ELSE tracked_time_seconds
                 END
                 WHERE component_id = ?3",
                params![new_distance_km, new_time_seconds, component_id],
            )
            .map_err(ServiceError::from)
    }

    /// Zero tracked values for intervals of the given kinds. Used by "mark
    /// inspection complete" (inspection + grease) and by full replacement
    /// (all kinds).
    pub fn reset_kinds(
        &self,
        component_id: i64,
        kinds: &[ServiceKind],
    ) -> Result<usize, ServiceError> {
        if kinds.is_empty() {
            return Ok(0);
        }
        let placeholders = (0..kinds.len())
            .map(|i| format!("?{}", i + 2))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE service_intervals SET
             tracked_km = 0,
             tracked_time_seconds = CASE
                 WHEN interval_time_seconds IS NOT NULL THEN 0
                 ELSE tracked_time_seconds
             END
             WHERE component_id = ?1 AND kind IN ({placeholders})"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(component_id)];
        for kind in kinds {
            values.push(Box::new(kind.as_str().to_string()));
        }
        let refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|v| v.as_ref()).collect();
        stmt.execute(refs.as_slice()).map_err(ServiceError::from)
    }
}

/// Parse a database row into a ServiceInterval.
fn parse_interval_row(row: &rusqlite::Row) -> rusqlite::Result<ServiceInterval> {
    let kind_str: String = row.get(5)?;
    Ok(ServiceInterval {
        id: row.get(0)?,
        component_id: row.get(1)?,
        name: row.get(2)?,
        interval_km: row.get(3)?,
        tracked_km: row.get(4)?,
        kind: ServiceKind::parse(&kind_str),
        interval_time_seconds: row.get(6)?,
        tracked_time_seconds: row.get(7)?,
    })
}
