//! Component persistence and lifecycle.
//!
//! Owns the explicit cascades around components: creating one provisions its
//! default service intervals, deleting one removes its intervals and swap
//! history, and replacement/inspection completions reset the right interval
//! kinds. The chain replacement advisory counter on the owning bike is also
//! maintained here.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::garage::catalog;
use crate::garage::context_store::ContextStore;
use crate::garage::swap_ledger::SwapLedger;
use crate::garage::types::{Component, ComponentKind, Position, CHAIN_REPLACEMENTS_BEFORE_DRIVETRAIN_CHECK};
use crate::garage::GarageError;
use crate::service::interval_store::ServiceIntervalStore;
use crate::service::types::ServiceKind;
use crate::storage::preferences::PreferencesStore;

/// Store for component rows.
pub struct ComponentStore<'a> {
    conn: &'a Connection,
}

const SELECT_COLUMNS: &str = "id, bike_id, kind, name, make_model, lifespan_km,
     distance_used_km, total_time_seconds, avg_speed_kmh, max_speed_kmh,
     max_speed_bike_id, position, alert_threshold_percent,
     alert_snooze_until_km, alert_snooze_until_time, alerts_enabled,
     installed_at, version";

impl<'a> ComponentStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a component, provision its default service intervals, and open
    /// a swap row when it lands directly on a bike. Returns the new id.
    pub fn insert(&self, component: &Component) -> Result<i64, GarageError> {
        validate_component(component)?;
        self.conn.execute(
            "INSERT INTO components
             (bike_id, kind, name, make_model, lifespan_km, distance_used_km,
              total_time_seconds, avg_speed_kmh, max_speed_kmh, max_speed_bike_id,
              position, alert_threshold_percent, alert_snooze_until_km,
              alert_snooze_until_time, alerts_enabled, installed_at, version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, 0)",
            params![
                component.bike_id,
                component.kind.as_str(),
                component.name,
                component.make_model,
                component.lifespan_km,
                component.distance_used_km,
                component.total_time_seconds,
                component.avg_speed_kmh,
                component.max_speed_kmh,
                component.max_speed_bike_id,
                component.position.as_str(),
                component.alert_threshold_percent,
                component.alert_snooze_until_km,
                component.alert_snooze_until_time.map(|t| t.to_rfc3339()),
                component.alerts_enabled,
                component.installed_at.to_rfc3339(),
            ],
        )?;
        let id = self.conn.last_insert_rowid();

        ServiceIntervalStore::new(self.conn).provision_for_component(
            id,
            &component.kind,
            component.lifespan_km,
            component.distance_used_km,
            component.total_time_seconds,
        )?;

        if let Some(bike_id) = component.bike_id {
            SwapLedger::new(self.conn).open(id, bike_id, component.installed_at)?;
        }
        Ok(id)
    }

    /// Get a component by id.
    pub fn get(&self, id: i64) -> Result<Option<Component>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM components WHERE id = ?1");
        self.conn
            .query_row(&sql, params![id], parse_component_row)
            .optional()
            .map_err(GarageError::from)
    }

    /// All components, grouped by bike then name.
    pub fn list(&self) -> Result<Vec<Component>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM components ORDER BY bike_id, name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], parse_component_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(GarageError::from)
    }

    /// Components currently installed on one bike.
    pub fn list_for_bike(&self, bike_id: i64) -> Result<Vec<Component>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM components WHERE bike_id = ?1 ORDER BY name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![bike_id], parse_component_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(GarageError::from)
    }

    /// Shelf stock: components not installed on any bike.
    pub fn list_unassigned(&self) -> Result<Vec<Component>, GarageError> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM components WHERE bike_id IS NULL ORDER BY name");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], parse_component_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(GarageError::from)
    }

    /// Update a component with an optimistic version check. `bike_id` is not
    /// written here; install/uninstall own that transition so the swap ledger
    /// stays consistent.
    pub fn update(&self, component: &Component) -> Result<Component, GarageError> {
        validate_component(component)?;
        let changed = self.conn.execute(
            "UPDATE components SET
             kind = ?1, name = ?2, make_model = ?3, lifespan_km = ?4,
             distance_used_km = ?5, total_time_seconds = ?6, avg_speed_kmh = ?7,
             max_speed_kmh = ?8, max_speed_bike_id = ?9, position = ?10,
             alert_threshold_percent = ?11, alert_snooze_until_km = ?12,
             alert_snooze_until_time = ?13, alerts_enabled = ?14,
             installed_at = ?15, version = version + 1
             WHERE id = ?16 AND version = ?17",
            params![
                component.kind.as_str(),
                component.name,
                component.make_model,
                component.lifespan_km,
                component.distance_used_km,
                component.total_time_seconds,
                component.avg_speed_kmh,
                component.max_speed_kmh,
                component.max_speed_bike_id,
                component.position.as_str(),
                component.alert_threshold_percent,
                component.alert_snooze_until_km,
                component.alert_snooze_until_time.map(|t| t.to_rfc3339()),
                component.alerts_enabled,
                component.installed_at.to_rfc3339(),
                component.id,
                component.version,
            ],
        )?;
        if changed == 0 {
            return match self.get(component.id)? {
                Some(_) => Err(GarageError::Conflict {
                    entity: "component",
                    id: component.id,
                    version: component.version,
                }),
                None => Err(GarageError::ComponentNotFound(component.id)),
            };
        }
        let mut updated = component.clone();
        updated.version += 1;
        Ok(updated)
    }

    /// Delete a component and, explicitly, its service intervals, swap
    /// history, and context record.
    pub fn delete(&self, id: i64) -> Result<bool, GarageError> {
        ServiceIntervalStore::new(self.conn).delete_for_component(id)?;
        SwapLedger::new(self.conn).delete_for_component(id)?;
        ContextStore::new(self.conn).delete_for_component(id)?;
        let deleted = self
            .conn
            .execute("DELETE FROM components WHERE id = ?1", params![id])?;
        if deleted > 0 {
            tracing::info!(component_id = id, "Deleted component and its history");
        }
        Ok(deleted > 0)
    }

    /// Seed the default parts catalog onto a bike that has no components
    /// yet. A bike that already has any component is left alone; use
    /// `seed_missing_defaults` to fill gaps. Seeded parts pick up the
    /// configured default alert threshold.
    pub fn seed_defaults_if_empty(&self, bike_id: i64) -> Result<usize, GarageError> {
        if !self.list_for_bike(bike_id)?.is_empty() {
            return Ok(0);
        }
        let alert_threshold = PreferencesStore::new(self.conn)
            .load()?
            .default_alert_threshold_percent;
        let mut created = 0;
        for part in catalog::default_parts() {
            let component = Component::new(
                Some(bike_id),
                part.kind.clone(),
                part.name,
                part.default_lifespan_km,
            )
            .with_position(part.position)
            .with_alert_threshold(alert_threshold);
            self.insert(&component)?;
            created += 1;
        }
        tracing::info!(bike_id, created, "Seeded default parts");
        Ok(created)
    }

    /// Seed only the catalog entries the bike is missing, keyed on
    /// (kind, position). Safe to call repeatedly; existing parts are kept.
    pub fn seed_missing_defaults(&self, bike_id: i64) -> Result<usize, GarageError> {
        let existing: Vec<(ComponentKind, Position)> = self
            .list_for_bike(bike_id)?
            .into_iter()
            .map(|c| (c.kind, c.position))
            .collect();
        let alert_threshold = PreferencesStore::new(self.conn)
            .load()?
            .default_alert_threshold_percent;

        let mut created = 0;
        for part in catalog::default_parts() {
            if existing.contains(&(part.kind.clone(), part.position)) {
                continue;
            }
            let component = Component::new(
                Some(bike_id),
                part.kind.clone(),
                part.name,
                part.default_lifespan_km,
            )
            .with_position(part.position)
            .with_alert_threshold(alert_threshold);
            self.insert(&component)?;
            created += 1;
        }
        Ok(created)
    }

    /// Move a component onto a bike. Closes any open swap row first, so a
    /// bike-to-bike move needs no explicit uninstall.
    pub fn install(&self, component_id: i64, bike_id: i64, at: DateTime<Utc>) -> Result<(), GarageError> {
        let component = self
            .get(component_id)?
            .ok_or(GarageError::ComponentNotFound(component_id))?;
        let ledger = SwapLedger::new(self.conn);
        if component.bike_id.is_some() {
            ledger.close(component_id, at)?;
        }
        self.conn.execute(
            "UPDATE components SET bike_id = ?1, installed_at = ?2, version = version + 1
             WHERE id = ?3",
            params![bike_id, at.to_rfc3339(), component_id],
        )?;
        ledger.open(component_id, bike_id, at)?;
        Ok(())
    }

    /// Take a component off its bike and put it on the shelf. Usage is kept;
    /// wear carries across installs.
    pub fn uninstall(&self, component_id: i64, at: DateTime<Utc>) -> Result<(), GarageError> {
        let component = self
            .get(component_id)?
            .ok_or(GarageError::ComponentNotFound(component_id))?;
        if component.bike_id.is_none() {
            return Ok(());
        }
        SwapLedger::new(self.conn).close(component_id, at)?;
        self.conn.execute(
            "UPDATE components SET bike_id = NULL, version = version + 1 WHERE id = ?1",
            params![component_id],
        )?;
        Ok(())
    }

    /// Record a physical replacement: usage zeroes out, the install
    /// timestamp resets, snoozes clear, and every service interval starts
    /// over. The avg/max speed record survives; the average is recomputed
    /// from the fresh totals on the next ride. The bike's chain replacement
    /// counter is bumped for a chain and reset when the rest of the
    /// drivetrain is renewed.
    pub fn mark_replaced(&self, component_id: i64, at: DateTime<Utc>) -> Result<(), GarageError> {
        let component = self
            .get(component_id)?
            .ok_or(GarageError::ComponentNotFound(component_id))?;

        self.conn.execute(
            "UPDATE components SET
             distance_used_km = 0, total_time_seconds = 0,
             alert_snooze_until_km = NULL, alert_snooze_until_time = NULL,
             installed_at = ?1, version = version + 1
             WHERE id = ?2",
            params![at.to_rfc3339(), component_id],
        )?;
        ServiceIntervalStore::new(self.conn).reset_kinds(
            component_id,
            &[
                ServiceKind::Replace,
                ServiceKind::Inspection,
                ServiceKind::Grease,
                ServiceKind::OnFailure,
            ],
        )?;

        if let Some(bike_id) = component.bike_id {
            match component.kind {
                ComponentKind::Chain => {
                    self.conn.execute(
                        "UPDATE bikes SET chain_replacement_count = chain_replacement_count + 1,
                         version = version + 1 WHERE id = ?1",
                        params![bike_id],
                    )?;
                    let count: i32 = self.conn.query_row(
                        "SELECT chain_replacement_count FROM bikes WHERE id = ?1",
                        params![bike_id],
                        |row| row.get(0),
                    )?;
                    if count >= CHAIN_REPLACEMENTS_BEFORE_DRIVETRAIN_CHECK {
                        tracing::info!(
                            bike_id,
                            count,
                            "Drivetrain check recommended after repeated chain replacements"
                        );
                    }
                }
                ComponentKind::Cassette | ComponentKind::Freewheel | ComponentKind::Chainring => {
                    self.conn.execute(
                        "UPDATE bikes SET chain_replacement_count = 0, version = version + 1
                         WHERE id = ?1",
                        params![bike_id],
                    )?;
                }
                _ => {}
            }
        }
        tracing::debug!(component_id, "Marked component replaced");
        Ok(())
    }

    /// Record a completed inspection or grease service: only those interval
    /// kinds reset. Component usage and replacement clocks keep running.
    pub fn mark_inspection_complete(&self, component_id: i64) -> Result<(), GarageError> {
        if self.get(component_id)?.is_none() {
            return Err(GarageError::ComponentNotFound(component_id));
        }
        ServiceIntervalStore::new(self.conn)
            .reset_kinds(component_id, &[ServiceKind::Inspection, ServiceKind::Grease])?;
        Ok(())
    }

    /// Manual usage correction. Intervals advance to the corrected values;
    /// `reset_speeds` also clears the avg/max speed records, which cannot be
    /// recomputed from an edited total.
    pub fn update_usage(
        &self,
        component_id: i64,
        distance_used_km: f64,
        total_time_seconds: i64,
        reset_speeds: bool,
    ) -> Result<(), GarageError> {
        if distance_used_km < 0.0 || total_time_seconds < 0 {
            return Err(GarageError::Validation(
                "Usage values cannot be negative".to_string(),
            ));
        }
        let changed = if reset_speeds {
            self.conn.execute(
                "UPDATE components SET distance_used_km = ?1, total_time_seconds = ?2,
                 avg_speed_kmh = 0, max_speed_kmh = 0, max_speed_bike_id = NULL,
                 version = version + 1 WHERE id = ?3",
                params![distance_used_km, total_time_seconds, component_id],
            )?
        } else {
            self.conn.execute(
                "UPDATE components SET distance_used_km = ?1, total_time_seconds = ?2,
                 version = version + 1 WHERE id = ?3",
                params![distance_used_km, total_time_seconds, component_id],
            )?
        };
        if changed == 0 {
            return Err(GarageError::ComponentNotFound(component_id));
        }
        ServiceIntervalStore::new(self.conn).advance(
            component_id,
            distance_used_km,
            total_time_seconds,
        )?;
        Ok(())
    }

    /// Snooze alerts until the component has covered `until_km` total, or
    /// until a wall-clock instant, or both. `None` clears that bound.
    pub fn set_snooze(
        &self,
        component_id: i64,
        until_km: Option<f64>,
        until_time: Option<DateTime<Utc>>,
    ) -> Result<(), GarageError> {
        let changed = self.conn.execute(
            "UPDATE components SET alert_snooze_until_km = ?1, alert_snooze_until_time = ?2,
             version = version + 1 WHERE id = ?3",
            params![until_km, until_time.map(|t| t.to_rfc3339()), component_id],
        )?;
        if changed == 0 {
            return Err(GarageError::ComponentNotFound(component_id));
        }
        Ok(())
    }
}

fn validate_component(component: &Component) -> Result<(), GarageError> {
    if component.name.trim().is_empty() {
        return Err(GarageError::Validation("Name is required".to_string()));
    }
    if component.lifespan_km < 0.0 {
        return Err(GarageError::Validation(
            "Lifespan cannot be negative".to_string(),
        ));
    }
    if !(1..=100).contains(&component.alert_threshold_percent) {
        return Err(GarageError::Validation(
            "Alert threshold must be between 1 and 100".to_string(),
        ));
    }
    Ok(())
}

/// Parse a database row into a Component.
fn parse_component_row(row: &rusqlite::Row) -> rusqlite::Result<Component> {
    let kind_str: String = row.get(2)?;
    let position_str: String = row.get(11)?;
    let snooze_time: Option<String> = row.get(14)?;
    let installed_at: String = row.get(16)?;
    Ok(Component {
        id: row.get(0)?,
        bike_id: row.get(1)?,
        kind: ComponentKind::parse(&kind_str),
        name: row.get(3)?,
        make_model: row.get(4)?,
        lifespan_km: row.get(5)?,
        distance_used_km: row.get(6)?,
        total_time_seconds: row.get(7)?,
        avg_speed_kmh: row.get(8)?,
        max_speed_kmh: row.get(9)?,
        max_speed_bike_id: row.get(10)?,
        position: Position::parse(&position_str),
        alert_threshold_percent: row.get(12)?,
        alert_snooze_until_km: row.get(13)?,
        alert_snooze_until_time: snooze_time.and_then(|s| parse_timestamp(&s)),
        alerts_enabled: row.get(15)?,
        installed_at: parse_timestamp(&installed_at).unwrap_or_else(Utc::now),
        version: row.get(17)?,
    })
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}
