//! Due-list planning: which components need attention, and bulk actions on
//! the selection.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

use crate::format;
use crate::garage::bike_store::BikeStore;
use crate::garage::component_store::ComponentStore;
use crate::garage::types::{Component, ComponentKind};
use crate::garage::GarageError;
use crate::service::interval_store::ServiceIntervalStore;
use crate::service::types::ServiceInterval;
use crate::service::wear;
use crate::service::ServiceError;
use crate::storage::preferences::{PreferencesError, PreferencesStore};

/// Narrowing options for the due list. All of them default to "everything".
#[derive(Debug, Clone, Default)]
pub struct DueListFilter {
    /// Only components installed on this bike.
    pub bike_id: Option<i64>,
    /// Only components of this kind.
    pub kind: Option<ComponentKind>,
    /// Case-insensitive substring match on the component name.
    pub search: Option<String>,
}

/// Due-list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Kind then name, case-insensitive.
    TypeAz,
    /// Most urgent service interval first.
    NextService,
    /// Lowest overall health first.
    #[default]
    Health,
}

/// One due-list row.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DueItem {
    pub component: Component,
    /// Overall urgency: component lifespan health or most urgent interval,
    /// whichever is lower.
    pub health_percent: i32,
    /// Health across intervals only, for NextService ordering.
    pub interval_health_percent: i32,
    /// Most urgent interval's name and countdown, when it has intervals.
    pub next_service: Option<String>,
}

/// Result of a bulk action. Failures do not stop the rest of the selection.
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub completed: usize,
    pub failures: Vec<(i64, String)>,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Garage error: {0}")]
    Garage(#[from] GarageError),

    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    #[error("Bike not found: {0}")]
    BikeNotFound(i64),
}

/// Builds due lists and runs bulk service actions.
pub struct DueListPlanner<'a> {
    conn: &'a Connection,
}

impl<'a> DueListPlanner<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Components whose health is at or below the close-to-service
    /// threshold, filtered and sorted as requested.
    pub fn build_due_list(
        &self,
        filter: &DueListFilter,
        sort: SortOrder,
    ) -> Result<Vec<DueItem>, PlannerError> {
        let threshold = PreferencesStore::new(self.conn)
            .load()?
            .close_to_service_threshold;

        let components = ComponentStore::new(self.conn);
        let candidates = match filter.bike_id {
            Some(bike_id) => components.list_for_bike(bike_id)?,
            None => components.list()?,
        };

        let intervals = ServiceIntervalStore::new(self.conn);
        let mut items = Vec::new();
        for component in candidates {
            if let Some(kind) = &filter.kind {
                if &component.kind != kind {
                    continue;
                }
            }
            if let Some(search) = &filter.search {
                if !component
                    .name
                    .to_lowercase()
                    .contains(&search.to_lowercase())
                {
                    continue;
                }
            }

            let component_intervals = intervals.list_for_component(component.id)?;
            let health = wear::min_health(&component, &component_intervals);
            if health > threshold {
                continue;
            }
            items.push(DueItem {
                health_percent: health,
                interval_health_percent: wear::min_interval_health(&component_intervals),
                next_service: most_urgent_description(&component_intervals),
                component,
            });
        }

        match sort {
            SortOrder::TypeAz => items.sort_by(|a, b| {
                let left = (
                    a.component.kind.as_str().to_lowercase(),
                    a.component.name.to_lowercase(),
                );
                let right = (
                    b.component.kind.as_str().to_lowercase(),
                    b.component.name.to_lowercase(),
                );
                left.cmp(&right)
            }),
            SortOrder::NextService => {
                items.sort_by_key(|item| item.interval_health_percent)
            }
            SortOrder::Health => items.sort_by_key(|item| item.health_percent),
        }
        Ok(items)
    }

    /// Mark every selected component replaced. Per-item failures are
    /// collected, not fatal; the rest of the selection still runs.
    pub fn replace_selected(
        &self,
        component_ids: &[i64],
        at: DateTime<Utc>,
    ) -> Result<BulkOutcome, PlannerError> {
        let components = ComponentStore::new(self.conn);
        let mut outcome = BulkOutcome::default();
        for &id in component_ids {
            match components.mark_replaced(id, at) {
                Ok(()) => outcome.completed += 1,
                Err(e) => {
                    tracing::warn!(component_id = id, error = %e, "Bulk replace skipped item");
                    outcome.failures.push((id, e.to_string()));
                }
            }
        }
        Ok(outcome)
    }

    /// Mark every selected component's inspections complete.
    pub fn inspect_selected(&self, component_ids: &[i64]) -> Result<BulkOutcome, PlannerError> {
        let components = ComponentStore::new(self.conn);
        let mut outcome = BulkOutcome::default();
        for &id in component_ids {
            match components.mark_inspection_complete(id) {
                Ok(()) => outcome.completed += 1,
                Err(e) => {
                    tracing::warn!(component_id = id, error = %e, "Bulk inspect skipped item");
                    outcome.failures.push((id, e.to_string()));
                }
            }
        }
        Ok(outcome)
    }

    /// Plain-text summary of one bike's state, for export and for pasting
    /// into outside tools.
    pub fn health_summary(&self, bike_id: i64) -> Result<String, PlannerError> {
        let bike = BikeStore::new(self.conn)
            .get(bike_id)?
            .ok_or(PlannerError::BikeNotFound(bike_id))?;
        let components = ComponentStore::new(self.conn).list_for_bike(bike_id)?;
        let intervals = ServiceIntervalStore::new(self.conn);

        let mut out = String::new();
        out.push_str(&format!("Bike: {}\n", bike.name));
        out.push_str(&format!(
            "Totals: {:.1} km, {} ride time, avg {:.1} km/h, max {:.1} km/h\n",
            bike.total_distance_km,
            format::format_duration_seconds(bike.total_time_seconds),
            bike.avg_speed_kmh,
            bike.max_speed_kmh,
        ));
        if bike.recommends_drivetrain_check() {
            out.push_str(&format!(
                "Note: {} chain replacements since the last drivetrain renewal; check cassette and chainrings for wear\n",
                bike.chain_replacement_count
            ));
        }
        out.push_str(&format!("Components ({}):\n", components.len()));
        for component in &components {
            let component_intervals = intervals.list_for_component(component.id)?;
            out.push_str(&format!(
                "- {} ({}): {}% health, {:.0} of {:.0} km used\n",
                component.name,
                component.kind,
                wear::min_health(component, &component_intervals),
                component.distance_used_km,
                component.lifespan_km,
            ));
            for interval in &component_intervals {
                out.push_str(&format!(
                    "    {}: {}\n",
                    interval.name,
                    format::interval_description(interval)
                ));
            }
        }
        Ok(out)
    }
}

fn most_urgent_description(intervals: &[ServiceInterval]) -> Option<String> {
    intervals
        .iter()
        .min_by_key(|i| wear::interval_health_percent(i))
        .map(|i| format!("{}: {}", i.name, format::interval_description(i)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garage::types::Bike;
    use crate::storage::database::Database;

    fn setup() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let bike_id = BikeStore::new(db.connection()).insert(&Bike::new("B")).unwrap();
        (db, bike_id)
    }

    fn part(bike_id: i64, kind: ComponentKind, name: &str, lifespan: f64, used: f64) -> Component {
        let mut c = Component::new(Some(bike_id), kind, name, lifespan);
        c.distance_used_km = used;
        c
    }

    fn insert_bare(db: &Database, component: &Component) -> i64 {
        // Insert without catalog intervals so lifespan health drives the list
        let store = ComponentStore::new(db.connection());
        let id = store.insert(component).unwrap();
        ServiceIntervalStore::new(db.connection())
            .delete_for_component(id)
            .unwrap();
        store.update_usage(id, component.distance_used_km, 0, false).unwrap();
        id
    }

    #[test]
    fn test_due_list_applies_threshold() {
        let (db, bike_id) = setup();
        // 5% and 50% health against the default 20% threshold
        insert_bare(&db, &part(bike_id, ComponentKind::Tire, "Worn tire", 1000.0, 950.0));
        insert_bare(&db, &part(bike_id, ComponentKind::Chain, "Fresh chain", 1000.0, 500.0));

        let planner = DueListPlanner::new(db.connection());
        let items = planner
            .build_due_list(&DueListFilter::default(), SortOrder::Health)
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].component.name, "Worn tire");
        assert_eq!(items[0].health_percent, 5);
    }

    #[test]
    fn test_due_list_respects_configured_threshold() {
        let (db, bike_id) = setup();
        insert_bare(&db, &part(bike_id, ComponentKind::Chain, "Chain", 1000.0, 500.0));

        let planner = DueListPlanner::new(db.connection());
        assert!(planner
            .build_due_list(&DueListFilter::default(), SortOrder::Health)
            .unwrap()
            .is_empty());

        PreferencesStore::new(db.connection())
            .set_close_to_service_threshold(60)
            .unwrap();
        let items = planner
            .build_due_list(&DueListFilter::default(), SortOrder::Health)
            .unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_filters() {
        let (db, bike_id) = setup();
        let other_bike = BikeStore::new(db.connection()).insert(&Bike::new("Other")).unwrap();
        insert_bare(&db, &part(bike_id, ComponentKind::Tire, "Front tire", 1000.0, 950.0));
        insert_bare(&db, &part(bike_id, ComponentKind::Chain, "Old chain", 1000.0, 950.0));
        insert_bare(&db, &part(other_bike, ComponentKind::Tire, "Other tire", 1000.0, 950.0));

        let planner = DueListPlanner::new(db.connection());
        let all = planner
            .build_due_list(&DueListFilter::default(), SortOrder::Health)
            .unwrap();
        assert_eq!(all.len(), 3);

        let filter = DueListFilter {
            bike_id: Some(bike_id),
            ..Default::default()
        };
        assert_eq!(planner.build_due_list(&filter, SortOrder::Health).unwrap().len(), 2);

        let filter = DueListFilter {
            kind: Some(ComponentKind::Tire),
            ..Default::default()
        };
        assert_eq!(planner.build_due_list(&filter, SortOrder::Health).unwrap().len(), 2);

        let filter = DueListFilter {
            search: Some("CHAIN".to_string()),
            ..Default::default()
        };
        let found = planner.build_due_list(&filter, SortOrder::Health).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].component.name, "Old chain");
    }

    #[test]
    fn test_sort_orders() {
        let (db, bike_id) = setup();
        insert_bare(&db, &part(bike_id, ComponentKind::Tire, "Tire", 1000.0, 900.0)); // 10
        insert_bare(&db, &part(bike_id, ComponentKind::BrakePads, "Pads", 1000.0, 950.0)); // 5
        insert_bare(&db, &part(bike_id, ComponentKind::Chain, "Chain", 1000.0, 850.0)); // 15

        let planner = DueListPlanner::new(db.connection());
        let by_health = planner
            .build_due_list(&DueListFilter::default(), SortOrder::Health)
            .unwrap();
        let healths: Vec<i32> = by_health.iter().map(|i| i.health_percent).collect();
        assert_eq!(healths, vec![5, 10, 15]);

        let by_type = planner
            .build_due_list(&DueListFilter::default(), SortOrder::TypeAz)
            .unwrap();
        let kinds: Vec<&str> = by_type.iter().map(|i| i.component.kind.as_str()).collect();
        assert_eq!(kinds, vec!["brake_pads", "chain", "tire"]);
    }

    #[test]
    fn test_bulk_replace_carries_on_past_failures() {
        let (db, bike_id) = setup();
        let store = ComponentStore::new(db.connection());
        let id = store
            .insert(&part(bike_id, ComponentKind::Tire, "Tire", 1000.0, 950.0))
            .unwrap();

        let planner = DueListPlanner::new(db.connection());
        let outcome = planner.replace_selected(&[id, 9999], Utc::now()).unwrap();
        assert_eq!(outcome.completed, 1);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].0, 9999);

        assert_eq!(store.get(id).unwrap().unwrap().distance_used_km, 0.0);
    }

    #[test]
    fn test_bulk_inspect() {
        let (db, bike_id) = setup();
        let store = ComponentStore::new(db.connection());
        let id = store
            .insert(&Component::new(Some(bike_id), ComponentKind::Chain, "Chain", 3500.0))
            .unwrap();
        store.update_usage(id, 300.0, 10_000, false).unwrap();

        let planner = DueListPlanner::new(db.connection());
        let outcome = planner.inspect_selected(&[id]).unwrap();
        assert_eq!(outcome.completed, 1);
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_health_summary() {
        let (db, bike_id) = setup();
        ComponentStore::new(db.connection())
            .insert(&Component::new(Some(bike_id), ComponentKind::Chain, "KMC chain", 3500.0))
            .unwrap();

        let planner = DueListPlanner::new(db.connection());
        let summary = planner.health_summary(bike_id).unwrap();
        assert!(summary.starts_with("Bike: B\n"));
        assert!(summary.contains("KMC chain (chain): 100% health"));
        assert!(summary.contains("Inspect / Clean / Lube"));

        assert!(matches!(
            planner.health_summary(999),
            Err(PlannerError::BikeNotFound(999))
        ));
    }
}
