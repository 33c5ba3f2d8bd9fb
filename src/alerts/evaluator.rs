//! Alert evaluation.
//!
//! A component needs an alert when alerts are enabled, it is not snoozed,
//! and its wear health (distance used against lifespan) is at or below its
//! threshold. Interval clocks never raise push alerts; a lapsed inspection
//! surfaces on the due list instead. Per bike the evaluator emits at most
//! one aggregate notification naming the parts due, never one per part.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;

use crate::garage::component_store::ComponentStore;
use crate::garage::types::Component;
use crate::garage::GarageError;
use crate::service::wear;

/// Delivery seam for alert notifications. Implementations must not block;
/// delivery failures are the sink's problem, not the evaluator's.
pub trait NotificationSink {
    fn notify(&self, title: &str, body: &str);
}

/// Aggregate alert state for one bike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeedsAlert {
    /// Number of components at or below their alert threshold.
    pub count: usize,
    /// Their names, in list order.
    pub names: Vec<String>,
}

impl NeedsAlert {
    pub fn any(&self) -> bool {
        self.count > 0
    }
}

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Garage error: {0}")]
    Garage(#[from] GarageError),
}

/// Evaluates which components are due for attention.
pub struct AlertEvaluator<'a> {
    conn: &'a Connection,
}

impl<'a> AlertEvaluator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Whether one component needs an alert right now. Gated on the
    /// component's own lifespan health, not its service intervals.
    pub fn component_needs_alert(&self, component: &Component, now: DateTime<Utc>) -> bool {
        if !component.alerts_enabled {
            return false;
        }
        if is_snoozed(component, now) {
            return false;
        }
        wear::component_health_percent(component) <= component.alert_threshold_percent
    }

    /// Aggregate alert state across a bike's installed components.
    pub fn evaluate_bike(&self, bike_id: i64, now: DateTime<Utc>) -> Result<NeedsAlert, AlertError> {
        let components = ComponentStore::new(self.conn).list_for_bike(bike_id)?;
        let mut names = Vec::new();
        for component in &components {
            if self.component_needs_alert(component, now) {
                names.push(component.name.clone());
            }
        }
        Ok(NeedsAlert {
            count: names.len(),
            names,
        })
    }

    /// Evaluate a bike and push one aggregate notification when anything is
    /// due. Call after mutations commit; the sink runs outside any
    /// transaction.
    pub fn notify_bike(
        &self,
        bike_id: i64,
        now: DateTime<Utc>,
        sink: &dyn NotificationSink,
    ) -> Result<NeedsAlert, AlertError> {
        let alert = self.evaluate_bike(bike_id, now)?;
        if alert.any() {
            let title = if alert.count == 1 {
                "1 component needs service".to_string()
            } else {
                format!("{} components need service", alert.count)
            };
            sink.notify(&title, &alert.names.join(", "));
            tracing::info!(bike_id, count = alert.count, "Service alert raised");
        }
        Ok(alert)
    }
}

/// Snoozed while usage is still below the distance bound, or the clock is
/// still before the time bound.
fn is_snoozed(component: &Component, now: DateTime<Utc>) -> bool {
    if let Some(until_km) = component.alert_snooze_until_km {
        if component.distance_used_km < until_km {
            return true;
        }
    }
    if let Some(until) = component.alert_snooze_until_time {
        if now < until {
            return true;
        }
    }
    false
}
