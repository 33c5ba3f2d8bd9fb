//! Ride aggregation: fold a completed ride into bike and component roll-ups.
//!
//! The ride row is persisted first and is never rolled back; the roll-ups
//! run in one transaction afterwards. A failure there leaves the ride saved
//! and surfaces as a `Partial` error naming the step that failed, so the
//! caller can re-derive totals or retry the roll-up by hand. Aggregation is
//! not idempotent; the ride id's uniqueness is the at-most-once guard.

use rusqlite::{params, Connection};
use thiserror::Error;
use uuid::Uuid;

use crate::alerts::evaluator::{AlertEvaluator, NotificationSink};
use crate::rides::store::RideStore;
use crate::rides::types::Ride;
use crate::service::interval_store::ServiceIntervalStore;

/// Applies completed rides to the stored roll-ups.
pub struct RideAggregator<'a> {
    conn: &'a Connection,
}

/// Which part of aggregation a partial failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationStep {
    BikeRollup,
    ComponentRollup,
    IntervalAdvance,
    Commit,
}

impl std::fmt::Display for AggregationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AggregationStep::BikeRollup => "bike roll-up",
            AggregationStep::ComponentRollup => "component roll-up",
            AggregationStep::IntervalAdvance => "interval advance",
            AggregationStep::Commit => "commit",
        };
        write!(f, "{name}")
    }
}

/// What one aggregation touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationOutcome {
    pub ride_id: Uuid,
    /// False when the ride had no bike; the ride is recorded but nothing
    /// accrues wear.
    pub bike_updated: bool,
    pub components_updated: usize,
}

#[derive(Debug, Error)]
pub enum AggregationError {
    #[error("Ride {0} was already recorded")]
    DuplicateRide(Uuid),

    #[error("Invalid ride: {0}")]
    Invalid(String),

    #[error("Bike not found: {0}")]
    BikeNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Ride store error: {0}")]
    Store(#[from] crate::rides::RideError),

    /// The ride was saved but the roll-up did not complete. Totals are
    /// stale until the roll-up is repaired.
    #[error("Ride {ride_id} saved but roll-up failed during {step}: {reason}")]
    Partial {
        ride_id: Uuid,
        step: AggregationStep,
        reason: String,
    },
}

impl<'a> RideAggregator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Record a completed ride and fold it into the roll-ups.
    ///
    /// Distance and elevation add up, time adds in whole seconds, average
    /// speed is recomputed from the new totals, max speed keeps the larger
    /// value. Every component installed on the bike accrues the same ride,
    /// and its service intervals advance to the component's new usage.
    pub fn apply(&self, ride: &Ride) -> Result<AggregationOutcome, AggregationError> {
        if ride.distance_km < 0.0 {
            return Err(AggregationError::Invalid(
                "Ride distance cannot be negative".to_string(),
            ));
        }
        if ride.ended_at < ride.started_at {
            return Err(AggregationError::Invalid(
                "Ride cannot end before it starts".to_string(),
            ));
        }

        let rides = RideStore::new(self.conn);
        if rides.exists(&ride.id)? {
            return Err(AggregationError::DuplicateRide(ride.id));
        }
        let bike_id = match ride.bike_id {
            Some(id) => {
                let known: i64 = self.conn.query_row(
                    "SELECT COUNT(*) FROM bikes WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )?;
                if known == 0 {
                    return Err(AggregationError::BikeNotFound(id));
                }
                Some(id)
            }
            None => None,
        };

        rides.insert(ride)?;
        tracing::debug!(ride_id = %ride.id, distance_km = ride.distance_km, "Recorded ride");

        let Some(bike_id) = bike_id else {
            return Ok(AggregationOutcome {
                ride_id: ride.id,
                bike_updated: false,
                components_updated: 0,
            });
        };

        // Ride row stays put whatever happens below.
        let tx = self.conn.unchecked_transaction()?;
        let components_updated = match self.roll_up(ride, bike_id) {
            Ok(n) => n,
            Err((step, reason)) => {
                drop(tx);
                tracing::warn!(ride_id = %ride.id, %step, reason, "Ride roll-up failed");
                return Err(AggregationError::Partial {
                    ride_id: ride.id,
                    step,
                    reason,
                });
            }
        };
        if let Err(e) = tx.commit() {
            return Err(AggregationError::Partial {
                ride_id: ride.id,
                step: AggregationStep::Commit,
                reason: e.to_string(),
            });
        }

        tracing::info!(
            ride_id = %ride.id,
            bike_id,
            components_updated,
            "Aggregated ride into roll-ups"
        );
        Ok(AggregationOutcome {
            ride_id: ride.id,
            bike_updated: true,
            components_updated,
        })
    }

    /// `apply`, then evaluate alerts for the bike and push one aggregate
    /// notification through the sink. The sink runs after the roll-up
    /// transaction commits; alert failures are logged, never propagated,
    /// since the aggregation itself already succeeded.
    pub fn apply_notifying(
        &self,
        ride: &Ride,
        sink: &dyn NotificationSink,
    ) -> Result<AggregationOutcome, AggregationError> {
        let outcome = self.apply(ride)?;
        if let Some(bike_id) = ride.bike_id {
            if let Err(e) =
                AlertEvaluator::new(self.conn).notify_bike(bike_id, ride.ended_at, sink)
            {
                tracing::warn!(bike_id, error = %e, "Alert evaluation after ride failed");
            }
        }
        Ok(outcome)
    }

    fn roll_up(&self, ride: &Ride, bike_id: i64) -> Result<usize, (AggregationStep, String)> {
        let seconds = ride.duration_seconds();

        self.conn
            .execute(
                "UPDATE bikes SET
                 total_distance_km = total_distance_km + ?1,
                 total_time_seconds = total_time_seconds + ?2,
                 avg_speed_kmh = CASE
                     WHEN total_time_seconds + ?2 > 0
                     THEN (total_distance_km + ?1) / ((total_time_seconds + ?2) / 3600.0)
                     ELSE avg_speed_kmh
                 END,
                 max_speed_kmh = MAX(max_speed_kmh, ?3),
                 total_elev_gain_m = total_elev_gain_m + ?4,
                 total_elev_loss_m = total_elev_loss_m + ?5,
                 last_ride_at = ?6,
                 version = version + 1
                 WHERE id = ?7",
                params![
                    ride.distance_km,
                    seconds,
                    ride.max_speed_kmh,
                    ride.elev_gain_m,
                    ride.elev_loss_m,
                    ride.ended_at.to_rfc3339(),
                    bike_id,
                ],
            )
            .map_err(|e| (AggregationStep::BikeRollup, e.to_string()))?;

        let component_usage: Vec<(i64, f64, i64)> = {
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT id, distance_used_km, total_time_seconds
                     FROM components WHERE bike_id = ?1",
                )
                .map_err(|e| (AggregationStep::ComponentRollup, e.to_string()))?;
            let rows = stmt
                .query_map(params![bike_id], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })
                .map_err(|e| (AggregationStep::ComponentRollup, e.to_string()))?;
            rows.collect::<Result<Vec<_>, _>>()
                .map_err(|e| (AggregationStep::ComponentRollup, e.to_string()))?
        };

        let intervals = ServiceIntervalStore::new(self.conn);
        for (component_id, used_km, time_seconds) in &component_usage {
            let new_used = used_km + ride.distance_km;
            let new_time = time_seconds + seconds;
            // Ties on max speed go to the newest ride, so >= not >.
            self.conn
                .execute(
                    "UPDATE components SET
                     distance_used_km = ?1,
                     total_time_seconds = ?2,
                     avg_speed_kmh = CASE
                         WHEN ?2 > 0 THEN ?1 / (?2 / 3600.0)
                         ELSE avg_speed_kmh
                     END,
                     max_speed_kmh = MAX(max_speed_kmh, ?3),
                     max_speed_bike_id = CASE
                         WHEN ?3 >= max_speed_kmh THEN ?4
                         ELSE max_speed_bike_id
                     END,
                     version = version + 1
                     WHERE id = ?5",
                    params![new_used, new_time, ride.max_speed_kmh, bike_id, component_id],
                )
                .map_err(|e| (AggregationStep::ComponentRollup, e.to_string()))?;

            intervals
                .advance(*component_id, new_used, new_time)
                .map_err(|e| (AggregationStep::IntervalAdvance, e.to_string()))?;
        }

        Ok(component_usage.len())
    }
}
