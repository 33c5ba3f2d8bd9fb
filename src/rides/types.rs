//! Ride types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where a ride came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideSource {
    /// Recorded live by the tracker.
    #[default]
    App,
    /// Imported from an external file or service.
    Import,
    /// Entered by hand after the fact.
    Manual,
}

impl RideSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RideSource::App => "app",
            RideSource::Import => "import",
            RideSource::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "import" => RideSource::Import,
            "manual" => RideSource::Manual,
            _ => RideSource::App,
        }
    }
}

impl std::fmt::Display for RideSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A completed ride.
///
/// The UUID is assigned when the ride is created (before any persistence) and
/// is the at-most-once guard for aggregation: a ride id can only ever be
/// recorded once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    /// None for rides whose bike was deleted, or unattributed imports.
    pub bike_id: Option<i64>,
    pub distance_km: f64,
    /// Raw recorded duration; aggregation converts to whole seconds.
    pub duration_ms: i64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub elev_gain_m: f64,
    pub elev_loss_m: f64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub source: RideSource,
}

impl Ride {
    /// A new ride with a fresh id.
    pub fn new(bike_id: Option<i64>, started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            bike_id,
            distance_km: 0.0,
            duration_ms: 0,
            avg_speed_kmh: 0.0,
            max_speed_kmh: 0.0,
            elev_gain_m: 0.0,
            elev_loss_m: 0.0,
            started_at,
            ended_at,
            source: RideSource::App,
        }
    }

    /// Recorded duration in whole seconds, clamped at zero. Corrupt negative
    /// durations aggregate as zero rather than rolling totals backward.
    pub fn duration_seconds(&self) -> i64 {
        let seconds = (self.duration_ms as f64 / 1000.0).round() as i64;
        seconds.max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_rounds_to_seconds() {
        let mut ride = Ride::new(None, Utc::now(), Utc::now());
        ride.duration_ms = 1_499;
        assert_eq!(ride.duration_seconds(), 1);
        ride.duration_ms = 1_500;
        assert_eq!(ride.duration_seconds(), 2);
    }

    #[test]
    fn test_negative_duration_clamps_to_zero() {
        let mut ride = Ride::new(None, Utc::now(), Utc::now());
        ride.duration_ms = -5_000;
        assert_eq!(ride.duration_seconds(), 0);
    }

    #[test]
    fn test_source_roundtrip() {
        for source in [RideSource::App, RideSource::Import, RideSource::Manual] {
            assert_eq!(RideSource::parse(source.as_str()), source);
        }
    }
}
