//! Live ride tracking.
//!
//! Accumulates GPS fixes into an in-progress ride. The running average here
//! is the incremental per-sample formula (`avg += (v - avg) / n`), which is
//! not the same number as the aggregator's recompute from cumulative totals;
//! the tracker averages what the rider saw, the aggregator averages what the
//! odometer says. Keep the two separate.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::rides::types::{Ride, RideSource};

/// Per-fix distance gate in meters. Fixes below the floor are GPS jitter,
/// fixes above the ceiling are teleports; both are dropped.
pub const MIN_SAMPLE_DISTANCE_M: f64 = 1.0;
pub const MAX_SAMPLE_DISTANCE_M: f64 = 500.0;

/// One GPS fix delta.
#[derive(Debug, Clone, Copy)]
pub struct TrackSample {
    pub at: DateTime<Utc>,
    /// Distance covered since the previous fix, in meters.
    pub distance_m: f64,
    pub speed_kmh: f64,
    /// Elevation change since the previous fix; positive climbs, negative
    /// descends.
    pub elev_delta_m: f64,
}

/// Shared "is a ride being recorded" state. Cloned handles observe the same
/// underlying slot; the tracker sets it on start and clears it on finish and
/// abort.
#[derive(Debug, Clone, Default)]
pub struct ActiveRideSignal {
    slot: Arc<RwLock<Option<Uuid>>>,
}

impl ActiveRideSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// The id of the ride being recorded, if any.
    pub fn current(&self) -> Option<Uuid> {
        *self.slot.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    fn set(&self, id: Uuid) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = Some(id);
    }

    fn clear(&self) {
        *self.slot.write().unwrap_or_else(|e| e.into_inner()) = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Recording,
    Paused,
}

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Tracker is paused")]
    Paused,

    #[error("Tracker is already recording")]
    AlreadyRecording,
}

/// An in-progress ride recording.
pub struct RideTracker {
    ride_id: Uuid,
    bike_id: Option<i64>,
    started_at: DateTime<Utc>,
    state: TrackerState,
    /// Milliseconds of completed recording segments; the open segment is in
    /// `segment_started_at`.
    accumulated_ms: i64,
    segment_started_at: DateTime<Utc>,
    distance_km: f64,
    sample_count: u64,
    avg_speed_kmh: f64,
    max_speed_kmh: f64,
    elev_gain_m: f64,
    elev_loss_m: f64,
    signal: ActiveRideSignal,
}

impl RideTracker {
    /// Start recording. Sets the shared signal.
    pub fn start(
        bike_id: Option<i64>,
        started_at: DateTime<Utc>,
        signal: ActiveRideSignal,
    ) -> Self {
        let ride_id = Uuid::new_v4();
        signal.set(ride_id);
        tracing::info!(ride_id = %ride_id, ?bike_id, "Ride recording started");
        Self {
            ride_id,
            bike_id,
            started_at,
            state: TrackerState::Recording,
            accumulated_ms: 0,
            segment_started_at: started_at,
            distance_km: 0.0,
            sample_count: 0,
            avg_speed_kmh: 0.0,
            max_speed_kmh: 0.0,
            elev_gain_m: 0.0,
            elev_loss_m: 0.0,
            signal,
        }
    }

    pub fn ride_id(&self) -> Uuid {
        self.ride_id
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Feed one fix. Returns whether it passed the distance gate; gated-out
    /// fixes change nothing, not even the averages.
    pub fn add_sample(&mut self, sample: TrackSample) -> Result<bool, TrackerError> {
        if self.state == TrackerState::Paused {
            return Err(TrackerError::Paused);
        }
        if !(MIN_SAMPLE_DISTANCE_M..=MAX_SAMPLE_DISTANCE_M).contains(&sample.distance_m) {
            tracing::trace!(distance_m = sample.distance_m, "Dropped out-of-gate fix");
            return Ok(false);
        }

        self.distance_km += sample.distance_m / 1000.0;
        self.sample_count += 1;
        self.avg_speed_kmh +=
            (sample.speed_kmh - self.avg_speed_kmh) / self.sample_count as f64;
        self.max_speed_kmh = self.max_speed_kmh.max(sample.speed_kmh);
        if sample.elev_delta_m >= 0.0 {
            self.elev_gain_m += sample.elev_delta_m;
        } else {
            self.elev_loss_m += -sample.elev_delta_m;
        }
        Ok(true)
    }

    /// Pause the clock. Distance and speeds freeze with it since samples are
    /// rejected while paused.
    pub fn pause(&mut self, at: DateTime<Utc>) -> Result<(), TrackerError> {
        if self.state == TrackerState::Paused {
            return Err(TrackerError::Paused);
        }
        self.accumulated_ms += segment_ms(self.segment_started_at, at);
        self.state = TrackerState::Paused;
        Ok(())
    }

    pub fn resume(&mut self, at: DateTime<Utc>) -> Result<(), TrackerError> {
        if self.state == TrackerState::Recording {
            return Err(TrackerError::AlreadyRecording);
        }
        self.segment_started_at = at;
        self.state = TrackerState::Recording;
        Ok(())
    }

    /// Finish recording: clears the signal and emits the immutable ride for
    /// the aggregator. Paused time is excluded from the duration.
    pub fn finish(mut self, ended_at: DateTime<Utc>) -> Ride {
        if self.state == TrackerState::Recording {
            self.accumulated_ms += segment_ms(self.segment_started_at, ended_at);
        }
        self.signal.clear();
        tracing::info!(
            ride_id = %self.ride_id,
            distance_km = self.distance_km,
            "Ride recording finished"
        );
        Ride {
            id: self.ride_id,
            bike_id: self.bike_id,
            distance_km: self.distance_km,
            duration_ms: self.accumulated_ms,
            avg_speed_kmh: self.avg_speed_kmh,
            max_speed_kmh: self.max_speed_kmh,
            elev_gain_m: self.elev_gain_m,
            elev_loss_m: self.elev_loss_m,
            started_at: self.started_at,
            ended_at,
            source: RideSource::App,
        }
    }

    /// Discard the recording. Nothing is persisted; the signal clears.
    pub fn abort(self) {
        self.signal.clear();
        tracing::info!(ride_id = %self.ride_id, "Ride recording aborted");
    }
}

fn segment_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().max(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample(distance_m: f64, speed_kmh: f64, elev_delta_m: f64) -> TrackSample {
        TrackSample {
            at: Utc::now(),
            distance_m,
            speed_kmh,
            elev_delta_m,
        }
    }

    #[test]
    fn test_signal_lifecycle() {
        let signal = ActiveRideSignal::new();
        let observer = signal.clone();
        assert!(!observer.is_active());

        let tracker = RideTracker::start(Some(1), Utc::now(), signal);
        assert_eq!(observer.current(), Some(tracker.ride_id()));

        tracker.abort();
        assert!(!observer.is_active());
    }

    #[test]
    fn test_sample_gate() {
        let mut tracker = RideTracker::start(None, Utc::now(), ActiveRideSignal::new());
        // Jitter and teleport are dropped
        assert!(!tracker.add_sample(sample(0.5, 10.0, 0.0)).unwrap());
        assert!(!tracker.add_sample(sample(600.0, 10.0, 0.0)).unwrap());
        assert_eq!(tracker.distance_km(), 0.0);
        // Boundaries are inclusive
        assert!(tracker.add_sample(sample(1.0, 10.0, 0.0)).unwrap());
        assert!(tracker.add_sample(sample(500.0, 10.0, 0.0)).unwrap());
        assert!((tracker.distance_km() - 0.501).abs() < 1e-9);
    }

    #[test]
    fn test_incremental_average_and_max() {
        let mut tracker = RideTracker::start(None, Utc::now(), ActiveRideSignal::new());
        for speed in [10.0, 20.0, 30.0] {
            tracker.add_sample(sample(100.0, speed, 0.0)).unwrap();
        }
        let ride = tracker.finish(Utc::now());
        assert!((ride.avg_speed_kmh - 20.0).abs() < 1e-9);
        assert_eq!(ride.max_speed_kmh, 30.0);
    }

    #[test]
    fn test_elevation_splits_gain_and_loss() {
        let mut tracker = RideTracker::start(None, Utc::now(), ActiveRideSignal::new());
        tracker.add_sample(sample(100.0, 15.0, 12.0)).unwrap();
        tracker.add_sample(sample(100.0, 15.0, -7.5)).unwrap();
        let ride = tracker.finish(Utc::now());
        assert_eq!(ride.elev_gain_m, 12.0);
        assert_eq!(ride.elev_loss_m, 7.5);
    }

    #[test]
    fn test_pause_excludes_time_and_rejects_samples() {
        let t0 = Utc::now();
        let mut tracker = RideTracker::start(None, t0, ActiveRideSignal::new());

        tracker.pause(t0 + Duration::minutes(10)).unwrap();
        assert!(matches!(
            tracker.add_sample(sample(100.0, 15.0, 0.0)),
            Err(TrackerError::Paused)
        ));
        tracker.resume(t0 + Duration::minutes(30)).unwrap();

        let ride = tracker.finish(t0 + Duration::minutes(40));
        // 10 min recorded + 10 min after resume; 20 min paused
        assert_eq!(ride.duration_ms, 20 * 60 * 1000);
    }

    #[test]
    fn test_double_pause_and_resume_rejected() {
        let mut tracker = RideTracker::start(None, Utc::now(), ActiveRideSignal::new());
        assert!(matches!(
            tracker.resume(Utc::now()),
            Err(TrackerError::AlreadyRecording)
        ));
        tracker.pause(Utc::now()).unwrap();
        assert!(matches!(tracker.pause(Utc::now()), Err(TrackerError::Paused)));
    }

    #[test]
    fn test_finish_emits_app_sourced_ride() {
        let signal = ActiveRideSignal::new();
        let mut tracker = RideTracker::start(Some(3), Utc::now(), signal.clone());
        tracker.add_sample(sample(250.0, 22.0, 3.0)).unwrap();
        let ride = tracker.finish(Utc::now());

        assert_eq!(ride.bike_id, Some(3));
        assert_eq!(ride.source, RideSource::App);
        assert!((ride.distance_km - 0.25).abs() < 1e-9);
        assert!(!signal.is_active());
    }
}
