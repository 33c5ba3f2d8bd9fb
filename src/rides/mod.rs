//! Rides: recording, persistence, and roll-up aggregation.

pub mod aggregator;
pub mod store;
pub mod tracker;
pub mod types;

pub use aggregator::{AggregationError, AggregationOutcome, AggregationStep, RideAggregator};
pub use store::RideStore;
pub use tracker::{ActiveRideSignal, RideTracker, TrackerError, TrackerState};
pub use types::{Ride, RideSource};

use thiserror::Error;

/// Ride store errors.
#[derive(Debug, Error)]
pub enum RideError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}
