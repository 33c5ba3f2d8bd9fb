//! BikeGarage - Bicycle Maintenance Tracking Engine
//!
//! Tracks wear and service state of bicycle components over distance and
//! elapsed time, rolls completed rides up into denormalized bike and
//! component statistics, and builds prioritized "due for service" worklists.
//! Presentation, GPS capture, and notification delivery live outside this
//! crate and talk to it through the store APIs and the `NotificationSink`
//! trait.

pub mod alerts;
pub mod format;
pub mod garage;
pub mod rides;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use alerts::evaluator::{AlertEvaluator, NeedsAlert, NotificationSink};
pub use garage::component_store::ComponentStore;
pub use rides::aggregator::RideAggregator;
pub use service::due_list::DueListPlanner;
pub use storage::database::{Database, DatabaseError};
