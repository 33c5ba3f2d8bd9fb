//! Service alerts: threshold evaluation and notification delivery.

pub mod evaluator;

pub use evaluator::{AlertError, AlertEvaluator, NeedsAlert, NotificationSink};
