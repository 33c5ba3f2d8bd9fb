//! Service module: intervals, wear math, and the due-for-service planner.

pub mod catalog;
pub mod due_list;
pub mod interval_store;
pub mod types;
pub mod wear;

pub use due_list::{DueItem, DueListFilter, DueListPlanner, SortOrder};
pub use interval_store::ServiceIntervalStore;
pub use types::{validate_interval, ServiceInterval, ServiceKind};

use thiserror::Error;

/// Service interval store errors.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service interval not found: {0}")]
    IntervalNotFound(i64),
}
