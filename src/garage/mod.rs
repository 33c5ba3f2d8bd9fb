//! Garage module: bikes, components, and their swap history.

pub mod bike_store;
pub mod catalog;
pub mod component_store;
pub mod context_store;
pub mod swap_ledger;
pub mod types;

pub use bike_store::BikeStore;
pub use component_store::ComponentStore;
pub use context_store::ContextStore;
pub use swap_ledger::SwapLedger;
pub use types::{
    Bike, Component, ComponentCategory, ComponentContext, ComponentKind, ComponentSwap, Position,
};

use thiserror::Error;

/// Garage store errors.
#[derive(Debug, Error)]
pub enum GarageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Service interval error: {0}")]
    Interval(#[from] crate::service::ServiceError),

    #[error("Preferences error: {0}")]
    Preferences(#[from] crate::storage::preferences::PreferencesError),

    #[error("Bike not found: {0}")]
    BikeNotFound(i64),

    #[error("Component not found: {0}")]
    ComponentNotFound(i64),

    /// Another writer updated the row since it was read. Retry with fresh data.
    #[error("Conflicting update for {entity} {id} (stale version {version})")]
    Conflict {
        entity: &'static str,
        id: i64,
        version: i64,
    },
}
