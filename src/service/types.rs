//! Service interval types.

use serde::{Deserialize, Serialize};

use crate::service::ServiceError;

/// What a service interval schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Part replacement. Completing it resets the whole component.
    #[default]
    Replace,
    /// Inspection or cleaning; resets only its own tracked values.
    Inspection,
    /// Lubrication/grease service; treated like an inspection on completion.
    Grease,
    /// Informational only; no schedule, excluded from default provisioning.
    OnFailure,
}

impl ServiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::Replace => "replace",
            ServiceKind::Inspection => "inspection",
            ServiceKind::Grease => "grease",
            ServiceKind::OnFailure => "on_failure",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "inspection" => ServiceKind::Inspection,
            "grease" => ServiceKind::Grease,
            "on_failure" => ServiceKind::OnFailure,
            _ => ServiceKind::Replace,
        }
    }
}

impl std::fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A service interval for a component (e.g. "Max life", "Inspect / Clean").
///
/// Health considers both distance and time; whichever limit is reached first
/// makes the interval due.
/// - Distance: `(interval_km - tracked_km) / interval_km` when `interval_km > 0`,
///   exempt (always healthy) otherwise.
/// - Time: `(interval_time_seconds - tracked_time_seconds) / interval_time_seconds`
///   when `interval_time_seconds` is set, exempt otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInterval {
    pub id: i64,
    pub component_id: i64,
    pub name: String,
    /// Interval distance in km. 0 when time-only (e.g. sealant top-up).
    pub interval_km: f64,
    pub tracked_km: f64,
    pub kind: ServiceKind,
    /// Interval time in seconds. None when distance-only.
    pub interval_time_seconds: Option<i64>,
    /// Tracked time in seconds. None when not tracking time.
    pub tracked_time_seconds: Option<i64>,
}

impl ServiceInterval {
    /// New distance-tracked interval with zero progress.
    pub fn new(component_id: i64, name: impl Into<String>, interval_km: f64, kind: ServiceKind) -> Self {
        Self {
            id: 0,
            component_id,
            name: name.into(),
            interval_km,
            tracked_km: 0.0,
            kind,
            interval_time_seconds: None,
            tracked_time_seconds: None,
        }
    }

    /// Add a time metric; tracked time starts at zero.
    pub fn with_time(mut self, interval_time_seconds: i64) -> Self {
        self.interval_time_seconds = Some(interval_time_seconds);
        self.tracked_time_seconds = Some(0);
        self
    }
}

/// Caller-facing validation for user-entered intervals: a meaningful interval
/// needs at least one metric. Run before any mutation; the store itself does
/// not enforce this.
pub fn validate_interval(
    name: &str,
    interval_km: f64,
    interval_time_seconds: Option<i64>,
) -> Result<(), ServiceError> {
    if name.trim().is_empty() {
        return Err(ServiceError::Validation("Name is required".to_string()));
    }
    if interval_km <= 0.0 && interval_time_seconds.is_none() {
        return Err(ServiceError::Validation(
            "Interval needs a distance or a time".to_string(),
        ));
    }
    if let Some(t) = interval_time_seconds {
        if t <= 0 {
            return Err(ServiceError::Validation(
                "Interval time must be positive".to_string(),
            ));
        }
    }
    Ok(())
}
