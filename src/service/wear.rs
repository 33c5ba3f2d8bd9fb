//! Wear math: health percentages for components and service intervals.
//!
//! Health runs from 100 (new) to 0 (due/overdue). An interval is due when
//! either its distance clock or its time clock runs out, never when both
//! must run out: `interval_health_percent` returns the minimum of the two.
//! Exempt metrics (zero distance budget, no time budget) always read 100.

use crate::garage::types::Component;
use crate::service::types::ServiceInterval;

/// Health percent from usage versus capacity, clamped to [0, 100].
/// A capacity of zero or less means the metric is exempt and reads 100.
pub fn health_percent(used: f64, capacity: f64) -> i32 {
    if capacity <= 0.0 {
        return 100;
    }
    (100.0 - 100.0 * used / capacity).round().clamp(0.0, 100.0) as i32
}

/// Component health from distance used against lifespan.
pub fn component_health_percent(component: &Component) -> i32 {
    health_percent(component.distance_used_km, component.lifespan_km)
}

/// Interval health: minimum of the distance metric and the time metric.
pub fn interval_health_percent(interval: &ServiceInterval) -> i32 {
    let km_health = health_percent(interval.tracked_km, interval.interval_km);
    let time_health = match interval.interval_time_seconds {
        Some(limit) if limit > 0 => {
            let tracked = interval.tracked_time_seconds.unwrap_or(0);
            health_percent(tracked as f64, limit as f64)
        }
        _ => 100,
    };
    km_health.min(time_health)
}

/// Minimum interval health across a component's intervals, 100 when it has
/// none. Used for NEXT_SERVICE sorting: lower is more urgent.
pub fn min_interval_health(intervals: &[ServiceInterval]) -> i32 {
    intervals
        .iter()
        .map(interval_health_percent)
        .min()
        .unwrap_or(100)
}

/// Overall component urgency: its own lifespan health or its most urgent
/// interval, whichever is lower.
pub fn min_health(component: &Component, intervals: &[ServiceInterval]) -> i32 {
    component_health_percent(component).min(min_interval_health(intervals))
}
