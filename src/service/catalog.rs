//! Default service interval catalog.
//!
//! Industry-standard maintenance schedules keyed by component kind, used to
//! provision interval rows when a component is created. "Every ride" checks
//! and on-failure parts carry no schedule and are not provisioned.

use crate::garage::types::ComponentKind;
use crate::service::types::ServiceKind;

/// Time constants for service intervals, in seconds.
pub mod time {
    pub const TWO_WEEKS: i64 = 14 * 24 * 3600;
    pub const ONE_MONTH: i64 = 30 * 24 * 3600;
    pub const THREE_MONTHS: i64 = 90 * 24 * 3600;
    pub const SIX_MONTHS: i64 = 180 * 24 * 3600;
    pub const TWELVE_MONTHS: i64 = 365 * 24 * 3600;
    pub const EIGHTEEN_MONTHS: i64 = 18 * 30 * 24 * 3600;
    pub const TWENTY_FOUR_MONTHS: i64 = 24 * 30 * 24 * 3600;
    pub const THREE_YEARS: i64 = 3 * 365 * 24 * 3600;
    pub const FIFTY_HOURS: i64 = 50 * 3600;
    pub const TWO_HUNDRED_HOURS: i64 = 200 * 3600;
}

/// One default interval spec for a component kind.
#[derive(Debug, Clone)]
pub struct IntervalSpec {
    pub kind: ComponentKind,
    pub service_name: &'static str,
    pub interval_km: f64,
    pub interval_time_seconds: Option<i64>,
    pub service_kind: ServiceKind,
}

fn spec(
    kind: ComponentKind,
    service_name: &'static str,
    interval_km: f64,
    interval_time_seconds: Option<i64>,
    service_kind: ServiceKind,
) -> IntervalSpec {
    IntervalSpec {
        kind,
        service_name,
        interval_km,
        interval_time_seconds,
        service_kind,
    }
}

/// The full default interval catalog.
pub fn interval_specs() -> Vec<IntervalSpec> {
    use time as T;
    use ComponentKind as K;
    use ServiceKind::{Grease, Inspection, Replace};
    vec![
        // Drivetrain
        spec(K::Chain, "Inspect / Clean / Lube", 250.0, Some(T::TWO_WEEKS), Inspection),
        spec(K::Chain, "Replace", 3_500.0, None, Replace),
        spec(K::Cassette, "Clean", 500.0, Some(T::ONE_MONTH), Inspection),
        spec(K::Cassette, "Replace", 10_000.0, None, Replace),
        spec(K::Freewheel, "Replace", 10_000.0, None, Replace),
        spec(K::Chainring, "Replace", 20_000.0, None, Replace),
        spec(K::BottomBracket, "Inspect / Clean", 2_000.0, Some(T::SIX_MONTHS), Inspection),
        spec(K::BottomBracket, "Replace", 15_000.0, None, Replace),
        spec(K::Cranks, "Inspect (Torque check)", 5_000.0, Some(T::TWELVE_MONTHS), Inspection),
        spec(K::Pedals, "Service (Grease)", 5_000.0, Some(T::TWELVE_MONTHS), Grease),
        spec(K::FrontDerailleur, "Inspect / Clean", 500.0, Some(T::ONE_MONTH), Inspection),
        spec(K::RearDerailleur, "Inspect / Clean (Pulleys)", 500.0, Some(T::ONE_MONTH), Inspection),
        // Wheels & tires
        spec(K::Tire, "Replace", 4_500.0, Some(T::TWENTY_FOUR_MONTHS), Replace),
        spec(K::TubelessSealant, "Top-up", 0.0, Some(T::THREE_MONTHS), Inspection),
        spec(K::FrontWheel, "True / Tension", 2_000.0, Some(T::SIX_MONTHS), Inspection),
        spec(K::RearWheel, "True / Tension", 2_000.0, Some(T::SIX_MONTHS), Inspection),
        spec(K::Hub, "Service (Bearings)", 10_000.0, Some(T::TWELVE_MONTHS), Grease),
        spec(K::Spokes, "Inspect (Tension)", 2_000.0, Some(T::SIX_MONTHS), Inspection),
        spec(K::Rim, "Inspect (Wear/Cracks)", 5_000.0, Some(T::TWELVE_MONTHS), Inspection),
        // Brakes
        spec(K::BrakePads, "Inspect", 500.0, Some(T::ONE_MONTH), Inspection),
        spec(K::BrakePads, "Replace", 2_000.0, None, Replace),
        spec(K::BrakeRotor, "Inspect (Thickness/True)", 1_000.0, Some(T::THREE_MONTHS), Inspection),
        spec(K::BrakeRotor, "Replace", 15_000.0, None, Replace),
        spec(K::BrakeCaliper, "Clean / Piston Lube", 5_000.0, Some(T::TWELVE_MONTHS), Grease),
        spec(K::BrakeFluid, "Bleed / Flush", 5_000.0, Some(T::TWELVE_MONTHS), Inspection),
        spec(K::BrakeCables, "Replace Housing/Wire", 6_000.0, Some(T::EIGHTEEN_MONTHS), Replace),
        // Cockpit
        spec(K::Handlebars, "Inspect (Fatigue/Cracks)", 5_000.0, Some(T::TWELVE_MONTHS), Inspection),
        spec(K::Stem, "Inspect (Torque)", 2_000.0, Some(T::SIX_MONTHS), Inspection),
        spec(K::Headset, "Inspect (Play)", 1_000.0, Some(T::THREE_MONTHS), Inspection),
        spec(K::HeadsetBearings, "Service (Grease)", 5_000.0, Some(T::TWELVE_MONTHS), Grease),
        spec(K::HeadsetBearings, "Replace", 15_000.0, None, Replace),
        spec(K::Grips, "Replace", 5_000.0, Some(T::TWELVE_MONTHS), Replace),
        spec(K::ShiftLevers, "Flush / Lube", 10_000.0, Some(T::TWENTY_FOUR_MONTHS), Grease),
        // Frame & seating
        spec(K::Frame, "Inspect (Cracks/Damage)", 1_000.0, Some(T::THREE_MONTHS), Inspection),
        spec(K::Fork, "Lower Leg Service", 1_000.0, Some(T::FIFTY_HOURS), Grease),
        spec(K::Fork, "Full Rebuild", 4_000.0, Some(T::TWO_HUNDRED_HOURS), Replace),
        spec(K::RearShock, "Air Can Service", 1_000.0, Some(T::FIFTY_HOURS), Grease),
        spec(K::RearShock, "Full Rebuild", 4_000.0, Some(T::TWO_HUNDRED_HOURS), Replace),
        spec(K::SuspensionPivots, "Replace Bearings", 10_000.0, Some(T::TWENTY_FOUR_MONTHS), Replace),
        spec(K::Saddle, "Inspect (Rails)", 5_000.0, Some(T::TWELVE_MONTHS), Inspection),
        spec(K::SeatPost, "Clean / Re-grease", 2_000.0, Some(T::SIX_MONTHS), Grease),
        spec(K::DropperPost, "Service (Collar/Lube)", 1_000.0, Some(T::FIFTY_HOURS), Grease),
        spec(K::DropperPost, "Full Rebuild", 4_000.0, Some(T::TWO_HUNDRED_HOURS), Replace),
        // Cables & power
        spec(K::ShiftCables, "Replace Housing/Wire", 6_000.0, Some(T::EIGHTEEN_MONTHS), Replace),
        spec(K::CableSeatDropper, "Replace Housing/Wire", 8_000.0, Some(T::TWENTY_FOUR_MONTHS), Replace),
        spec(K::CableFrontDerailleur, "Replace Housing/Wire", 6_000.0, Some(T::EIGHTEEN_MONTHS), Replace),
        spec(K::CableRearDerailleur, "Replace Housing/Wire", 6_000.0, Some(T::EIGHTEEN_MONTHS), Replace),
        spec(K::CableFrontBrake, "Replace Housing/Wire", 6_000.0, Some(T::EIGHTEEN_MONTHS), Replace),
        spec(K::CableRearBrake, "Replace Housing/Wire", 6_000.0, Some(T::EIGHTEEN_MONTHS), Replace),
        spec(K::Battery, "Inspect / Charge Check", 500.0, Some(T::ONE_MONTH), Inspection),
        // Battery replacement is time-driven (approx 500 charge cycles)
        spec(K::Battery, "Replace", 0.0, Some(T::THREE_YEARS), Replace),
    ]
}

/// Default interval specs for one component kind, catalog order preserved.
pub fn specs_for_kind(kind: &ComponentKind) -> Vec<IntervalSpec> {
    interval_specs()
        .into_iter()
        .filter(|s| &s.kind == kind)
        .collect()
}

/// Primary Replace interval distance for a kind, used as default lifespan.
pub fn replace_interval_km_for_kind(kind: &ComponentKind) -> Option<f64> {
    specs_for_kind(kind)
        .into_iter()
        .find(|s| s.service_kind == ServiceKind::Replace && s.interval_km > 0.0)
        .map(|s| s.interval_km)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_has_inspection_and_replace() {
        let specs = specs_for_kind(&ComponentKind::Chain);
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].service_kind, ServiceKind::Inspection);
        assert_eq!(specs[1].service_kind, ServiceKind::Replace);
        assert_eq!(specs[1].interval_km, 3_500.0);
    }

    #[test]
    fn test_unknown_kind_has_no_specs() {
        let specs = specs_for_kind(&ComponentKind::Other("mudguard".to_string()));
        assert!(specs.is_empty());
    }

    #[test]
    fn test_replace_interval_skips_distance_exempt() {
        // Battery replacement is time-only; no distance lifespan to derive.
        assert_eq!(replace_interval_km_for_kind(&ComponentKind::Battery), None);
        assert_eq!(
            replace_interval_km_for_kind(&ComponentKind::Cassette),
            Some(10_000.0)
        );
    }

    #[test]
    fn test_no_on_failure_specs_in_catalog() {
        assert!(interval_specs()
            .iter()
            .all(|s| s.service_kind != ServiceKind::OnFailure));
    }
}
