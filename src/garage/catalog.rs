//! Default parts catalogs.
//!
//! Static list of default parts to seed when a new bike is created, plus the
//! suggested types offered when adding a component manually. Kept in one
//! place so it can later be replaced by a lookup keyed on bike type.
//!
//! Seeded bikes are "basic": tubes, mechanical brakes, no tubeless or
//! suspension parts. POWER and OTHER categories are not seeded.

use crate::garage::types::{ComponentKind, Position};

/// One entry of the default-parts seed catalog.
#[derive(Debug, Clone)]
pub struct SeedPart {
    pub kind: ComponentKind,
    pub name: &'static str,
    pub position: Position,
    pub default_lifespan_km: f64,
}

fn seed(
    kind: ComponentKind,
    name: &'static str,
    position: Position,
    default_lifespan_km: f64,
) -> SeedPart {
    SeedPart {
        kind,
        name,
        position,
        default_lifespan_km,
    }
}

/// Default parts created for every new bike.
/// Order follows bike anatomy: cockpit, frame, drivetrain, wheels, brakes, cables.
pub fn default_parts() -> Vec<SeedPart> {
    use ComponentKind as K;
    use Position as P;
    vec![
        // Cockpit
        seed(K::Handlebars, "Default handlebars", P::None, 50_000.0),
        seed(K::Stem, "Default stem", P::None, 50_000.0),
        seed(K::Headset, "Default headset", P::None, 15_000.0),
        seed(K::HeadsetBearings, "Default headset bearings", P::None, 15_000.0),
        seed(K::BrakeLevers, "Default brake levers (front)", P::Front, 50_000.0),
        seed(K::BrakeLevers, "Default brake levers (rear)", P::Rear, 50_000.0),
        seed(K::ShiftLevers, "Default shift levers (front)", P::Front, 40_000.0),
        seed(K::ShiftLevers, "Default shift levers (rear)", P::Rear, 40_000.0),
        seed(K::BarEnds, "Default bar ends", P::None, 50_000.0),
        seed(K::Grips, "Default grips", P::None, 5_000.0),
        // Frame (includes fork)
        seed(K::Frame, "Default frame", P::None, 100_000.0),
        seed(K::Fork, "Default fork", P::None, 40_000.0),
        seed(K::SeatPost, "Default seat post", P::None, 30_000.0),
        seed(K::Saddle, "Default saddle", P::None, 25_000.0),
        // Drivetrain
        seed(K::Cranks, "Default cranks", P::None, 40_000.0),
        seed(K::Chainring, "Default chainring", P::None, 20_000.0),
        seed(K::Chain, "Default chain", P::None, 3_500.0),
        seed(K::FrontDerailleur, "Default front derailleur", P::Front, 25_000.0),
        seed(K::RearDerailleur, "Default rear derailleur", P::Rear, 25_000.0),
        seed(K::BottomBracket, "Default bottom bracket", P::None, 15_000.0),
        seed(K::Pedals, "Default pedals", P::None, 25_000.0),
        seed(K::Cassette, "Default cassette", P::None, 10_000.0),
        // Wheels: front (hub, spokes, tire, tube, rim)
        seed(K::Hub, "Default hub (front)", P::Front, 50_000.0),
        seed(K::Spokes, "Default spokes (front)", P::Front, 30_000.0),
        seed(K::Tire, "Default tire (front)", P::Front, 4_500.0),
        seed(K::Tube, "Default tube (front)", P::Front, 5_000.0),
        seed(K::Rim, "Default rim (front)", P::Front, 40_000.0),
        // Wheels: rear
        seed(K::Hub, "Default hub (rear)", P::Rear, 50_000.0),
        seed(K::Spokes, "Default spokes (rear)", P::Rear, 30_000.0),
        seed(K::Tire, "Default tire (rear)", P::Rear, 4_500.0),
        seed(K::Tube, "Default tube (rear)", P::Rear, 5_000.0),
        seed(K::Rim, "Default rim (rear)", P::Rear, 40_000.0),
        // Brakes: front and rear (caliper, pads, rotor)
        seed(K::BrakeCaliper, "Default brake caliper (front)", P::Front, 50_000.0),
        seed(K::BrakePads, "Default brake pads (front)", P::Front, 2_000.0),
        seed(K::BrakeRotor, "Default brake rotor (front)", P::Front, 15_000.0),
        seed(K::BrakeCaliper, "Default brake caliper (rear)", P::Rear, 50_000.0),
        seed(K::BrakePads, "Default brake pads (rear)", P::Rear, 2_000.0),
        seed(K::BrakeRotor, "Default brake rotor (rear)", P::Rear, 15_000.0),
        // Cables
        seed(K::CableFrontDerailleur, "Default cable front derailleur", P::None, 6_000.0),
        seed(K::CableRearDerailleur, "Default cable rear derailleur", P::None, 6_000.0),
        seed(K::CableFrontBrake, "Default cable front brake", P::None, 6_000.0),
        seed(K::CableRearBrake, "Default cable rear brake", P::None, 6_000.0),
        seed(K::CableSeatDropper, "Default cable seat dropper", P::None, 8_000.0),
    ]
}

/// Suggested type with display name and default lifespan, offered when a
/// component is added manually (includes parts never auto-seeded, e.g.
/// suspension and tubeless).
#[derive(Debug, Clone)]
pub struct SuggestedType {
    pub kind: ComponentKind,
    pub display_name: &'static str,
    pub default_lifespan_km: f64,
}

/// Suggested types for manual component creation.
pub fn suggested_types() -> Vec<SuggestedType> {
    use ComponentKind as K;
    let entry = |kind, display_name, default_lifespan_km| SuggestedType {
        kind,
        display_name,
        default_lifespan_km,
    };
    vec![
        // Drivetrain (lifespans match the Replace intervals in the service catalog)
        entry(K::Chain, "Chain", 3_500.0),
        entry(K::Cassette, "Cassette", 10_000.0),
        entry(K::Freewheel, "Freewheel", 10_000.0),
        entry(K::Chainring, "Chainring(s)", 20_000.0),
        entry(K::BottomBracket, "Bottom Bracket", 15_000.0),
        entry(K::Cranks, "Cranks", 40_000.0),
        entry(K::Pedals, "Pedals", 25_000.0),
        entry(K::FrontDerailleur, "Front Derailleur", 25_000.0),
        entry(K::RearDerailleur, "Rear Derailleur", 25_000.0),
        // Wheels & tires
        entry(K::Tire, "Tire", 4_500.0),
        entry(K::FrontWheel, "Front Wheel", 20_000.0),
        entry(K::RearWheel, "Rear Wheel", 20_000.0),
        entry(K::TubelessSealant, "Tubeless Sealant", 0.0),
        // Brakes
        entry(K::BrakePads, "Brake Pads", 2_000.0),
        entry(K::BrakeRotor, "Brake Rotor", 15_000.0),
        entry(K::BrakeCables, "Brake Cables / Housing", 6_000.0),
        entry(K::BrakeFluid, "Brake Fluid", 12_000.0),
        // Cockpit
        entry(K::Handlebars, "Handlebars", 50_000.0),
        entry(K::Stem, "Stem", 50_000.0),
        entry(K::Headset, "Headset", 15_000.0),
        entry(K::HeadsetBearings, "Headset Bearings", 15_000.0),
        entry(K::BrakeLevers, "Brake Levers", 50_000.0),
        entry(K::ShiftLevers, "Shift Levers", 40_000.0),
        entry(K::Grips, "Grips", 5_000.0),
        // Frame
        entry(K::Saddle, "Saddle", 25_000.0),
        entry(K::SeatPost, "Seat Post", 30_000.0),
        entry(K::Frame, "Bike Frame", 100_000.0),
        entry(K::Fork, "Fork", 40_000.0),
        // Cables & power
        entry(K::ShiftCables, "Shift Cables / Housing", 6_000.0),
        entry(K::Battery, "Battery (Shifting / eBike)", 0.0),
        // Extra (manual-add: suspension, dropper)
        entry(K::BarEnds, "Bar Ends", 50_000.0),
        entry(K::DropperPost, "Dropper Post", 30_000.0),
        entry(K::RearShock, "Rear Shock", 30_000.0),
        entry(K::SuspensionPivots, "Suspension Pivots", 10_000.0),
    ]
}
