//! Garage types: bikes, components, swap history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chain replacements on one bike before a drivetrain check is recommended.
pub const CHAIN_REPLACEMENTS_BEFORE_DRIVETRAIN_CHECK: i32 = 3;

/// Mounting position for paired parts (wheels, brakes, derailleur cables).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    /// Unpaired part.
    #[default]
    None,
    Front,
    Rear,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::None => "none",
            Position::Front => "front",
            Position::Rear => "rear",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "front" => Position::Front,
            "rear" => Position::Rear,
            _ => Position::None,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Component categories for grouping. Display order follows bike anatomy:
/// cockpit, frame, drivetrain, wheels, brakes, cables, power.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    Cockpit,
    Frame,
    Drivetrain,
    Wheels,
    Brakes,
    Cables,
    Power,
    Other,
}

/// Component type taxonomy. Closed enum so typos in catalog keys fail at
/// compile time; `Other` preserves free-form values entered by users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    // Cockpit
    Handlebars,
    Stem,
    Headset,
    HeadsetBearings,
    BrakeLevers,
    ShiftLevers,
    BarEnds,
    Grips,
    // Frame
    Frame,
    Fork,
    SeatPost,
    Saddle,
    DropperPost,
    RearShock,
    SuspensionPivots,
    // Drivetrain
    Cranks,
    Chainring,
    Chain,
    FrontDerailleur,
    RearDerailleur,
    BottomBracket,
    Pedals,
    Cassette,
    Freewheel,
    // Wheels
    Hub,
    Spokes,
    Tire,
    Tube,
    Rim,
    FrontWheel,
    RearWheel,
    TubelessSealant,
    // Brakes
    BrakeCaliper,
    BrakePads,
    BrakeRotor,
    BrakeFluid,
    // Cables
    BrakeCables,
    ShiftCables,
    CableFrontDerailleur,
    CableRearDerailleur,
    CableFrontBrake,
    CableRearBrake,
    CableSeatDropper,
    // Power
    Battery,
    /// Unrecognized type; the raw string is kept for display.
    #[serde(untagged)]
    Other(String),
}

impl ComponentKind {
    /// Stable string key used for persistence and catalog lookup.
    pub fn as_str(&self) -> &str {
        match self {
            ComponentKind::Handlebars => "handlebars",
            ComponentKind::Stem => "stem",
            ComponentKind::Headset => "headset",
            ComponentKind::HeadsetBearings => "headset_bearings",
            ComponentKind::BrakeLevers => "brake_levers",
            ComponentKind::ShiftLevers => "shift_levers",
            ComponentKind::BarEnds => "bar_ends",
            ComponentKind::Grips => "grips",
            ComponentKind::Frame => "frame",
            ComponentKind::Fork => "fork",
            ComponentKind::SeatPost => "seat_post",
            ComponentKind::Saddle => "saddle",
            ComponentKind::DropperPost => "dropper_post",
            ComponentKind::RearShock => "rear_shock",
            ComponentKind::SuspensionPivots => "suspension_pivots",
            ComponentKind::Cranks => "cranks",
            ComponentKind::Chainring => "chainring",
            ComponentKind::Chain => "chain",
            ComponentKind::FrontDerailleur => "front_derailleur",
            ComponentKind::RearDerailleur => "rear_derailleur",
            ComponentKind::BottomBracket => "bottom_bracket",
            ComponentKind::Pedals => "pedals",
            ComponentKind::Cassette => "cassette",
            ComponentKind::Freewheel => "freewheel",
            ComponentKind::Hub => "hub",
            ComponentKind::Spokes => "spokes",
            ComponentKind::Tire => "tire",
            ComponentKind::Tube => "tube",
            ComponentKind::Rim => "rim",
            ComponentKind::FrontWheel => "front_wheel",
            ComponentKind::RearWheel => "rear_wheel",
            ComponentKind::TubelessSealant => "tubeless_sealant",
            ComponentKind::BrakeCaliper => "brake_caliper",
            ComponentKind::BrakePads => "brake_pads",
            ComponentKind::BrakeRotor => "brake_rotor",
            ComponentKind::BrakeFluid => "brake_fluid",
            ComponentKind::BrakeCables => "brake_cables",
            ComponentKind::ShiftCables => "shift_cables",
            ComponentKind::CableFrontDerailleur => "cable_front_derailleur",
            ComponentKind::CableRearDerailleur => "cable_rear_derailleur",
            ComponentKind::CableFrontBrake => "cable_front_brake",
            ComponentKind::CableRearBrake => "cable_rear_brake",
            ComponentKind::CableSeatDropper => "cable_seat_dropper",
            ComponentKind::Battery => "battery",
            ComponentKind::Other(s) => s,
        }
    }

    /// Parse a stored key. Unrecognized values become `Other`.
    pub fn parse(s: &str) -> Self {
        match s {
            "handlebars" => ComponentKind::Handlebars,
            "stem" => ComponentKind::Stem,
            "headset" => ComponentKind::Headset,
            "headset_bearings" => ComponentKind::HeadsetBearings,
            "brake_levers" => ComponentKind::BrakeLevers,
            "shift_levers" => ComponentKind::ShiftLevers,
            "bar_ends" => ComponentKind::BarEnds,
            "grips" => ComponentKind::Grips,
            "frame" => ComponentKind::Frame,
            "fork" => ComponentKind::Fork,
            "seat_post" => ComponentKind::SeatPost,
            "saddle" => ComponentKind::Saddle,
            "dropper_post" => ComponentKind::DropperPost,
            "rear_shock" => ComponentKind::RearShock,
            "suspension_pivots" => ComponentKind::SuspensionPivots,
            "cranks" => ComponentKind::Cranks,
            "chainring" => ComponentKind::Chainring,
            "chain" => ComponentKind::Chain,
            "front_derailleur" => ComponentKind::FrontDerailleur,
            "rear_derailleur" => ComponentKind::RearDerailleur,
            "bottom_bracket" => ComponentKind::BottomBracket,
            "pedals" => ComponentKind::Pedals,
            "cassette" => ComponentKind::Cassette,
            "freewheel" => ComponentKind::Freewheel,
            "hub" => ComponentKind::Hub,
            "spokes" => ComponentKind::Spokes,
            "tire" => ComponentKind::Tire,
            "tube" => ComponentKind::Tube,
            "rim" => ComponentKind::Rim,
            "front_wheel" => ComponentKind::FrontWheel,
            "rear_wheel" => ComponentKind::RearWheel,
            "tubeless_sealant" => ComponentKind::TubelessSealant,
            "brake_caliper" => ComponentKind::BrakeCaliper,
            "brake_pads" => ComponentKind::BrakePads,
            "brake_rotor" => ComponentKind::BrakeRotor,
            "brake_fluid" => ComponentKind::BrakeFluid,
            "brake_cables" => ComponentKind::BrakeCables,
            "shift_cables" => ComponentKind::ShiftCables,
            "cable_front_derailleur" => ComponentKind::CableFrontDerailleur,
            "cable_rear_derailleur" => ComponentKind::CableRearDerailleur,
            "cable_front_brake" => ComponentKind::CableFrontBrake,
            "cable_rear_brake" => ComponentKind::CableRearBrake,
            "cable_seat_dropper" => ComponentKind::CableSeatDropper,
            "battery" => ComponentKind::Battery,
            other => ComponentKind::Other(other.to_string()),
        }
    }

    /// Category used for grouping in lists.
    pub fn category(&self) -> ComponentCategory {
        match self {
            ComponentKind::Handlebars
            | ComponentKind::Stem
            | ComponentKind::Headset
            | ComponentKind::HeadsetBearings
            | ComponentKind::BrakeLevers
            | ComponentKind::ShiftLevers
            | ComponentKind::BarEnds
            | ComponentKind::Grips => ComponentCategory::Cockpit,
            ComponentKind::Frame
            | ComponentKind::Fork
            | ComponentKind::SeatPost
            | ComponentKind::Saddle
            | ComponentKind::DropperPost
            | ComponentKind::RearShock
            | ComponentKind::SuspensionPivots => ComponentCategory::Frame,
            ComponentKind::Cranks
            | ComponentKind::Chainring
            | ComponentKind::Chain
            | ComponentKind::FrontDerailleur
            | ComponentKind::RearDerailleur
            | ComponentKind::BottomBracket
            | ComponentKind::Pedals
            | ComponentKind::Cassette
            | ComponentKind::Freewheel => ComponentCategory::Drivetrain,
            ComponentKind::Hub
            | ComponentKind::Spokes
            | ComponentKind::Tire
            | ComponentKind::Tube
            | ComponentKind::Rim
            | ComponentKind::FrontWheel
            | ComponentKind::RearWheel
            | ComponentKind::TubelessSealant => ComponentCategory::Wheels,
            ComponentKind::BrakeCaliper
            | ComponentKind::BrakePads
            | ComponentKind::BrakeRotor
            | ComponentKind::BrakeFluid => ComponentCategory::Brakes,
            ComponentKind::BrakeCables
            | ComponentKind::ShiftCables
            | ComponentKind::CableFrontDerailleur
            | ComponentKind::CableRearDerailleur
            | ComponentKind::CableFrontBrake
            | ComponentKind::CableRearBrake
            | ComponentKind::CableSeatDropper => ComponentCategory::Cables,
            ComponentKind::Battery => ComponentCategory::Power,
            ComponentKind::Other(_) => ComponentCategory::Other,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    /// Human-readable form: underscores become spaces ("bottom_bracket" ->
    /// "bottom bracket"). Unrecognized values display as entered.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().replace('_', " "))
    }
}

/// A bike with denormalized ride roll-ups.
///
/// Totals are mutated only by the ride aggregator and explicit edit/reset
/// operations; avg and max speed are recomputed, all other roll-ups are
/// monotonically non-decreasing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bike {
    pub id: i64,
    pub name: String,
    pub make: String,
    pub model: String,
    pub year: String,
    pub description: String,
    pub total_distance_km: f64,
    pub total_time_seconds: i64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    pub total_elev_gain_m: f64,
    pub total_elev_loss_m: f64,
    pub last_ride_at: Option<DateTime<Utc>>,
    /// Chain replacements since the drivetrain was last renewed. At
    /// `CHAIN_REPLACEMENTS_BEFORE_DRIVETRAIN_CHECK` a cassette/freewheel/
    /// chainring inspection is recommended.
    pub chain_replacement_count: i32,
    pub created_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every update.
    pub version: i64,
}

impl Bike {
    /// Create a new bike with zeroed roll-ups.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            make: String::new(),
            model: String::new(),
            year: String::new(),
            description: String::new(),
            total_distance_km: 0.0,
            total_time_seconds: 0,
            avg_speed_kmh: 0.0,
            max_speed_kmh: 0.0,
            total_elev_gain_m: 0.0,
            total_elev_loss_m: 0.0,
            last_ride_at: None,
            chain_replacement_count: 0,
            created_at: Utc::now(),
            version: 0,
        }
    }

    /// Advisory flag: enough chain replacements to warrant checking the
    /// cassette, freewheel, and chainrings for wear.
    pub fn recommends_drivetrain_check(&self) -> bool {
        self.chain_replacement_count >= CHAIN_REPLACEMENTS_BEFORE_DRIVETRAIN_CHECK
    }
}

/// A bike component with wear tracking and alert configuration.
///
/// `bike_id` is the single source of truth for "currently installed"; the
/// swap ledger is a derived historical log and is never reconciled backward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,
    /// None means the component sits in the garage, unassigned.
    pub bike_id: Option<i64>,
    pub kind: ComponentKind,
    pub name: String,
    pub make_model: String,
    /// Expected lifespan in km; used to compute health %.
    pub lifespan_km: f64,
    /// Distance used since install (or since last replacement).
    pub distance_used_km: f64,
    /// Ride time accrued while installed, in seconds.
    pub total_time_seconds: i64,
    pub avg_speed_kmh: f64,
    pub max_speed_kmh: f64,
    /// Bike the max-speed record was set on (ties go to the newest ride).
    pub max_speed_bike_id: Option<i64>,
    pub position: Position,
    /// Alert when health % is at or below this value.
    pub alert_threshold_percent: i32,
    /// Suppress alerts while `distance_used_km` is below this bound.
    pub alert_snooze_until_km: Option<f64>,
    /// Suppress alerts until this instant.
    pub alert_snooze_until_time: Option<DateTime<Utc>>,
    pub alerts_enabled: bool,
    pub installed_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every update.
    pub version: i64,
}

impl Component {
    /// Create a new component on a bike (or in the garage when `bike_id` is
    /// None) with zeroed usage.
    pub fn new(
        bike_id: Option<i64>,
        kind: ComponentKind,
        name: impl Into<String>,
        lifespan_km: f64,
    ) -> Self {
        Self {
            id: 0,
            bike_id,
            kind,
            name: name.into(),
            make_model: String::new(),
            lifespan_km,
            distance_used_km: 0.0,
            total_time_seconds: 0,
            avg_speed_kmh: 0.0,
            max_speed_kmh: 0.0,
            max_speed_bike_id: None,
            position: Position::None,
            alert_threshold_percent: crate::storage::preferences::DEFAULT_ALERT_THRESHOLD_PERCENT,
            alert_snooze_until_km: None,
            alert_snooze_until_time: None,
            alerts_enabled: true,
            installed_at: Utc::now(),
            version: 0,
        }
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    pub fn with_alert_threshold(mut self, percent: i32) -> Self {
        self.alert_threshold_percent = percent;
        self
    }
}

/// One install/uninstall event in a component's history.
/// `uninstalled_at == None` means the component is still on that bike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentSwap {
    pub id: i64,
    pub component_id: i64,
    pub bike_id: i64,
    pub installed_at: DateTime<Utc>,
    pub uninstalled_at: Option<DateTime<Utc>>,
}

/// Free-form context attached to one component: notes, purchase details,
/// serial number. One record per component at most; lives and dies with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentContext {
    pub component_id: i64,
    /// Required; saving blank notes is rejected.
    pub notes: String,
    /// Product or shop page. Must be an http(s) URL when set.
    pub purchase_url: Option<String>,
    pub serial_number: Option<String>,
    pub last_service_notes: Option<String>,
    /// Kept as entered ("$125", "120 EUR"); never used for arithmetic.
    pub purchase_price: Option<String>,
    pub purchased_at: Option<DateTime<Utc>>,
}

impl ComponentContext {
    pub fn new(component_id: i64, notes: impl Into<String>) -> Self {
        Self {
            component_id,
            notes: notes.into(),
            purchase_url: None,
            serial_number: None,
            last_service_notes: None,
            purchase_price: None,
            purchased_at: None,
        }
    }
}
