//! SQLite schema definitions.
//!
//! Foreign keys are declared for documentation but cascades are executed
//! explicitly by the store layer, so behavior does not depend on
//! `PRAGMA foreign_keys` being enabled.

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Schema version tracking table.
pub const SCHEMA_VERSION_TABLE: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL
);
";

/// Initial database schema.
pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS bikes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    make TEXT NOT NULL DEFAULT '',
    model TEXT NOT NULL DEFAULT '',
    year TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    total_distance_km REAL NOT NULL DEFAULT 0,
    total_time_seconds INTEGER NOT NULL DEFAULT 0,
    avg_speed_kmh REAL NOT NULL DEFAULT 0,
    max_speed_kmh REAL NOT NULL DEFAULT 0,
    total_elev_gain_m REAL NOT NULL DEFAULT 0,
    total_elev_loss_m REAL NOT NULL DEFAULT 0,
    last_ride_at TEXT,
    chain_replacement_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS components (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bike_id INTEGER REFERENCES bikes(id),
    kind TEXT NOT NULL,
    name TEXT NOT NULL,
    make_model TEXT NOT NULL DEFAULT '',
    lifespan_km REAL NOT NULL,
    distance_used_km REAL NOT NULL DEFAULT 0,
    total_time_seconds INTEGER NOT NULL DEFAULT 0,
    avg_speed_kmh REAL NOT NULL DEFAULT 0,
    max_speed_kmh REAL NOT NULL DEFAULT 0,
    max_speed_bike_id INTEGER,
    position TEXT NOT NULL DEFAULT 'none',
    alert_threshold_percent INTEGER NOT NULL DEFAULT 10,
    alert_snooze_until_km REAL,
    alert_snooze_until_time TEXT,
    alerts_enabled INTEGER NOT NULL DEFAULT 1,
    installed_at TEXT NOT NULL,
    version INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS idx_components_bike_id ON components(bike_id);

CREATE TABLE IF NOT EXISTS service_intervals (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    component_id INTEGER NOT NULL REFERENCES components(id),
    name TEXT NOT NULL,
    interval_km REAL NOT NULL,
    tracked_km REAL NOT NULL DEFAULT 0,
    kind TEXT NOT NULL DEFAULT 'replace',
    interval_time_seconds INTEGER,
    tracked_time_seconds INTEGER
);

CREATE INDEX IF NOT EXISTS idx_service_intervals_component_id
    ON service_intervals(component_id);

CREATE TABLE IF NOT EXISTS component_swaps (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    component_id INTEGER NOT NULL REFERENCES components(id),
    bike_id INTEGER NOT NULL REFERENCES bikes(id),
    installed_at TEXT NOT NULL,
    uninstalled_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_component_swaps_component_id
    ON component_swaps(component_id);
CREATE INDEX IF NOT EXISTS idx_component_swaps_bike_id
    ON component_swaps(bike_id);

CREATE TABLE IF NOT EXISTS rides (
    id TEXT PRIMARY KEY,
    bike_id INTEGER REFERENCES bikes(id),
    distance_km REAL NOT NULL,
    duration_ms INTEGER NOT NULL,
    avg_speed_kmh REAL NOT NULL DEFAULT 0,
    max_speed_kmh REAL NOT NULL DEFAULT 0,
    elev_gain_m REAL NOT NULL DEFAULT 0,
    elev_loss_m REAL NOT NULL DEFAULT 0,
    started_at TEXT NOT NULL,
    ended_at TEXT NOT NULL,
    source TEXT NOT NULL DEFAULT 'app'
);

CREATE INDEX IF NOT EXISTS idx_rides_bike_id ON rides(bike_id);

CREATE TABLE IF NOT EXISTS settings (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
";

/// Version 2: one-to-one context record per component (notes, purchase
/// details, serial number).
pub const MIGRATION_V2: &str = "
CREATE TABLE IF NOT EXISTS component_context (
    component_id INTEGER PRIMARY KEY REFERENCES components(id),
    notes TEXT NOT NULL,
    purchase_url TEXT,
    serial_number TEXT,
    last_service_notes TEXT,
    purchase_price TEXT,
    purchased_at TEXT
);
";
