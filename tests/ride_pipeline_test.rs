//! Integration test for the ride-to-service pipeline.
//!
//! Runs the whole flow against a real on-disk database: create a bike with
//! a chain, log rides through the aggregator, watch the chain surface on the
//! due list, replace it, and confirm the clocks restart.

use chrono::Utc;
use bikegarage::garage::bike_store::BikeStore;
use bikegarage::garage::component_store::ComponentStore;
use bikegarage::garage::types::{Bike, Component, ComponentKind};
use bikegarage::rides::aggregator::RideAggregator;
use bikegarage::rides::types::Ride;
use bikegarage::service::due_list::{DueListFilter, DueListPlanner, SortOrder};
use bikegarage::service::interval_store::ServiceIntervalStore;
use bikegarage::storage::database::Database;
use bikegarage::storage::preferences::PreferencesStore;

fn ride(bike_id: i64, distance_km: f64, hours: f64, max_kmh: f64) -> Ride {
    let ended_at = Utc::now();
    let mut r = Ride::new(
        Some(bike_id),
        ended_at - chrono::Duration::seconds((hours * 3600.0) as i64),
        ended_at,
    );
    r.distance_km = distance_km;
    r.duration_ms = (hours * 3_600_000.0) as i64;
    r.max_speed_kmh = max_kmh;
    r.avg_speed_kmh = distance_km / hours;
    r
}

#[test]
fn test_ride_to_due_list_to_replacement() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garage.db");
    let db = Database::open(&path).unwrap();
    let conn = db.connection();

    let bike_id = BikeStore::new(conn).insert(&Bike::new("Commuter")).unwrap();
    let chain_id = ComponentStore::new(conn)
        .insert(&Component::new(
            Some(bike_id),
            ComponentKind::Chain,
            "KMC X11",
            3_500.0,
        ))
        .unwrap();

    // Nothing due on a fresh chain
    let planner = DueListPlanner::new(conn);
    assert!(planner
        .build_due_list(&DueListFilter::default(), SortOrder::Health)
        .unwrap()
        .is_empty());

    // Ride until the chain's replace interval crosses the 20% threshold
    let aggregator = RideAggregator::new(conn);
    for _ in 0..10 {
        aggregator.apply(&ride(bike_id, 300.0, 12.0, 38.0)).unwrap();
    }

    let bike = BikeStore::new(conn).get(bike_id).unwrap().unwrap();
    assert_eq!(bike.total_distance_km, 3_000.0);
    assert_eq!(bike.total_time_seconds, 10 * 12 * 3600);
    assert!((bike.avg_speed_kmh - 25.0).abs() < 1e-9);
    assert_eq!(bike.max_speed_kmh, 38.0);

    // The 250 km inspect clock ran out long ago, pinning health at 0
    let due = planner
        .build_due_list(&DueListFilter::default(), SortOrder::Health)
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].component.id, chain_id);
    assert_eq!(due[0].health_percent, 0);

    // Cleaning the chain clears the inspect clock; what remains is the
    // replace interval at 3000 of 3500 km
    let outcome = planner.inspect_selected(&[chain_id]).unwrap();
    assert_eq!(outcome.completed, 1);
    let due = planner
        .build_due_list(&DueListFilter::default(), SortOrder::Health)
        .unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].health_percent, 14);

    // Replace it; the due list empties and the counter advances
    let outcome = planner.replace_selected(&[chain_id], Utc::now()).unwrap();
    assert_eq!(outcome.completed, 1);
    assert!(outcome.failures.is_empty());
    assert!(planner
        .build_due_list(&DueListFilter::default(), SortOrder::Health)
        .unwrap()
        .is_empty());

    let chain = ComponentStore::new(conn).get(chain_id).unwrap().unwrap();
    assert_eq!(chain.distance_used_km, 0.0);
    let bike = BikeStore::new(conn).get(bike_id).unwrap().unwrap();
    assert_eq!(bike.chain_replacement_count, 1);
    // Bike totals are not unwound by a component replacement
    assert_eq!(bike.total_distance_km, 3_000.0);
}

#[test]
fn test_rollups_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garage.db");

    let bike_id;
    {
        let db = Database::open(&path).unwrap();
        bike_id = BikeStore::new(db.connection())
            .insert(&Bike::new("Tourer"))
            .unwrap();
        ComponentStore::new(db.connection())
            .insert(&Component::new(
                Some(bike_id),
                ComponentKind::Cassette,
                "Cassette",
                10_000.0,
            ))
            .unwrap();
        RideAggregator::new(db.connection())
            .apply(&ride(bike_id, 80.0, 4.0, 45.0))
            .unwrap();
    }

    let db = Database::open(&path).unwrap();
    let bike = BikeStore::new(db.connection()).get(bike_id).unwrap().unwrap();
    assert_eq!(bike.total_distance_km, 80.0);

    let components = ComponentStore::new(db.connection())
        .list_for_bike(bike_id)
        .unwrap();
    assert_eq!(components.len(), 1);
    assert_eq!(components[0].distance_used_km, 80.0);

    let intervals = ServiceIntervalStore::new(db.connection())
        .list_for_component(components[0].id)
        .unwrap();
    assert!(intervals.iter().all(|i| i.tracked_km == 80.0));
}

#[test]
fn test_threshold_preference_drives_due_list() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.connection();
    let bike_id = BikeStore::new(conn).insert(&Bike::new("B")).unwrap();
    ComponentStore::new(conn)
        .insert(&Component::new(
            Some(bike_id),
            ComponentKind::Other("rack".into()),
            "Rear rack",
            1_000.0,
        ))
        .unwrap();
    RideAggregator::new(conn)
        .apply(&ride(bike_id, 600.0, 30.0, 25.0))
        .unwrap();

    // 40% health: hidden at the default threshold of 20
    let planner = DueListPlanner::new(conn);
    assert!(planner
        .build_due_list(&DueListFilter::default(), SortOrder::Health)
        .unwrap()
        .is_empty());

    PreferencesStore::new(conn)
        .set_close_to_service_threshold(50)
        .unwrap();
    assert_eq!(
        planner
            .build_due_list(&DueListFilter::default(), SortOrder::Health)
            .unwrap()
            .len(),
        1
    );
}
