use evac_core::{Assignment, Coordinate, PlanOptions, Urgency, Vehicle, VehicleType, Zone};
use evac_validation::validate_plan;
use evac_weighted::{plan, weighted_score};

fn zone(id: &str, lat: f64, lon: f64, population: u32, urgency: u8) -> Zone {
    Zone {
        id: id.into(),
        external_id: Some(id.into()),
        location: None,
        coordinates: Some(Coordinate::new(lat, lon)),
        population,
        urgency: Urgency::new(urgency).unwrap(),
        evacuated: 0,
        last_vehicle_used: None,
    }
}

fn vehicle(id: &str, lat: f64, lon: f64, capacity: u32, speed: f64) -> Vehicle {
    Vehicle {
        id: id.into(),
        external_id: Some(id.into()),
        location: None,
        coordinates: Some(Coordinate::new(lat, lon)),
        capacity,
        kind: VehicleType::Van,
        speed_kmh: Some(speed),
    }
}

fn run(zones: &[Zone], vehicles: &[Vehicle]) -> Vec<Assignment> {
    let assignments = plan(zones, vehicles, &PlanOptions::default());
    let violations = validate_plan(zones, vehicles, &assignments);
    assert!(violations.is_empty(), "{violations:?}");
    assignments
}

fn ids(assignments: &[Assignment]) -> Vec<(&str, &str, u32)> {
    assignments
        .iter()
        .map(|a| (a.zone_id.as_str(), a.vehicle_id.as_str(), a.evacuated))
        .collect()
}

#[test]
fn snug_fit_scores_below_oversized_vehicle() {
    let z = zone("Z1", 13.75, 100.5, 40, 4);
    let snug = vehicle("V40", 13.76, 100.51, 40, 50.0);
    let roomy = vehicle("V80", 13.76, 100.51, 80, 50.0);

    let snug_score = weighted_score(&z, &snug, 40.0);
    let roomy_score = weighted_score(&z, &roomy, 40.0);
    assert!(snug_score < roomy_score);
    assert!((roomy_score - snug_score - 500.0).abs() < 1e-9);

    let assignments = run(&[z], &[roomy, snug]);
    assert_eq!(ids(&assignments), [("Z1", "V40", 40)]);
}

#[test]
fn score_is_infinite_without_coordinates_or_speed() {
    let z = zone("Z1", 13.75, 100.5, 10, 3);
    let mut lost = vehicle("V1", 13.75, 100.5, 10, 40.0);
    lost.coordinates = None;
    let parked = vehicle("V2", 13.75, 100.5, 10, 0.0);

    assert!(weighted_score(&z, &lost, 40.0).is_infinite());
    assert!(weighted_score(&z, &parked, 40.0).is_infinite());
}

#[test]
fn missing_speed_falls_back_to_configured_value() {
    let z = zone("Z1", 13.75, 100.5, 10, 3);
    let mut unknown = vehicle("V1", 14.0, 100.5, 10, 40.0);
    unknown.speed_kmh = None;
    let known = vehicle("V1", 14.0, 100.5, 10, 40.0);

    assert_eq!(weighted_score(&z, &unknown, 40.0), weighted_score(&z, &known, 40.0));
}

#[test]
fn each_zone_gets_at_most_one_vehicle_per_call() {
    let zones = [zone("Z1", 13.75, 100.5, 70, 5)];
    let vehicles = [
        vehicle("V1", 13.76, 100.51, 40, 60.0),
        vehicle("V2", 13.77, 100.52, 20, 50.0),
        vehicle("V3", 13.78, 100.53, 10, 40.0),
    ];

    let assignments = run(&zones, &vehicles);
    assert_eq!(ids(&assignments), [("Z1", "V1", 40)]);
}

#[test]
fn urgent_zone_picks_before_calmer_one() {
    let zones = [
        zone("Z2", 13.751, 100.501, 20, 3),
        zone("Z1", 13.9, 100.9, 20, 5),
    ];
    let vehicles = [vehicle("V1", 13.75, 100.5, 20, 60.0)];

    let assignments = run(&zones, &vehicles);
    assert_eq!(ids(&assignments), [("Z1", "V1", 20)]);
}

#[test]
fn equal_scores_prefer_vehicle_moving_more_people() {
    let zones = [zone("Z1", 13.75, 100.5, 30, 4)];
    let vehicles = [
        vehicle("SMALL", 13.76, 100.51, 10, 50.0),
        vehicle("LARGE", 13.76, 100.51, 20, 50.0),
    ];

    let assignments = run(&zones, &vehicles);
    assert_eq!(ids(&assignments), [("Z1", "LARGE", 20)]);
}

#[test]
fn identical_vehicles_tie_to_registry_order() {
    let zones = [zone("Z1", 13.75, 100.5, 10, 4)];
    let vehicles = [
        vehicle("FIRST", 13.76, 100.51, 10, 50.0),
        vehicle("SECOND", 13.76, 100.51, 10, 50.0),
    ];

    assert_eq!(ids(&run(&zones, &vehicles)), [("Z1", "FIRST", 10)]);
}

#[test]
fn zero_speed_vehicle_is_never_picked() {
    let zones = [zone("Z1", 13.75, 100.5, 10, 5)];
    let parked = vehicle("V0", 13.75, 100.5, 10, 0.0);
    let moving = vehicle("V1", 13.95, 100.7, 10, 30.0);

    assert_eq!(ids(&run(&zones, &[parked.clone(), moving])), [("Z1", "V1", 10)]);
    assert!(run(&zones, &[parked]).is_empty());
}

#[test]
fn spent_vehicle_is_unavailable_to_later_zones() {
    let zones = [
        zone("Z1", 13.75, 100.5, 40, 5),
        zone("Z2", 13.75, 100.5, 40, 4),
    ];
    let vehicles = [vehicle("V1", 13.76, 100.51, 40, 50.0)];

    assert_eq!(ids(&run(&zones, &vehicles)), [("Z1", "V1", 40)]);
}

#[test]
fn vehicle_with_seats_left_serves_next_zone() {
    let zones = [
        zone("Z1", 13.75, 100.5, 10, 5),
        zone("Z2", 13.76, 100.5, 20, 3),
    ];
    let vehicles = [vehicle("V1", 13.76, 100.51, 40, 50.0)];

    assert_eq!(
        ids(&run(&zones, &vehicles)),
        [("Z1", "V1", 10), ("Z2", "V1", 20)]
    );
}

#[test]
fn distance_cutoff_excludes_far_vehicles() {
    let zones = [zone("Z1", 13.75, 100.5, 10, 5)];
    let vehicles = [vehicle("FAR", 14.5, 100.5, 10, 120.0)];
    let options = PlanOptions {
        max_distance_km: 50.0,
        ..PlanOptions::default()
    };

    assert_eq!(run(&zones, &vehicles).len(), 1);
    assert!(plan(&zones, &vehicles, &options).is_empty());
}

#[test]
fn empty_inputs_and_finished_zones_yield_nothing() {
    let mut done = zone("Z1", 13.75, 100.5, 10, 5);
    done.evacuated = 10;
    let vehicles = [vehicle("V1", 13.75, 100.5, 10, 40.0)];

    assert!(run(&[], &vehicles).is_empty());
    assert!(run(&[zone("Z2", 13.75, 100.5, 10, 5)], &[]).is_empty());
    assert!(run(&[done], &vehicles).is_empty());
}

#[test]
fn planning_is_deterministic() {
    let zones = [
        zone("Z1", 13.75, 100.5, 60, 5),
        zone("Z2", 13.7, 100.55, 30, 3),
        zone("Z3", 13.8, 100.45, 15, 3),
    ];
    let vehicles = [
        vehicle("V1", 13.8, 100.6, 40, 60.0),
        vehicle("V2", 13.72, 100.58, 20, 50.0),
        vehicle("V3", 13.79, 100.44, 15, 45.0),
    ];

    assert_eq!(run(&zones, &vehicles), run(&zones, &vehicles));
}
