#![deny(clippy::all)]

//! Plan soundness checks.
//!
//! A plan is checked against the zone and vehicle state it was computed
//! from. The checks are independent of the strategy that produced the plan.

use evac_core::{Assignment, Vehicle, Zone};
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("assignment {index}: zone `{zone_id}` is not in the input")]
    UnknownZone { index: usize, zone_id: String },

    #[error("assignment {index}: vehicle `{vehicle_id}` is not in the input")]
    UnknownVehicle { index: usize, vehicle_id: String },

    #[error("assignment {index}: moves nobody")]
    EmptyTrip { index: usize },

    #[error("assignment {index}: ETA {eta_minutes} is not finite")]
    UnreachableTrip { index: usize, eta_minutes: f64 },

    #[error("assignment {index}: {evacuated} people exceed capacity {capacity} of `{vehicle_id}`")]
    TripOverCapacity {
        index: usize,
        vehicle_id: String,
        evacuated: u32,
        capacity: u32,
    },

    #[error("vehicle `{vehicle_id}` carries {booked} people in total, capacity is {capacity}")]
    VehicleOverbooked {
        vehicle_id: String,
        booked: u64,
        capacity: u32,
    },

    #[error("zone `{zone_id}` receives {assigned} people, only {remaining} remained")]
    ZoneOverserved {
        zone_id: String,
        assigned: u64,
        remaining: u32,
    },
}

/// Every violation found, in a stable order: per-assignment findings first,
/// then per-vehicle, then per-zone totals.
pub fn validate_plan(zones: &[Zone], vehicles: &[Vehicle], assignments: &[Assignment]) -> Vec<Violation> {
    let zone_by_id: HashMap<&str, &Zone> = zones.iter().map(|z| (z.id.as_str(), z)).collect();
    let vehicle_by_id: HashMap<&str, &Vehicle> = vehicles.iter().map(|v| (v.id.as_str(), v)).collect();

    let mut violations = Vec::new();
    let mut per_vehicle: HashMap<&str, u64> = HashMap::new();
    let mut per_zone: HashMap<&str, u64> = HashMap::new();

    for (index, a) in assignments.iter().enumerate() {
        if !zone_by_id.contains_key(a.zone_id.as_str()) {
            violations.push(Violation::UnknownZone {
                index,
                zone_id: a.zone_id.clone(),
            });
        }
        if a.evacuated == 0 {
            violations.push(Violation::EmptyTrip { index });
        }
        if !a.eta_minutes.is_finite() {
            violations.push(Violation::UnreachableTrip {
                index,
                eta_minutes: a.eta_minutes,
            });
        }
        match vehicle_by_id.get(a.vehicle_id.as_str()) {
            None => violations.push(Violation::UnknownVehicle {
                index,
                vehicle_id: a.vehicle_id.clone(),
            }),
            Some(v) if a.evacuated > v.capacity => violations.push(Violation::TripOverCapacity {
                index,
                vehicle_id: v.id.clone(),
                evacuated: a.evacuated,
                capacity: v.capacity,
            }),
            Some(_) => {}
        }
        *per_vehicle.entry(a.vehicle_id.as_str()).or_default() += u64::from(a.evacuated);
        *per_zone.entry(a.zone_id.as_str()).or_default() += u64::from(a.evacuated);
    }

    for v in vehicles {
        let booked = per_vehicle.get(v.id.as_str()).copied().unwrap_or(0);
        if booked > u64::from(v.capacity) {
            violations.push(Violation::VehicleOverbooked {
                vehicle_id: v.id.clone(),
                booked,
                capacity: v.capacity,
            });
        }
    }

    for z in zones {
        let assigned = per_zone.get(z.id.as_str()).copied().unwrap_or(0);
        if assigned > u64::from(z.remaining()) {
            violations.push(Violation::ZoneOverserved {
                zone_id: z.id.clone(),
                assigned,
                remaining: z.remaining(),
            });
        }
    }

    if !violations.is_empty() {
        warn!(count = violations.len(), "plan failed validation");
    }
    violations
}
