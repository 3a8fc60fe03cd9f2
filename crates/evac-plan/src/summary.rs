use crate::enrich::EnrichedAssignment;
use evac_core::geo::round2;
use evac_core::Zone;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Plan-level aggregates. Averages and totals are rounded to two decimals
/// and are zero for an empty plan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_vehicles_assigned: usize,
    pub total_people_to_evacuate: u64,
    /// Zones at urgency 4 or 5 across everything registered, assigned or not.
    pub high_priority_zones: usize,
    #[serde(rename = "averageDistance")]
    pub average_distance_km: f64,
    #[serde(rename = "averageTravelTime")]
    pub average_travel_time_hours: f64,
    pub zones_fully_covered: usize,
    pub zones_partially_covered: usize,
    pub total_distance_km: f64,
}

impl PlanSummary {
    /// `zones` is the pre-plan state; coverage compares against its
    /// remaining need.
    pub fn build(zones: &[Zone], assignments: &[EnrichedAssignment]) -> Self {
        let high_priority_zones = zones.iter().filter(|z| z.urgency.is_high()).count();
        if assignments.is_empty() {
            return PlanSummary {
                high_priority_zones,
                ..PlanSummary::default()
            };
        }

        let vehicles: HashSet<&str> = assignments.iter().map(|a| a.vehicle_id.as_str()).collect();
        let mut per_zone: HashMap<&str, u64> = HashMap::new();
        for a in assignments {
            *per_zone.entry(a.zone_id.as_str()).or_default() += u64::from(a.people_to_evacuate);
        }

        let (mut fully, mut partially) = (0, 0);
        for zone in zones {
            match per_zone.get(zone.id.as_str()) {
                Some(&assigned) if assigned >= u64::from(zone.remaining()) => fully += 1,
                Some(_) => partially += 1,
                None => {}
            }
        }

        let n = assignments.len() as f64;
        let total_distance: f64 = assignments.iter().map(|a| a.distance_km).sum();
        let total_hours: f64 = assignments.iter().map(|a| a.travel_time_hours).sum();

        PlanSummary {
            total_vehicles_assigned: vehicles.len(),
            total_people_to_evacuate: assignments.iter().map(|a| u64::from(a.people_to_evacuate)).sum(),
            high_priority_zones,
            average_distance_km: round2(total_distance / n),
            average_travel_time_hours: round2(total_hours / n),
            zones_fully_covered: fully,
            zones_partially_covered: partially,
            total_distance_km: round2(total_distance),
        }
    }
}
