//! Runs a planner and turns its raw assignments into a caller-facing plan.

use crate::enrich::{enrich, EnrichedAssignment};
use crate::summary::PlanSummary;
use chrono::{DateTime, Local, TimeZone};
use evac_core::{Assignment, PlanOptions, Planner, Strategy, Vehicle, Zone};
use evac_greedy::GreedyPlanner;
use evac_weighted::WeightedPlanner;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvacuationPlan {
    pub strategy: Strategy,
    pub assignments: Vec<EnrichedAssignment>,
    pub summary: PlanSummary,
    pub options: PlanOptions,
}

pub fn planner_for(strategy: Strategy) -> &'static dyn Planner {
    match strategy {
        Strategy::Greedy => &GreedyPlanner,
        Strategy::Weighted => &WeightedPlanner,
    }
}

pub fn generate_plan(
    zones: &[Zone],
    vehicles: &[Vehicle],
    strategy: Strategy,
    options: &PlanOptions,
) -> EvacuationPlan {
    generate_plan_at(zones, vehicles, strategy, options, &Local::now())
}

/// [`generate_plan`] against an explicit clock; identical input and clock
/// give an identical plan.
pub fn generate_plan_at<Tz>(
    zones: &[Zone],
    vehicles: &[Vehicle],
    strategy: Strategy,
    options: &PlanOptions,
    now: &DateTime<Tz>,
) -> EvacuationPlan
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let raw = planner_for(strategy).plan(zones, vehicles, options);
    assemble_plan(zones, vehicles, strategy, options, &raw, now)
}

/// Enriches `raw` and computes the summary. `zones` and `vehicles` must be
/// the state the planner saw.
pub fn assemble_plan<Tz>(
    zones: &[Zone],
    vehicles: &[Vehicle],
    strategy: Strategy,
    options: &PlanOptions,
    raw: &[Assignment],
    now: &DateTime<Tz>,
) -> EvacuationPlan
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let zone_by_id: HashMap<&str, &Zone> = zones.iter().map(|z| (z.id.as_str(), z)).collect();
    let vehicle_by_id: HashMap<&str, &Vehicle> = vehicles.iter().map(|v| (v.id.as_str(), v)).collect();

    let assignments: Vec<EnrichedAssignment> = raw
        .iter()
        .filter_map(|a| {
            match (zone_by_id.get(a.zone_id.as_str()), vehicle_by_id.get(a.vehicle_id.as_str())) {
                (Some(zone), Some(vehicle)) => Some(enrich(a, zone, vehicle, options.speed_fallback_kmh, now)),
                _ => {
                    warn!(zone = %a.zone_id, vehicle = %a.vehicle_id, "assignment references unknown id, dropped");
                    None
                }
            }
        })
        .collect();

    let summary = PlanSummary::build(zones, &assignments);
    info!(
        %strategy,
        zones = zones.len(),
        vehicles = vehicles.len(),
        assignments = assignments.len(),
        people = summary.total_people_to_evacuate,
        "evacuation plan generated"
    );

    EvacuationPlan {
        strategy,
        assignments,
        summary,
        options: *options,
    }
}
