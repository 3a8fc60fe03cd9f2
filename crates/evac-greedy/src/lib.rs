#![deny(clippy::all)]

//! Greedy nearest-fit planner.
//!
//! Zones are served strictly in urgency order. For the zone at hand the
//! planner keeps picking the vehicle with the lowest
//! `eta_minutes + wasted_seats` until the zone is drained or no vehicle
//! qualifies. There is no lookahead: a vehicle spent on an early zone is gone
//! for later ones even if it would have suited them better.

use evac_core::{Assignment, Candidate, PlanOptions, Planner, PlanningContext, Vehicle, Zone};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default)]
pub struct GreedyPlanner;

impl Planner for GreedyPlanner {
    fn plan(&self, zones: &[Zone], vehicles: &[Vehicle], options: &PlanOptions) -> Vec<Assignment> {
        plan(zones, vehicles, options)
    }
}

/// Travel time plus one point per seat left empty.
#[inline]
pub fn greedy_score(candidate: &Candidate, remaining: u32) -> f64 {
    candidate.eta_minutes + f64::from(candidate.capacity.saturating_sub(remaining))
}

/// Lowest score wins. On a tied score the larger vehicle wins when
/// `prefer_fewer_trips` is set, otherwise the vehicle met first keeps the slot.
fn choose_best_vehicle(ctx: &PlanningContext, zone_idx: usize) -> Option<Candidate> {
    let remaining = ctx.zones[zone_idx].remaining();
    let prefer_larger = ctx.options.prefer_fewer_trips;
    let mut best: Option<Candidate> = None;
    let mut best_score = f64::INFINITY;

    for candidate in ctx.candidates(zone_idx) {
        let score = greedy_score(&candidate, remaining);
        let larger_on_tie = prefer_larger
            && score == best_score
            && best.as_ref().is_some_and(|b| candidate.capacity > b.capacity);
        if score < best_score || larger_on_tie {
            best_score = score;
            best = Some(candidate);
        }
    }
    best
}

fn drain_zone(ctx: &mut PlanningContext, zone_idx: usize, plan: &mut Vec<Assignment>) {
    let mut trips = 0usize;

    while ctx.zones[zone_idx].remaining() > 0 {
        let Some(pick) = choose_best_vehicle(ctx, zone_idx) else {
            break;
        };

        let people = pick.capacity.min(ctx.zones[zone_idx].remaining());
        let assignment = Assignment {
            zone_id: ctx.zones[zone_idx].id.clone(),
            vehicle_id: ctx.vehicles[pick.vehicle_idx].id.clone(),
            eta_minutes: pick.eta_minutes,
            evacuated: people,
        };
        debug!(
            zone = %assignment.zone_id,
            vehicle = %assignment.vehicle_id,
            people,
            eta_minutes = pick.eta_minutes,
            "greedy trip"
        );
        plan.push(assignment);
        ctx.consume(zone_idx, pick.vehicle_idx, people);
        trips += 1;

        if !ctx.options.allow_multi_vehicle {
            break;
        }
    }

    let zone = &ctx.zones[zone_idx];
    if zone.remaining() > 0 && zone.coordinates.is_some() {
        warn!(zone = %zone.id, trips, unserved = zone.remaining(), "zone left partially unserved");
    }
}

pub fn plan(zones: &[Zone], vehicles: &[Vehicle], options: &PlanOptions) -> Vec<Assignment> {
    let mut ctx = PlanningContext::new(zones, vehicles, options);
    let mut plan = Vec::new();

    for zone_idx in 0..ctx.zones.len() {
        drain_zone(&mut ctx, zone_idx, &mut plan);
    }

    info!(
        zones = zones.len(),
        vehicles = vehicles.len(),
        assignments = plan.len(),
        "greedy plan built"
    );
    plan
}
