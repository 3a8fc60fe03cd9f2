#![deny(clippy::all)]

//! Weighted multi-factor planner.
//!
//! Every zone/vehicle pair gets four normalised sub-scores (lower is better):
//!
//! ```text
//! urgency  = 10000 * (6 - level)
//! capacity =  1000 * (1 - min(remaining, capacity) / capacity)
//! distance =   100 * min(distance_km, 100) / 100
//! eta      =    10 * min(eta_minutes, 300) / 300
//! ```
//!
//! Each weight exceeds the largest possible sum of the weights below it, so
//! the factors are compared lexicographically. Each zone receives at most one
//! vehicle per call; a zone bigger than its best vehicle stays partially
//! covered until planning runs again.

use evac_core::geo::{distance_km, travel_time_minutes};
use evac_core::{Assignment, Candidate, PlanOptions, Planner, PlanningContext, Urgency, Vehicle, Zone};
use serde::Serialize;
use tracing::{debug, info};

pub const URGENCY_WEIGHT: f64 = 10_000.0;
pub const CAPACITY_WEIGHT: f64 = 1_000.0;
pub const DISTANCE_WEIGHT: f64 = 100.0;
pub const ETA_WEIGHT: f64 = 10.0;

pub const DISTANCE_CAP_KM: f64 = 100.0;
pub const ETA_CAP_MINUTES: f64 = 300.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedPlanner;

impl Planner for WeightedPlanner {
    fn plan(&self, zones: &[Zone], vehicles: &[Vehicle], options: &PlanOptions) -> Vec<Assignment> {
        plan(zones, vehicles, options)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub urgency: f64,
    pub capacity: f64,
    pub distance: f64,
    pub eta: f64,
}

impl ScoreBreakdown {
    /// `None` when the pair cannot be scored: no seats, or an unbounded ETA.
    pub fn compute(
        urgency: Urgency,
        remaining: u32,
        capacity: u32,
        distance_km: f64,
        eta_minutes: f64,
    ) -> Option<Self> {
        if capacity == 0 || !eta_minutes.is_finite() || !distance_km.is_finite() {
            return None;
        }
        let level = urgency.level().clamp(Urgency::MIN, Urgency::MAX);
        let utilisation = f64::from(remaining.min(capacity)) / f64::from(capacity);

        Some(ScoreBreakdown {
            urgency: URGENCY_WEIGHT * f64::from(6 - level),
            capacity: CAPACITY_WEIGHT * (1.0 - utilisation),
            distance: DISTANCE_WEIGHT * (distance_km.min(DISTANCE_CAP_KM) / DISTANCE_CAP_KM),
            eta: ETA_WEIGHT * (eta_minutes.min(ETA_CAP_MINUTES) / ETA_CAP_MINUTES),
        })
    }

    pub fn total(&self) -> f64 {
        self.urgency + self.capacity + self.distance + self.eta
    }
}

/// Score of sending `vehicle` to `zone` as they stand; `+inf` when either
/// side lacks coordinates or the vehicle cannot move.
pub fn weighted_score(zone: &Zone, vehicle: &Vehicle, speed_fallback_kmh: f64) -> f64 {
    let (Some(zc), Some(vc)) = (zone.coordinates.as_ref(), vehicle.coordinates.as_ref()) else {
        return f64::INFINITY;
    };
    let distance = distance_km(zc, vc);
    let eta = travel_time_minutes(distance, vehicle.effective_speed(speed_fallback_kmh));

    ScoreBreakdown::compute(zone.urgency, zone.remaining(), vehicle.capacity, distance, eta)
        .map_or(f64::INFINITY, |s| s.total())
}

fn score_candidate(zone: &Zone, candidate: &Candidate) -> f64 {
    ScoreBreakdown::compute(
        zone.urgency,
        zone.remaining(),
        candidate.capacity,
        candidate.distance_km,
        candidate.eta_minutes,
    )
    .map_or(f64::INFINITY, |s| s.total())
}

struct Pick {
    candidate: Candidate,
    score: f64,
    people: u32,
}

/// Lowest score, then most people moved, then registry order.
fn choose_best_vehicle(ctx: &PlanningContext, zone_idx: usize) -> Option<Pick> {
    let zone = &ctx.zones[zone_idx];
    let remaining = zone.remaining();
    let mut best: Option<Pick> = None;

    for candidate in ctx.candidates(zone_idx) {
        let score = score_candidate(zone, &candidate);
        if !score.is_finite() {
            continue;
        }
        let people = candidate.capacity.min(remaining);
        let better = match &best {
            None => true,
            Some(b) => score < b.score || (score == b.score && people > b.people),
        };
        if better {
            best = Some(Pick {
                candidate,
                score,
                people,
            });
        }
    }
    best
}

pub fn plan(zones: &[Zone], vehicles: &[Vehicle], options: &PlanOptions) -> Vec<Assignment> {
    let mut ctx = PlanningContext::new(zones, vehicles, options);
    let mut plan = Vec::new();

    for zone_idx in 0..ctx.zones.len() {
        if !ctx.zones[zone_idx].needs_evacuation() {
            continue;
        }
        let Some(pick) = choose_best_vehicle(&ctx, zone_idx) else {
            continue;
        };

        let assignment = Assignment {
            zone_id: ctx.zones[zone_idx].id.clone(),
            vehicle_id: ctx.vehicles[pick.candidate.vehicle_idx].id.clone(),
            eta_minutes: pick.candidate.eta_minutes,
            evacuated: pick.people,
        };
        debug!(
            zone = %assignment.zone_id,
            vehicle = %assignment.vehicle_id,
            people = pick.people,
            score = pick.score,
            "weighted trip"
        );
        plan.push(assignment);
        ctx.consume(zone_idx, pick.candidate.vehicle_idx, pick.people);
    }

    info!(
        zones = zones.len(),
        vehicles = vehicles.len(),
        assignments = plan.len(),
        "weighted plan built"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(l: u8) -> Urgency {
        Urgency::new(l).unwrap()
    }

    #[test]
    fn sub_scores_follow_their_formulas() {
        let s = ScoreBreakdown::compute(level(4), 30, 40, 50.0, 150.0).unwrap();
        assert_eq!(s.urgency, 20_000.0);
        assert_eq!(s.capacity, 250.0);
        assert_eq!(s.distance, 50.0);
        assert_eq!(s.eta, 5.0);
        assert_eq!(s.total(), 20_305.0);
    }

    #[test]
    fn distance_and_eta_are_clamped() {
        let s = ScoreBreakdown::compute(level(5), 10, 10, 250.0, 900.0).unwrap();
        assert_eq!(s.distance, DISTANCE_WEIGHT);
        assert_eq!(s.eta, ETA_WEIGHT);
    }

    #[test]
    fn urgency_dominates_every_other_factor() {
        let worst_urgent = ScoreBreakdown::compute(level(5), 1, 1000, 1e6, 1e6).unwrap();
        let best_calm = ScoreBreakdown::compute(level(4), 10, 10, 0.0, 0.0).unwrap();
        assert!(worst_urgent.total() < best_calm.total());
    }

    #[test]
    fn unbounded_eta_or_empty_vehicle_cannot_be_scored() {
        assert!(ScoreBreakdown::compute(level(3), 10, 10, 1.0, f64::INFINITY).is_none());
        assert!(ScoreBreakdown::compute(level(3), 10, 0, 1.0, 1.0).is_none());
    }
}
