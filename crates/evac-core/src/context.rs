use crate::config::PlanOptions;
use crate::geo::{distance_km, travel_time_minutes};
use crate::model::{Vehicle, Zone};

/// Private working state for one planning pass.
///
/// Zones and vehicles are deep copies, so capacity and evacuated counts can be
/// consumed freely without touching the registry. Distances are computed once
/// up front.
pub struct PlanningContext {
    /// Working zones in service order: urgency descending, then input order.
    pub zones: Vec<Zone>,
    pub vehicles: Vec<Vehicle>,
    pub options: PlanOptions,

    // Flattened zone x vehicle matrix; `None` when either side lacks coordinates.
    dist_mat: Vec<Option<f64>>,
    speeds: Vec<f64>,
    n_vehicles: usize,
}

/// A vehicle that may serve a zone right now.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub vehicle_idx: usize,
    pub distance_km: f64,
    pub eta_minutes: f64,
    pub capacity: u32,
}

impl PlanningContext {
    pub fn new(zones: &[Zone], vehicles: &[Vehicle], options: &PlanOptions) -> Self {
        let mut ordered: Vec<(usize, &Zone)> = zones.iter().enumerate().collect();
        ordered.sort_by_key(|(idx, zone)| (std::cmp::Reverse(zone.urgency), *idx));
        let zones: Vec<Zone> = ordered.into_iter().map(|(_, z)| z.clone()).collect();
        let vehicles = vehicles.to_vec();

        let n_vehicles = vehicles.len();
        let mut dist_mat = vec![None; zones.len() * n_vehicles];
        for (z_idx, zone) in zones.iter().enumerate() {
            let Some(zc) = zone.coordinates.as_ref() else {
                continue;
            };
            for (v_idx, vehicle) in vehicles.iter().enumerate() {
                if let Some(vc) = vehicle.coordinates.as_ref() {
                    dist_mat[z_idx * n_vehicles + v_idx] = Some(distance_km(zc, vc));
                }
            }
        }

        let speeds = vehicles
            .iter()
            .map(|v| v.effective_speed(options.speed_fallback_kmh))
            .collect();

        PlanningContext {
            zones,
            vehicles,
            options: *options,
            dist_mat,
            speeds,
            n_vehicles,
        }
    }

    pub fn distance(&self, zone_idx: usize, vehicle_idx: usize) -> Option<f64> {
        self.dist_mat[zone_idx * self.n_vehicles + vehicle_idx]
    }

    pub fn speed(&self, vehicle_idx: usize) -> f64 {
        self.speeds[vehicle_idx]
    }

    /// Vehicles with seats left, known coordinates on both sides and within
    /// `max_distance_km`, in registry order. The ETA may still be infinite.
    pub fn candidates(&self, zone_idx: usize) -> impl Iterator<Item = Candidate> + '_ {
        self.vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| v.capacity > 0)
            .filter_map(move |(v_idx, v)| {
                let distance_km = self.distance(zone_idx, v_idx)?;
                if distance_km > self.options.max_distance_km {
                    return None;
                }
                Some(Candidate {
                    vehicle_idx: v_idx,
                    distance_km,
                    eta_minutes: travel_time_minutes(distance_km, self.speed(v_idx)),
                    capacity: v.capacity,
                })
            })
    }

    /// Moves `people` from the working zone into the working vehicle.
    pub fn consume(&mut self, zone_idx: usize, vehicle_idx: usize, people: u32) {
        let vehicle = &mut self.vehicles[vehicle_idx];
        vehicle.capacity = vehicle.capacity.saturating_sub(people);
        let zone = &mut self.zones[zone_idx];
        zone.evacuated = (zone.evacuated + people).min(zone.population);
    }
}
