//! In-memory store of registered zones and vehicles.
//!
//! The registry is the only place where zone state changes outside of a
//! planning pass. Planners receive copies from [`Registry::snapshot`].

use crate::error::{EvacError, FieldIssue, Result};
use crate::input::{VehicleInput, ZoneInput};
use crate::model::{Vehicle, Zone, ZoneStatus};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::collections::HashSet;
use tracing::{debug, info, warn};

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_LEN: usize = 9;

pub struct Registry {
    zones: Vec<Zone>,
    vehicles: Vec<Vehicle>,
    rng: Xoshiro256PlusPlus,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Registry {
    /// An empty registry. `seed` makes generated ids reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };
        Registry {
            zones: Vec::new(),
            vehicles: Vec::new(),
            rng,
        }
    }

    fn next_id(rng: &mut Xoshiro256PlusPlus, prefix: &str) -> String {
        let suffix: String = (0..ID_LEN)
            .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
            .collect();
        format!("{prefix}-{suffix}")
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Deep copies for a planning pass.
    pub fn snapshot(&self) -> (Vec<Zone>, Vec<Vehicle>) {
        (self.zones.clone(), self.vehicles.clone())
    }

    pub fn register_zone(&mut self, input: ZoneInput) -> Result<Zone> {
        let mut admitted = self.admit_zones(vec![input], false)?;
        Ok(admitted.remove(0))
    }

    /// All-or-nothing: a single bad item rejects the whole batch and the
    /// error lists every failing item.
    pub fn register_zones(&mut self, inputs: Vec<ZoneInput>) -> Result<Vec<Zone>> {
        self.admit_zones(inputs, true)
    }

    pub fn register_vehicle(&mut self, input: VehicleInput) -> Result<Vehicle> {
        let mut admitted = self.admit_vehicles(vec![input], false)?;
        Ok(admitted.remove(0))
    }

    pub fn register_vehicles(&mut self, inputs: Vec<VehicleInput>) -> Result<Vec<Vehicle>> {
        self.admit_vehicles(inputs, true)
    }

    fn admit_zones(&mut self, inputs: Vec<ZoneInput>, batched: bool) -> Result<Vec<Zone>> {
        let mut seen: HashSet<String> = self.zones.iter().map(|z| z.id.clone()).collect();
        let mut accepted = Vec::with_capacity(inputs.len());
        let mut issues = Vec::new();

        for (idx, input) in inputs.into_iter().enumerate() {
            let rng = &mut self.rng;
            let outcome = input
                .normalize(|| Self::next_id(rng, "zone"))
                .and_then(|zone| {
                    if seen.insert(zone.id.clone()) {
                        Ok(zone)
                    } else {
                        Err(vec![FieldIssue::new("zoneId", format!("`{}` is already registered", zone.id))])
                    }
                });
            match outcome {
                Ok(zone) => accepted.push(zone),
                Err(found) => issues.extend(found.into_iter().map(|i| if batched { i.at(idx) } else { i })),
            }
        }

        if !issues.is_empty() {
            warn!(rejected = issues.len(), "zone registration rejected");
            return Err(EvacError::validation(issues));
        }

        self.zones.extend(accepted.iter().cloned());
        info!(added = accepted.len(), total = self.zones.len(), "zones registered");
        Ok(accepted)
    }

    fn admit_vehicles(&mut self, inputs: Vec<VehicleInput>, batched: bool) -> Result<Vec<Vehicle>> {
        let mut seen: HashSet<String> = self.vehicles.iter().map(|v| v.id.clone()).collect();
        let mut accepted = Vec::with_capacity(inputs.len());
        let mut issues = Vec::new();

        for (idx, input) in inputs.into_iter().enumerate() {
            let rng = &mut self.rng;
            let outcome = input
                .normalize(|| Self::next_id(rng, "vehicle"))
                .and_then(|vehicle| {
                    if seen.insert(vehicle.id.clone()) {
                        Ok(vehicle)
                    } else {
                        Err(vec![FieldIssue::new(
                            "vehicleId",
                            format!("`{}` is already registered", vehicle.id),
                        )])
                    }
                });
            match outcome {
                Ok(vehicle) => accepted.push(vehicle),
                Err(found) => issues.extend(found.into_iter().map(|i| if batched { i.at(idx) } else { i })),
            }
        }

        if !issues.is_empty() {
            warn!(rejected = issues.len(), "vehicle registration rejected");
            return Err(EvacError::validation(issues));
        }

        self.vehicles.extend(accepted.iter().cloned());
        info!(added = accepted.len(), total = self.vehicles.len(), "vehicles registered");
        Ok(accepted)
    }

    pub fn find_zone(&self, reference: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.answers_to(reference))
    }

    pub fn find_vehicle(&self, reference: &str) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.answers_to(reference))
    }

    /// Records a completed trip: the vehicle's registered capacity is added to
    /// the zone's evacuated count, clamped to its population.
    pub fn apply_evacuation_update(&mut self, zone_ref: &str, vehicle_ref: &str) -> Result<ZoneStatus> {
        let (vehicle_id, seats) = self
            .find_vehicle(vehicle_ref)
            .map(|v| (v.id.clone(), v.capacity))
            .ok_or_else(|| EvacError::vehicle_not_found(vehicle_ref))?;
        let zone = self
            .zones
            .iter_mut()
            .find(|z| z.answers_to(zone_ref))
            .ok_or_else(|| EvacError::zone_not_found(zone_ref))?;

        let before = zone.evacuated;
        zone.evacuated = zone.evacuated.saturating_add(seats).min(zone.population);
        zone.last_vehicle_used = Some(vehicle_id);
        debug!(
            zone = %zone.id,
            vehicle = vehicle_ref,
            evacuated = zone.evacuated,
            delta = zone.evacuated - before,
            "evacuation update applied"
        );
        Ok(zone.status())
    }

    pub fn status(&self) -> Vec<ZoneStatus> {
        self.zones.iter().map(Zone::status).collect()
    }

    /// Empties the zone registry. Vehicles stay registered.
    pub fn clear_all(&mut self) {
        let cleared = self.zones.len();
        self.zones.clear();
        info!(cleared, "zone registry cleared");
    }
}
