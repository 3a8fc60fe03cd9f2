use evac_core::ZoneState;
use napi::{Error, Result, Status};
use napi_derive::napi;

#[napi(object)]
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Either registration shape; see [`evac_core::ZoneInput`].
#[napi(object)]
#[derive(Clone, Debug, Default)]
pub struct ZoneInput {
    pub zone_id: Option<String>,
    pub location_coordinates: Option<Coordinates>,
    pub number_of_people: Option<f64>,
    pub urgency_level: Option<f64>,
    pub location: Option<String>,
    pub people: Option<f64>,
    pub urgency: Option<String>,
}

#[napi(object)]
#[derive(Clone, Debug, Default)]
pub struct VehicleInput {
    pub vehicle_id: Option<String>,
    pub capacity: Option<f64>,
    #[napi(js_name = "type")] // "type" is a reserved keyword in Rust
    pub type_: Option<String>,
    pub location_coordinates: Option<Coordinates>,
    pub speed: Option<f64>,
    pub location: Option<String>,
}

/// Every field is optional; missing ones take the library defaults.
#[napi(object)]
#[derive(Clone, Debug, Default)]
pub struct PlanOptions {
    pub max_distance_km: Option<f64>,
    pub allow_multi_vehicle: Option<bool>,
    pub prefer_fewer_trips: Option<bool>,
    pub speed_fallback_kmh: Option<f64>,
}

#[napi(object)]
#[derive(Clone, Debug)]
pub struct Zone {
    pub id: String,
    pub external_id: Option<String>,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub population: u32,
    pub evacuated: u32,
    pub urgency_level: u32,
    pub urgency_category: String,
}

#[napi(object)]
#[derive(Clone, Debug)]
pub struct Vehicle {
    pub id: String,
    pub external_id: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub capacity: u32,
    #[napi(js_name = "type")]
    pub type_: String,
    pub speed_kmh: Option<f64>,
}

#[napi(object)]
#[derive(Clone, Debug)]
pub struct ZoneStatus {
    pub zone_id: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub total_people: u32,
    pub evacuated: u32,
    pub remaining: u32,
    pub urgency_level: u32,
    pub urgency_category: String,
    /// `pending`, `in_progress` or `completed`.
    pub state: String,
    pub last_vehicle_used: Option<String>,
}

#[napi(object)]
#[derive(Clone, Debug)]
pub struct Assignment {
    pub zone_id: String,
    pub vehicle_id: String,
    pub vehicle_type: String,
    pub vehicle_capacity: u32,
    pub assigned_zone: String,
    pub zone_coordinates: Option<Coordinates>,
    pub urgency_level: u32,
    pub urgency_category: String,
    pub priority: u32,
    pub people_to_evacuate: u32,
    pub distance_km: f64,
    pub travel_time_hours: f64,
    pub travel_time_minutes: u32,
    pub travel_time_formatted: String,
    pub eta: String,
    pub speed_kmh: f64,
}

#[napi(object)]
#[derive(Clone, Debug, Default)]
pub struct PlanSummary {
    pub total_vehicles_assigned: u32,
    pub total_people_to_evacuate: f64,
    pub high_priority_zones: u32,
    pub average_distance: f64,
    pub average_travel_time: f64,
    pub zones_fully_covered: u32,
    pub zones_partially_covered: u32,
    pub total_distance_km: f64,
}

#[napi(object)]
#[derive(Clone, Debug)]
pub struct AppliedOptions {
    pub max_distance_km: f64,
    pub allow_multi_vehicle: bool,
    pub prefer_fewer_trips: bool,
    pub speed_fallback_kmh: f64,
}

#[napi(object)]
#[derive(Clone, Debug)]
pub struct EvacuationPlan {
    pub strategy: String,
    pub assignments: Vec<Assignment>,
    pub summary: PlanSummary,
    pub options: AppliedOptions,
}

/// JS numbers arrive as `f64`; counts must be whole before they are handed
/// to the registry, which does its own range checks.
fn whole(value: Option<f64>, field: &str) -> Result<Option<i64>> {
    match value {
        None => Ok(None),
        Some(v) if v.is_finite() && v.fract() == 0.0 => Ok(Some(v as i64)),
        Some(v) => Err(Error::new(
            Status::InvalidArg,
            format!("{field} must be a whole number, got {v}"),
        )),
    }
}

fn count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn state_name(state: ZoneState) -> &'static str {
    match state {
        ZoneState::Pending => "pending",
        ZoneState::InProgress => "in_progress",
        ZoneState::Completed => "completed",
    }
}

impl From<Coordinates> for evac_core::Coordinate {
    fn from(c: Coordinates) -> Self {
        evac_core::Coordinate::new(c.latitude, c.longitude)
    }
}

impl From<evac_core::Coordinate> for Coordinates {
    fn from(c: evac_core::Coordinate) -> Self {
        Self {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

impl TryFrom<ZoneInput> for evac_core::ZoneInput {
    type Error = Error;

    fn try_from(input: ZoneInput) -> Result<Self> {
        Ok(Self {
            zone_id: input.zone_id,
            location_coordinates: input.location_coordinates.map(Into::into),
            number_of_people: whole(input.number_of_people, "numberOfPeople")?,
            urgency_level: whole(input.urgency_level, "urgencyLevel")?,
            location: input.location,
            people: whole(input.people, "people")?,
            urgency: input.urgency,
        })
    }
}

impl TryFrom<VehicleInput> for evac_core::VehicleInput {
    type Error = Error;

    fn try_from(input: VehicleInput) -> Result<Self> {
        Ok(Self {
            vehicle_id: input.vehicle_id,
            capacity: whole(input.capacity, "capacity")?,
            kind: input.type_,
            location_coordinates: input.location_coordinates.map(Into::into),
            speed: input.speed,
            location: input.location,
        })
    }
}

impl PlanOptions {
    pub fn complete(self, base: evac_core::PlanOptions) -> evac_core::PlanOptions {
        evac_core::PlanOptions {
            max_distance_km: self.max_distance_km.unwrap_or(base.max_distance_km),
            allow_multi_vehicle: self.allow_multi_vehicle.unwrap_or(base.allow_multi_vehicle),
            prefer_fewer_trips: self.prefer_fewer_trips.unwrap_or(base.prefer_fewer_trips),
            speed_fallback_kmh: self.speed_fallback_kmh.unwrap_or(base.speed_fallback_kmh),
        }
    }
}

impl From<evac_core::Zone> for Zone {
    fn from(zone: evac_core::Zone) -> Self {
        Self {
            location: zone.location_label(),
            urgency_level: u32::from(zone.urgency.level()),
            urgency_category: zone.urgency.category().as_str().to_string(),
            id: zone.id,
            external_id: zone.external_id,
            coordinates: zone.coordinates.map(Into::into),
            population: zone.population,
            evacuated: zone.evacuated,
        }
    }
}

impl From<evac_core::Vehicle> for Vehicle {
    fn from(vehicle: evac_core::Vehicle) -> Self {
        Self {
            id: vehicle.id,
            external_id: vehicle.external_id,
            location: vehicle.location,
            coordinates: vehicle.coordinates.map(Into::into),
            capacity: vehicle.capacity,
            type_: vehicle.kind.as_str().to_string(),
            speed_kmh: vehicle.speed_kmh,
        }
    }
}

impl From<evac_core::ZoneStatus> for ZoneStatus {
    fn from(status: evac_core::ZoneStatus) -> Self {
        Self {
            zone_id: status.zone_id,
            location: status.location,
            coordinates: status.coordinates.map(Into::into),
            total_people: status.total_people,
            evacuated: status.evacuated,
            remaining: status.remaining,
            urgency_level: u32::from(status.urgency_level),
            urgency_category: status.urgency_category.as_str().to_string(),
            state: state_name(status.state).to_string(),
            last_vehicle_used: status.last_vehicle_used,
        }
    }
}

impl From<evac_plan::EnrichedAssignment> for Assignment {
    fn from(a: evac_plan::EnrichedAssignment) -> Self {
        Self {
            zone_id: a.zone_id,
            vehicle_id: a.vehicle_id,
            vehicle_type: a.vehicle_type.as_str().to_string(),
            vehicle_capacity: a.vehicle_capacity,
            assigned_zone: a.assigned_zone,
            zone_coordinates: a.zone_coordinates.map(Into::into),
            urgency_level: u32::from(a.urgency_level),
            urgency_category: a.urgency_category.as_str().to_string(),
            priority: u32::from(a.priority),
            people_to_evacuate: a.people_to_evacuate,
            distance_km: a.distance_km,
            travel_time_hours: a.travel_time_hours,
            travel_time_minutes: a.travel_time_minutes,
            travel_time_formatted: a.travel_time_formatted,
            eta: a.eta,
            speed_kmh: a.speed_kmh,
        }
    }
}

impl From<evac_plan::PlanSummary> for PlanSummary {
    fn from(s: evac_plan::PlanSummary) -> Self {
        Self {
            total_vehicles_assigned: count(s.total_vehicles_assigned),
            total_people_to_evacuate: s.total_people_to_evacuate as f64,
            high_priority_zones: count(s.high_priority_zones),
            average_distance: s.average_distance_km,
            average_travel_time: s.average_travel_time_hours,
            zones_fully_covered: count(s.zones_fully_covered),
            zones_partially_covered: count(s.zones_partially_covered),
            total_distance_km: s.total_distance_km,
        }
    }
}

impl From<evac_core::PlanOptions> for AppliedOptions {
    fn from(o: evac_core::PlanOptions) -> Self {
        Self {
            max_distance_km: o.max_distance_km,
            allow_multi_vehicle: o.allow_multi_vehicle,
            prefer_fewer_trips: o.prefer_fewer_trips,
            speed_fallback_kmh: o.speed_fallback_kmh,
        }
    }
}

impl From<evac_plan::EvacuationPlan> for EvacuationPlan {
    fn from(plan: evac_plan::EvacuationPlan) -> Self {
        Self {
            strategy: plan.strategy.as_str().to_string(),
            assignments: plan.assignments.into_iter().map(Into::into).collect(),
            summary: plan.summary.into(),
            options: plan.options.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use evac_core::{Registry, Strategy};

    fn coords(latitude: f64, longitude: f64) -> Option<Coordinates> {
        Some(Coordinates { latitude, longitude })
    }

    #[test]
    fn zone_payload_keeps_both_shapes() {
        let current: evac_core::ZoneInput = ZoneInput {
            zone_id: Some("Z1".into()),
            location_coordinates: coords(13.75, 100.5),
            number_of_people: Some(45.0),
            urgency_level: Some(5.0),
            ..ZoneInput::default()
        }
        .try_into()
        .unwrap();
        assert_eq!(current.number_of_people, Some(45));
        assert_eq!(current.urgency_level, Some(5));
        assert_eq!(current.location_coordinates, Some(evac_core::Coordinate::new(13.75, 100.5)));

        let legacy: evac_core::ZoneInput = ZoneInput {
            location: Some("North Gate".into()),
            people: Some(12.0),
            urgency: Some("Medium".into()),
            ..ZoneInput::default()
        }
        .try_into()
        .unwrap();
        assert_eq!(legacy.people, Some(12));
        assert_eq!(legacy.location_coordinates, None);
    }

    #[test]
    fn fractional_counts_are_rejected_not_truncated() {
        let err = evac_core::ZoneInput::try_from(ZoneInput {
            number_of_people: Some(2.5),
            ..ZoneInput::default()
        })
        .unwrap_err();
        assert_eq!(err.status, Status::InvalidArg);
        assert!(err.reason.contains("numberOfPeople"));

        let err = evac_core::VehicleInput::try_from(VehicleInput {
            capacity: Some(f64::NAN),
            ..VehicleInput::default()
        })
        .unwrap_err();
        assert!(err.reason.contains("capacity"));
    }

    #[test]
    fn vehicle_type_field_maps_to_kind() {
        let input: evac_core::VehicleInput = VehicleInput {
            vehicle_id: Some("V1".into()),
            capacity: Some(30.0),
            type_: Some("Bus".into()),
            location_coordinates: coords(13.76, 100.51),
            ..VehicleInput::default()
        }
        .try_into()
        .unwrap();
        assert_eq!(input.kind.as_deref(), Some("Bus"));
        assert_eq!(input.capacity, Some(30));
        assert_eq!(input.speed, None);
    }

    #[test]
    fn partial_options_are_completed_from_the_base() {
        let base = evac_core::PlanOptions::default();
        let opts = PlanOptions {
            max_distance_km: Some(12.0),
            prefer_fewer_trips: Some(false),
            ..PlanOptions::default()
        }
        .complete(base);

        assert_eq!(opts.max_distance_km, 12.0);
        assert!(!opts.prefer_fewer_trips);
        assert_eq!(opts.speed_fallback_kmh, base.speed_fallback_kmh);
        assert_eq!(opts.allow_multi_vehicle, base.allow_multi_vehicle);
    }

    #[test]
    fn plan_and_status_views_carry_the_host_field_values() {
        let mut registry = Registry::new(Some(1));
        registry
            .register_zones(vec![ZoneInput {
                zone_id: Some("Z1".into()),
                location_coordinates: coords(13.75, 100.5),
                number_of_people: Some(20.0),
                urgency_level: Some(4.0),
                ..ZoneInput::default()
            }
            .try_into()
            .unwrap()])
            .unwrap();
        registry
            .register_vehicles(vec![VehicleInput {
                vehicle_id: Some("V1".into()),
                capacity: Some(30.0),
                type_: Some("van".into()),
                location_coordinates: coords(13.76, 100.51),
                speed: Some(60.0),
                ..VehicleInput::default()
            }
            .try_into()
            .unwrap()])
            .unwrap();
        let (zones, vehicles) = registry.snapshot();

        let now = Utc.with_ymd_and_hms(2024, 10, 5, 10, 0, 0).unwrap();
        let plan: EvacuationPlan = evac_plan::generate_plan_at(
            &zones,
            &vehicles,
            Strategy::Greedy,
            &evac_core::PlanOptions::default(),
            &now,
        )
        .into();

        assert_eq!(plan.strategy, "greedy");
        assert_eq!(plan.assignments.len(), 1);
        let trip = &plan.assignments[0];
        assert_eq!(trip.vehicle_type, "van");
        assert_eq!(trip.urgency_category, "high");
        assert_eq!(trip.people_to_evacuate, 20);
        assert_eq!(plan.summary.total_vehicles_assigned, 1);
        assert_eq!(plan.summary.total_people_to_evacuate, 20.0);
        assert_eq!(plan.summary.average_distance, trip.distance_km);
        assert!(plan.options.prefer_fewer_trips);

        let vehicle: Vehicle = vehicles[0].clone().into();
        assert_eq!(vehicle.type_, "van");

        let status: ZoneStatus = zones[0].status().into();
        assert_eq!(status.state, "pending");
        assert_eq!(status.urgency_level, 4);
        assert_eq!(status.remaining, 20);
    }
}
