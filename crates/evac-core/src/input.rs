//! Registration payloads and their normalisation into the canonical model.
//!
//! Callers may send the coordinate shape (`locationCoordinates`,
//! `numberOfPeople`, `urgencyLevel`) or the legacy shape (`location`,
//! `people`, `urgency` as `low|medium|high`). Both collapse into one
//! [`Zone`] here; nothing downstream knows which shape arrived.

use crate::error::FieldIssue;
use crate::geo::Coordinate;
use crate::model::{Urgency, Vehicle, VehicleType, Zone};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneInput {
    pub zone_id: Option<String>,
    pub location_coordinates: Option<Coordinate>,
    pub number_of_people: Option<i64>,
    pub urgency_level: Option<i64>,
    pub location: Option<String>,
    pub people: Option<i64>,
    pub urgency: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInput {
    pub vehicle_id: Option<String>,
    pub capacity: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub location_coordinates: Option<Coordinate>,
    pub speed: Option<f64>,
    pub location: Option<String>,
}

fn check_id(raw: &Option<String>, field: &str, issues: &mut Vec<FieldIssue>) {
    if matches!(raw, Some(id) if id.trim().is_empty()) {
        issues.push(FieldIssue::new(field, "must not be empty"));
    }
}

fn check_positive(value: Option<i64>, field: &str, issues: &mut Vec<FieldIssue>) -> Option<u32> {
    match value {
        None => {
            issues.push(FieldIssue::new(field, "is required"));
            None
        }
        Some(v) if v < 1 => {
            issues.push(FieldIssue::new(field, "must be at least 1"));
            None
        }
        Some(v) => match u32::try_from(v) {
            Ok(v) => Some(v),
            Err(_) => {
                issues.push(FieldIssue::new(field, format!("must not exceed {}", u32::MAX)));
                None
            }
        },
    }
}

/// Coordinates are mandatory unless `stand_in` says a free-text location may
/// replace them.
fn check_coordinates(
    coordinates: Option<Coordinate>,
    stand_in: bool,
    issues: &mut Vec<FieldIssue>,
) -> Option<Coordinate> {
    match coordinates {
        Some(c) if c.is_valid() => Some(c),
        Some(_) => {
            issues.push(FieldIssue::new(
                "locationCoordinates",
                "latitude must be within [-90, 90] and longitude within [-180, 180]",
            ));
            None
        }
        None if stand_in => None,
        None => {
            issues.push(FieldIssue::new("locationCoordinates", "is required"));
            None
        }
    }
}

impl ZoneInput {
    /// `location`, `people` and `urgency` all present: the only shape that
    /// may omit coordinates.
    fn is_complete_legacy(&self) -> bool {
        self.location.as_deref().is_some_and(|l| !l.trim().is_empty())
            && self.people.is_some()
            && self.urgency.is_some()
    }

    /// Validates and normalises the payload. `id` is used when the caller
    /// did not supply a `zoneId`.
    pub fn normalize(self, id: impl FnOnce() -> String) -> Result<Zone, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        check_id(&self.zone_id, "zoneId", &mut issues);

        let population = match self.number_of_people {
            Some(_) => check_positive(self.number_of_people, "numberOfPeople", &mut issues),
            None if self.people.is_some() => check_positive(self.people, "people", &mut issues),
            None => check_positive(None, "numberOfPeople", &mut issues),
        };

        // The numeric level wins when both forms are present.
        let urgency = match (self.urgency_level, self.urgency.as_deref()) {
            (Some(level), _) => {
                let parsed = u8::try_from(level).ok().and_then(Urgency::new);
                if parsed.is_none() {
                    issues.push(FieldIssue::new("urgencyLevel", "must be between 1 and 5"));
                }
                parsed
            }
            (None, Some(raw)) => {
                let parsed = Urgency::from_category(raw);
                if parsed.is_none() {
                    issues.push(FieldIssue::new("urgency", "must be low, medium, or high"));
                }
                parsed
            }
            (None, None) => {
                issues.push(FieldIssue::new("urgencyLevel", "is required"));
                None
            }
        };

        let coordinates = check_coordinates(self.location_coordinates, self.is_complete_legacy(), &mut issues);

        match (population, urgency) {
            (Some(population), Some(urgency)) if issues.is_empty() => Ok(Zone {
                id: self.zone_id.clone().unwrap_or_else(id),
                external_id: self.zone_id,
                location: self.location.filter(|l| !l.trim().is_empty()),
                coordinates,
                population,
                urgency,
                evacuated: 0,
                last_vehicle_used: None,
            }),
            _ => Err(issues),
        }
    }
}

impl VehicleInput {
    pub fn normalize(self, id: impl FnOnce() -> String) -> Result<Vehicle, Vec<FieldIssue>> {
        let mut issues = Vec::new();
        check_id(&self.vehicle_id, "vehicleId", &mut issues);

        let capacity = check_positive(self.capacity, "capacity", &mut issues);

        let kind = match self.kind.as_deref() {
            None => {
                issues.push(FieldIssue::new("type", "is required"));
                None
            }
            Some(raw) => {
                let parsed = raw.parse::<VehicleType>().ok();
                if parsed.is_none() {
                    let allowed: Vec<&str> = VehicleType::ALL.iter().map(|t| t.as_str()).collect();
                    issues.push(FieldIssue::new(
                        "type",
                        format!("must be one of {}", allowed.join(", ")),
                    ));
                }
                parsed
            }
        };

        if let Some(speed) = self.speed {
            if !speed.is_finite() || speed <= 0.0 {
                issues.push(FieldIssue::new("speed", "must be greater than 0"));
            }
        }

        let coordinates = check_coordinates(self.location_coordinates, false, &mut issues);

        match (capacity, kind) {
            (Some(capacity), Some(kind)) if issues.is_empty() => Ok(Vehicle {
                id: self.vehicle_id.clone().unwrap_or_else(id),
                external_id: self.vehicle_id,
                location: self.location.filter(|l| !l.trim().is_empty()),
                coordinates,
                capacity,
                kind,
                speed_kmh: self.speed,
            }),
            _ => Err(issues),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn zone_input(value: serde_json::Value) -> ZoneInput {
        serde_json::from_value(value).unwrap()
    }

    fn vehicle_input(value: serde_json::Value) -> VehicleInput {
        serde_json::from_value(value).unwrap()
    }

    fn fields(issues: &[FieldIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.field.as_str()).collect()
    }

    #[test]
    fn coordinate_shape_normalises() {
        let zone = zone_input(json!({
            "zoneId": "Z1",
            "locationCoordinates": { "latitude": 13.75, "longitude": 100.5 },
            "numberOfPeople": 60,
            "urgencyLevel": 5
        }))
        .normalize(|| unreachable!())
        .unwrap();

        assert_eq!(zone.id, "Z1");
        assert_eq!(zone.external_id.as_deref(), Some("Z1"));
        assert_eq!(zone.population, 60);
        assert_eq!(zone.urgency.level(), 5);
        assert_eq!(zone.evacuated, 0);
    }

    #[test]
    fn legacy_shape_normalises_without_coordinates() {
        let zone = zone_input(json!({
            "location": "Old Town",
            "people": 25,
            "urgency": "Medium"
        }))
        .normalize(|| "zone-generated".to_string())
        .unwrap();

        assert_eq!(zone.id, "zone-generated");
        assert!(zone.external_id.is_none());
        assert!(zone.coordinates.is_none());
        assert_eq!(zone.urgency.level(), 3);
        assert_eq!(zone.location_label(), "Old Town");
    }

    #[test]
    fn numeric_urgency_takes_precedence() {
        let zone = zone_input(json!({
            "locationCoordinates": { "latitude": 1.0, "longitude": 1.0 },
            "numberOfPeople": 5,
            "urgencyLevel": 2,
            "urgency": "high"
        }))
        .normalize(|| "z".to_string())
        .unwrap();
        assert_eq!(zone.urgency.level(), 2);
    }

    #[test]
    fn every_bad_zone_field_is_reported() {
        let issues = zone_input(json!({
            "zoneId": " ",
            "locationCoordinates": { "latitude": 120.0, "longitude": 0.0 },
            "numberOfPeople": 0,
            "urgencyLevel": 7
        }))
        .normalize(|| "z".to_string())
        .unwrap_err();

        assert_eq!(
            fields(&issues),
            ["zoneId", "numberOfPeople", "urgencyLevel", "locationCoordinates"]
        );
    }

    #[test]
    fn missing_zone_fields_are_required() {
        let issues = ZoneInput::default().normalize(|| "z".to_string()).unwrap_err();
        assert_eq!(
            fields(&issues),
            ["numberOfPeople", "urgencyLevel", "locationCoordinates"]
        );
        assert!(issues.iter().all(|i| i.reason == "is required"));
    }

    #[test]
    fn unknown_legacy_urgency_is_rejected() {
        let issues = zone_input(json!({ "location": "Pier", "people": 3, "urgency": "extreme" }))
            .normalize(|| "z".to_string())
            .unwrap_err();
        assert_eq!(fields(&issues), ["urgency"]);
    }

    #[test]
    fn mixed_shape_zone_still_needs_coordinates() {
        let issues = zone_input(json!({
            "location": "Harbour",
            "numberOfPeople": 5,
            "urgencyLevel": 3
        }))
        .normalize(|| "z".to_string())
        .unwrap_err();
        assert_eq!(fields(&issues), ["locationCoordinates"]);

        let issues = zone_input(json!({ "location": "Harbour", "people": 5, "urgencyLevel": 3 }))
            .normalize(|| "z".to_string())
            .unwrap_err();
        assert_eq!(fields(&issues), ["locationCoordinates"]);
    }

    #[test]
    fn vehicle_location_label_does_not_replace_coordinates() {
        let issues = vehicle_input(json!({
            "vehicleId": "V1",
            "capacity": 10,
            "type": "bus",
            "location": "Depot"
        }))
        .normalize(|| unreachable!())
        .unwrap_err();
        assert_eq!(fields(&issues), ["locationCoordinates"]);
    }

    #[test]
    fn vehicle_normalises_with_case_insensitive_type() {
        let vehicle = vehicle_input(json!({
            "vehicleId": "v-001",
            "capacity": 50,
            "type": "Bus",
            "locationCoordinates": { "latitude": 13.7563, "longitude": 100.5018 },
            "speed": 60
        }))
        .normalize(|| unreachable!())
        .unwrap();

        assert_eq!(vehicle.id, "v-001");
        assert_eq!(vehicle.kind, VehicleType::Bus);
        assert_eq!(vehicle.speed_kmh, Some(60.0));
    }

    #[test]
    fn vehicle_without_speed_keeps_none() {
        let vehicle = vehicle_input(json!({
            "capacity": 4,
            "type": "ambulance",
            "locationCoordinates": { "latitude": 0.0, "longitude": 0.0 }
        }))
        .normalize(|| "vehicle-x".to_string())
        .unwrap();
        assert_eq!(vehicle.id, "vehicle-x");
        assert!(vehicle.speed_kmh.is_none());
    }

    #[test]
    fn every_bad_vehicle_field_is_reported() {
        let issues = vehicle_input(json!({
            "capacity": 0,
            "type": "zeppelin",
            "speed": 0
        }))
        .normalize(|| "v".to_string())
        .unwrap_err();

        assert_eq!(fields(&issues), ["capacity", "type", "speed", "locationCoordinates"]);
        assert!(issues[1].reason.contains("bus, van, boat"));
    }
}
