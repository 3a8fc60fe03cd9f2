use crate::geo::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Zone urgency on the 1 (lowest) to 5 (highest) scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Urgency(u8);

impl Urgency {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    /// Legacy categorical input: `low`, `medium`, `high` (any case).
    pub fn from_category(raw: &str) -> Option<Self> {
        raw.parse::<UrgencyCategory>().ok().map(UrgencyCategory::level)
    }

    pub fn category(self) -> UrgencyCategory {
        match self.0 {
            4..=5 => UrgencyCategory::High,
            3 => UrgencyCategory::Medium,
            _ => UrgencyCategory::Low,
        }
    }

    /// 1 = served first, 5 = served last.
    pub fn priority(self) -> u8 {
        6 - self.0
    }

    pub fn is_high(self) -> bool {
        self.category() == UrgencyCategory::High
    }
}

impl TryFrom<u8> for Urgency {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Urgency::new(level).ok_or_else(|| format!("urgency level {level} outside 1..=5"))
    }
}

impl From<Urgency> for u8 {
    fn from(urgency: Urgency) -> Self {
        urgency.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyCategory {
    Low,
    Medium,
    High,
}

impl UrgencyCategory {
    pub fn level(self) -> Urgency {
        match self {
            UrgencyCategory::Low => Urgency(1),
            UrgencyCategory::Medium => Urgency(3),
            UrgencyCategory::High => Urgency(5),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UrgencyCategory::Low => "low",
            UrgencyCategory::Medium => "medium",
            UrgencyCategory::High => "high",
        }
    }
}

impl FromStr for UrgencyCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(UrgencyCategory::Low),
            "medium" => Ok(UrgencyCategory::Medium),
            "high" => Ok(UrgencyCategory::High),
            _ => Err(()),
        }
    }
}

impl fmt::Display for UrgencyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Bus,
    Van,
    Boat,
    Truck,
    Car,
    Ambulance,
}

impl VehicleType {
    pub const ALL: [VehicleType; 6] = [
        VehicleType::Bus,
        VehicleType::Van,
        VehicleType::Boat,
        VehicleType::Truck,
        VehicleType::Car,
        VehicleType::Ambulance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            VehicleType::Bus => "bus",
            VehicleType::Van => "van",
            VehicleType::Boat => "boat",
            VehicleType::Truck => "truck",
            VehicleType::Car => "car",
            VehicleType::Ambulance => "ambulance",
        }
    }
}

impl FromStr for VehicleType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        VehicleType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or(())
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A population cluster awaiting evacuation. `evacuated <= population` always.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub coordinates: Option<Coordinate>,
    pub population: u32,
    pub urgency: Urgency,
    #[serde(default)]
    pub evacuated: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_vehicle_used: Option<String>,
}

impl Zone {
    pub fn remaining(&self) -> u32 {
        self.population.saturating_sub(self.evacuated)
    }

    pub fn needs_evacuation(&self) -> bool {
        self.remaining() > 0
    }

    /// Free-text location if registered with one, otherwise `"lat,lon"`.
    pub fn location_label(&self) -> String {
        match (&self.location, &self.coordinates) {
            (Some(label), _) => label.clone(),
            (None, Some(c)) => c.label(),
            (None, None) => "Unknown location".to_string(),
        }
    }

    /// Matches the zone by id, alias, or location label.
    pub fn answers_to(&self, reference: &str) -> bool {
        self.id == reference
            || self.external_id.as_deref() == Some(reference)
            || self.location_label() == reference
    }

    pub fn state(&self) -> ZoneState {
        if self.evacuated >= self.population {
            ZoneState::Completed
        } else if self.evacuated > 0 {
            ZoneState::InProgress
        } else {
            ZoneState::Pending
        }
    }

    pub fn status(&self) -> ZoneStatus {
        ZoneStatus {
            zone_id: self.id.clone(),
            location: self.location_label(),
            coordinates: self.coordinates,
            total_people: self.population,
            evacuated: self.evacuated,
            remaining: self.remaining(),
            urgency_level: self.urgency.level(),
            urgency_category: self.urgency.category(),
            state: self.state(),
            last_vehicle_used: self.last_vehicle_used.clone(),
        }
    }
}

/// A transport unit with seat capacity and an optional cruising speed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub coordinates: Option<Coordinate>,
    pub capacity: u32,
    #[serde(rename = "type")]
    pub kind: VehicleType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_kmh: Option<f64>,
}

impl Vehicle {
    /// Registered speed, or `fallback_kmh` when none was given. A registered
    /// speed is never replaced, so a zero speed still yields an infinite ETA.
    pub fn effective_speed(&self, fallback_kmh: f64) -> f64 {
        self.speed_kmh.unwrap_or(fallback_kmh)
    }

    pub fn answers_to(&self, reference: &str) -> bool {
        self.id == reference || self.external_id.as_deref() == Some(reference)
    }
}

/// One vehicle-to-zone trip produced by a planner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub zone_id: String,
    pub vehicle_id: String,
    pub eta_minutes: f64,
    pub evacuated: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneState {
    Pending,
    InProgress,
    Completed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneStatus {
    pub zone_id: String,
    pub location: String,
    pub coordinates: Option<Coordinate>,
    pub total_people: u32,
    pub evacuated: u32,
    pub remaining: u32,
    pub urgency_level: u8,
    pub urgency_category: UrgencyCategory,
    pub state: ZoneState,
    pub last_vehicle_used: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(population: u32, evacuated: u32) -> Zone {
        Zone {
            id: "z1".into(),
            external_id: Some("Z1".into()),
            location: None,
            coordinates: Some(Coordinate::new(13.75, 100.5)),
            population,
            urgency: Urgency::new(4).unwrap(),
            evacuated,
            last_vehicle_used: None,
        }
    }

    #[test]
    fn urgency_is_bounded() {
        assert!(Urgency::new(0).is_none());
        assert!(Urgency::new(6).is_none());
        assert_eq!(Urgency::new(5).unwrap().priority(), 1);
        assert_eq!(Urgency::new(1).unwrap().priority(), 5);
    }

    #[test]
    fn urgency_categories() {
        let cat = |l| Urgency::new(l).unwrap().category();
        assert_eq!(cat(1), UrgencyCategory::Low);
        assert_eq!(cat(2), UrgencyCategory::Low);
        assert_eq!(cat(3), UrgencyCategory::Medium);
        assert_eq!(cat(4), UrgencyCategory::High);
        assert_eq!(cat(5), UrgencyCategory::High);
    }

    #[test]
    fn legacy_categories_map_onto_levels() {
        assert_eq!(Urgency::from_category("LOW").unwrap().level(), 1);
        assert_eq!(Urgency::from_category("medium").unwrap().level(), 3);
        assert_eq!(Urgency::from_category(" High ").unwrap().level(), 5);
        assert!(Urgency::from_category("critical").is_none());
    }

    #[test]
    fn urgency_deserialises_with_range_check() {
        let ok: Urgency = serde_json::from_str("4").unwrap();
        assert_eq!(ok.level(), 4);
        assert!(serde_json::from_str::<Urgency>("9").is_err());
    }

    #[test]
    fn vehicle_type_parsing_ignores_case() {
        assert_eq!("Bus".parse::<VehicleType>(), Ok(VehicleType::Bus));
        assert_eq!("AMBULANCE".parse::<VehicleType>(), Ok(VehicleType::Ambulance));
        assert!("helicopter".parse::<VehicleType>().is_err());
    }

    #[test]
    fn remaining_and_state_follow_evacuated_count() {
        assert_eq!(zone(40, 0).remaining(), 40);
        assert_eq!(zone(40, 0).state(), ZoneState::Pending);
        assert_eq!(zone(40, 15).state(), ZoneState::InProgress);
        assert_eq!(zone(40, 40).state(), ZoneState::Completed);
        assert!(!zone(40, 40).needs_evacuation());
    }

    #[test]
    fn zone_resolves_by_id_alias_or_location() {
        let z = zone(10, 0);
        assert!(z.answers_to("z1"));
        assert!(z.answers_to("Z1"));
        assert!(z.answers_to("13.75,100.5"));
        assert!(!z.answers_to("Z2"));
    }

    #[test]
    fn speed_fallback_only_applies_when_absent() {
        let mut v = Vehicle {
            id: "v1".into(),
            external_id: None,
            location: None,
            coordinates: None,
            capacity: 10,
            kind: VehicleType::Van,
            speed_kmh: None,
        };
        assert_eq!(v.effective_speed(40.0), 40.0);
        v.speed_kmh = Some(0.0);
        assert_eq!(v.effective_speed(40.0), 0.0);
    }

    #[test]
    fn vehicle_serialises_kind_as_type() {
        let v = Vehicle {
            id: "v1".into(),
            external_id: None,
            location: None,
            coordinates: None,
            capacity: 10,
            kind: VehicleType::Boat,
            speed_kmh: Some(35.0),
        };
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["type"], "boat");
        assert_eq!(json["speedKmh"], 35.0);
    }
}
