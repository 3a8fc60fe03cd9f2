use chrono::{DateTime, Duration, TimeZone};
use evac_core::geo::{distance_km, round2};
use evac_core::{Assignment, Coordinate, UrgencyCategory, Vehicle, VehicleType, Zone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A planner assignment with display figures attached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedAssignment {
    pub zone_id: String,
    pub vehicle_id: String,
    pub vehicle_type: VehicleType,
    /// Registered capacity, not what was left of it during planning.
    pub vehicle_capacity: u32,
    pub assigned_zone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone_coordinates: Option<Coordinate>,
    pub urgency_level: u8,
    pub urgency_category: UrgencyCategory,
    pub priority: u8,
    pub people_to_evacuate: u32,
    pub distance_km: f64,
    pub travel_time_hours: f64,
    pub travel_time_minutes: u32,
    pub travel_time_formatted: String,
    pub eta: String,
    pub speed_kmh: f64,
    pub planner_eta_minutes: f64,
}

/// `"2h 5m"` from one hour on, `"45m"` below.
pub fn format_travel_time(minutes: u32) -> String {
    if minutes >= 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}

/// Wall-clock arrival as `HH:MM` in the clock's own zone.
pub fn eta_clock<Tz>(now: &DateTime<Tz>, minutes: u32) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    (now.clone() + Duration::minutes(i64::from(minutes)))
        .format("%H:%M")
        .to_string()
}

pub(crate) fn enrich<Tz>(
    assignment: &Assignment,
    zone: &Zone,
    vehicle: &Vehicle,
    speed_fallback_kmh: f64,
    now: &DateTime<Tz>,
) -> EnrichedAssignment
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let distance = match (zone.coordinates.as_ref(), vehicle.coordinates.as_ref()) {
        (Some(zc), Some(vc)) => round2(distance_km(zc, vc)),
        _ => 0.0,
    };
    let speed = vehicle.effective_speed(speed_fallback_kmh);
    let hours = if speed > 0.0 { round2(distance / speed) } else { 0.0 };
    let minutes = (hours * 60.0).round() as u32;

    EnrichedAssignment {
        zone_id: zone.id.clone(),
        vehicle_id: vehicle.id.clone(),
        vehicle_type: vehicle.kind,
        vehicle_capacity: vehicle.capacity,
        assigned_zone: zone.location_label(),
        zone_coordinates: zone.coordinates,
        urgency_level: zone.urgency.level(),
        urgency_category: zone.urgency.category(),
        priority: zone.urgency.priority(),
        people_to_evacuate: assignment.evacuated,
        distance_km: distance,
        travel_time_hours: hours,
        travel_time_minutes: minutes,
        travel_time_formatted: format_travel_time(minutes),
        eta: eta_clock(now, minutes),
        speed_kmh: speed,
        planner_eta_minutes: assignment.eta_minutes,
    }
}
