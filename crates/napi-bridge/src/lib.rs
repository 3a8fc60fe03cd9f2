#![deny(clippy::all)]

//! JavaScript entry points. Payloads cross the boundary as the typed objects
//! in [`models`], using the camelCase field names of the registration and
//! plan types.

pub mod models;

use evac_core::{EngineConfig, EvacError, Strategy};
use evac_plan::{spawn, ServiceHandle};
use models::{EvacuationPlan, PlanOptions, Vehicle, VehicleInput, Zone, ZoneInput, ZoneStatus};
use napi::{Error, Result, Status};
use napi_derive::napi;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

struct Service {
    handle: ServiceHandle,
    config: EngineConfig,
}

static SERVICE: OnceLock<std::result::Result<Service, EvacError>> = OnceLock::new();

fn service() -> Result<&'static Service> {
    SERVICE
        .get_or_init(|| {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
                .try_init();
            let config = EngineConfig::from_env()?;
            let handle = spawn(config.clone())?;
            Ok(Service { handle, config })
        })
        .as_ref()
        .map_err(to_napi)
}

fn to_napi(err: &EvacError) -> Error {
    let status = match err {
        EvacError::Validation { .. } | EvacError::InvalidStrategy(_) | EvacError::Config { .. } => {
            Status::InvalidArg
        }
        EvacError::NotFound { .. } | EvacError::ServiceUnavailable => Status::GenericFailure,
    };
    Error::new(status, err.to_string())
}

#[napi]
pub fn register_zones(zones: Vec<ZoneInput>) -> Result<Vec<Zone>> {
    let inputs = zones
        .into_iter()
        .map(evac_core::ZoneInput::try_from)
        .collect::<Result<Vec<_>>>()?;
    let registered = service()?.handle.register_zones(inputs).map_err(|e| to_napi(&e))?;
    Ok(registered.into_iter().map(Zone::from).collect())
}

#[napi]
pub fn register_zone(zone: ZoneInput) -> Result<Zone> {
    register_zones(vec![zone])?
        .pop()
        .ok_or_else(|| Error::new(Status::GenericFailure, "zone was not registered"))
}

#[napi]
pub fn register_vehicles(vehicles: Vec<VehicleInput>) -> Result<Vec<Vehicle>> {
    let inputs = vehicles
        .into_iter()
        .map(evac_core::VehicleInput::try_from)
        .collect::<Result<Vec<_>>>()?;
    let registered = service()?.handle.register_vehicles(inputs).map_err(|e| to_napi(&e))?;
    Ok(registered.into_iter().map(Vehicle::from).collect())
}

#[napi]
pub fn register_vehicle(vehicle: VehicleInput) -> Result<Vehicle> {
    register_vehicles(vec![vehicle])?
        .pop()
        .ok_or_else(|| Error::new(Status::GenericFailure, "vehicle was not registered"))
}

#[napi]
pub fn list_zones() -> Result<Vec<Zone>> {
    let zones = service()?.handle.zones().map_err(|e| to_napi(&e))?;
    Ok(zones.into_iter().map(Zone::from).collect())
}

#[napi]
pub fn list_vehicles() -> Result<Vec<Vehicle>> {
    let vehicles = service()?.handle.vehicles().map_err(|e| to_napi(&e))?;
    Ok(vehicles.into_iter().map(Vehicle::from).collect())
}

/// Missing arguments fall back to the configured defaults; a partial options
/// object is completed from them.
#[napi]
pub fn generate_plan(strategy: Option<String>, options: Option<PlanOptions>) -> Result<EvacuationPlan> {
    let service = service()?;
    let strategy = strategy
        .map(|s| s.parse::<Strategy>())
        .transpose()
        .map_err(|e| to_napi(&e))?;
    let options = options.map(|o| o.complete(service.config.default_options));

    let plan = service
        .handle
        .generate_plan(strategy, options)
        .map_err(|e| to_napi(&e))?;
    Ok(plan.into())
}

#[napi]
pub fn apply_evacuation_update(zone_id: String, vehicle_id: String) -> Result<ZoneStatus> {
    let status = service()?
        .handle
        .apply_evacuation_update(&zone_id, &vehicle_id)
        .map_err(|e| to_napi(&e))?;
    Ok(status.into())
}

#[napi]
pub fn evacuation_status() -> Result<Vec<ZoneStatus>> {
    let status = service()?.handle.status().map_err(|e| to_napi(&e))?;
    Ok(status.into_iter().map(ZoneStatus::from).collect())
}

#[napi]
pub fn clear_all() -> Result<()> {
    service()?.handle.clear_all().map_err(|e| to_napi(&e))
}
