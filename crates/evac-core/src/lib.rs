#![deny(clippy::all)]

pub mod config;
pub mod context;
pub mod error;
pub mod geo;
pub mod input;
pub mod model;
pub mod registry;

pub use config::{EngineConfig, PlanOptions, Strategy};
pub use context::{Candidate, PlanningContext};
pub use error::{EvacError, FieldIssue, Result};
pub use geo::{distance_km, travel_time_minutes, Coordinate};
pub use input::{VehicleInput, ZoneInput};
pub use model::{Assignment, Urgency, UrgencyCategory, Vehicle, VehicleType, Zone, ZoneState, ZoneStatus};
pub use registry::Registry;

/// An allocation strategy. Implementations must not mutate the slices they
/// are given and must be deterministic for identical input.
pub trait Planner {
    fn plan(&self, zones: &[Zone], vehicles: &[Vehicle], options: &PlanOptions) -> Vec<Assignment>;
}
