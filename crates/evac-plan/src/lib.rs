#![deny(clippy::all)]

pub mod cache;
pub mod enrich;
pub mod orchestrator;
pub mod service;
pub mod summary;

pub use cache::{fingerprint, PlanCache};
pub use enrich::{eta_clock, format_travel_time, EnrichedAssignment};
pub use orchestrator::{assemble_plan, generate_plan, generate_plan_at, planner_for, EvacuationPlan};
pub use service::{spawn, ServiceHandle};
pub use summary::PlanSummary;
