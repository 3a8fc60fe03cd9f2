//! Strategy sweep.
//!
//! For every scenario file given on the command line, runs both planners on
//! the same registry state, validates each plan and prints one CSV row per
//! (scenario, strategy) to stdout.
//!
//! Scenario file format:
//!
//! ```json
//! { "zones": [ ... ], "vehicles": [ ... ], "options": { "maxDistanceKm": 50 } }
//! ```
//!
//! `zones` and `vehicles` use the registration field names; `options` is
//! optional.
//!
//! Usage: `strategy-sweep scenario.json [more.json ...]`

use chrono::Local;
use evac_core::{PlanOptions, Registry, Strategy, VehicleInput, ZoneInput};
use evac_plan::{assemble_plan, planner_for};
use evac_validation::validate_plan;
use serde::Deserialize;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Deserialize)]
struct Scenario {
    zones: Vec<ZoneInput>,
    vehicles: Vec<VehicleInput>,
    #[serde(default)]
    options: PlanOptions,
}

const HEADER: &str = "scenario,strategy,assignments,vehicles_used,people_evacuated,\
fully_covered,partially_covered,total_distance_km,violations";

fn run_scenario(path: &Path) -> Result<Vec<String>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| format!("read failed: {e}"))?;
    let scenario: Scenario = serde_json::from_str(&raw).map_err(|e| format!("parse failed: {e}"))?;
    scenario
        .options
        .validate()
        .map_err(|e| format!("options rejected: {e}"))?;

    let mut registry = Registry::new(Some(0));
    registry
        .register_zones(scenario.zones)
        .map_err(|e| format!("zones rejected: {e}"))?;
    registry
        .register_vehicles(scenario.vehicles)
        .map_err(|e| format!("vehicles rejected: {e}"))?;
    let (zones, vehicles) = registry.snapshot();

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let now = Local::now();

    let rows: Vec<String> = [Strategy::Greedy, Strategy::Weighted]
        .into_iter()
        .map(|strategy| {
            let raw = planner_for(strategy).plan(&zones, &vehicles, &scenario.options);
            let violations = validate_plan(&zones, &vehicles, &raw);
            for v in &violations {
                error!(scenario = %name, %strategy, "{v}");
            }
            let plan = assemble_plan(&zones, &vehicles, strategy, &scenario.options, &raw, &now);
            let s = &plan.summary;
            format!(
                "{name},{strategy},{},{},{},{},{},{:.2},{}",
                plan.assignments.len(),
                s.total_vehicles_assigned,
                s.total_people_to_evacuate,
                s.zones_fully_covered,
                s.zones_partially_covered,
                s.total_distance_km,
                violations.len()
            )
        })
        .collect();
    Ok(rows)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: strategy-sweep <scenario.json>...");
        return ExitCode::from(2);
    }

    println!("{HEADER}");
    let mut failed = 0usize;
    for path in &paths {
        match run_scenario(Path::new(path)) {
            Ok(rows) => rows.iter().for_each(|row| println!("{row}")),
            Err(reason) => {
                error!(scenario = %path, %reason, "scenario skipped");
                failed += 1;
            }
        }
    }

    info!(scenarios = paths.len(), failed, "sweep finished");
    if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
