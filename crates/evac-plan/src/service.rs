//! Single-owner planning service.
//!
//! One actor thread owns the [`Registry`] and the [`PlanCache`]; every
//! operation is a message, so registry mutations are applied one at a time
//! and each plan is computed from a snapshot taken between them.

use crate::cache::{fingerprint, PlanCache};
use crate::orchestrator::{generate_plan, EvacuationPlan};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use evac_core::{
    EngineConfig, EvacError, PlanOptions, Registry, Result, Strategy, Vehicle, VehicleInput, Zone,
    ZoneInput, ZoneStatus,
};
use std::thread;
use tracing::{debug, info, warn};

enum Command {
    RegisterZones {
        inputs: Vec<ZoneInput>,
        reply: Sender<Result<Vec<Zone>>>,
    },
    RegisterVehicles {
        inputs: Vec<VehicleInput>,
        reply: Sender<Result<Vec<Vehicle>>>,
    },
    GeneratePlan {
        strategy: Option<Strategy>,
        options: Option<PlanOptions>,
        reply: Sender<EvacuationPlan>,
    },
    ApplyUpdate {
        zone_ref: String,
        vehicle_ref: String,
        reply: Sender<Result<ZoneStatus>>,
    },
    Status(Sender<Vec<ZoneStatus>>),
    Zones(Sender<Vec<Zone>>),
    Vehicles(Sender<Vec<Vehicle>>),
    ClearAll(Sender<()>),
    Shutdown(Sender<()>),
}

/// Cloneable front door to the planning actor. Every call blocks until the
/// actor answers; once the actor is gone calls return
/// [`EvacError::ServiceUnavailable`].
#[derive(Clone)]
pub struct ServiceHandle {
    tx: Sender<Command>,
}

struct Actor {
    registry: Registry,
    cache: PlanCache,
    config: EngineConfig,
}

/// Starts the actor thread.
pub fn spawn(config: EngineConfig) -> Result<ServiceHandle> {
    let (tx, rx) = unbounded();
    let actor = Actor {
        registry: Registry::new(config.id_seed),
        cache: PlanCache::new(config.plan_cache_ttl),
        config,
    };

    thread::Builder::new()
        .name("evac-planner".into())
        .spawn(move || actor.run(rx))
        .map_err(|err| {
            warn!(%err, "could not start planning service");
            EvacError::ServiceUnavailable
        })?;

    info!("planning service started");
    Ok(ServiceHandle { tx })
}

impl ServiceHandle {
    fn call<T>(&self, command: impl FnOnce(Sender<T>) -> Command) -> Result<T> {
        let (reply, answer) = bounded(1);
        self.tx
            .send(command(reply))
            .map_err(|_| EvacError::ServiceUnavailable)?;
        answer.recv().map_err(|_| EvacError::ServiceUnavailable)
    }

    pub fn register_zones(&self, inputs: Vec<ZoneInput>) -> Result<Vec<Zone>> {
        self.call(|reply| Command::RegisterZones { inputs, reply })?
    }

    pub fn register_vehicles(&self, inputs: Vec<VehicleInput>) -> Result<Vec<Vehicle>> {
        self.call(|reply| Command::RegisterVehicles { inputs, reply })?
    }

    /// `None` picks the configured default for either argument. Explicit
    /// options are validated before the request reaches the planner thread.
    pub fn generate_plan(
        &self,
        strategy: Option<Strategy>,
        options: Option<PlanOptions>,
    ) -> Result<EvacuationPlan> {
        if let Some(opts) = &options {
            opts.validate()?;
        }
        self.call(|reply| Command::GeneratePlan {
            strategy,
            options,
            reply,
        })
    }

    pub fn apply_evacuation_update(&self, zone_ref: &str, vehicle_ref: &str) -> Result<ZoneStatus> {
        self.call(|reply| Command::ApplyUpdate {
            zone_ref: zone_ref.to_string(),
            vehicle_ref: vehicle_ref.to_string(),
            reply,
        })?
    }

    pub fn status(&self) -> Result<Vec<ZoneStatus>> {
        self.call(Command::Status)
    }

    pub fn zones(&self) -> Result<Vec<Zone>> {
        self.call(Command::Zones)
    }

    pub fn vehicles(&self) -> Result<Vec<Vehicle>> {
        self.call(Command::Vehicles)
    }

    pub fn clear_all(&self) -> Result<()> {
        self.call(Command::ClearAll)
    }

    /// Stops the actor after it finishes the commands queued before this one.
    pub fn shutdown(&self) -> Result<()> {
        self.call(Command::Shutdown)
    }
}

impl Actor {
    fn run(mut self, rx: Receiver<Command>) {
        for command in rx.iter() {
            // A dropped reply receiver only means the caller stopped waiting.
            match command {
                Command::RegisterZones { inputs, reply } => {
                    let _ = reply.send(self.registry.register_zones(inputs));
                }
                Command::RegisterVehicles { inputs, reply } => {
                    let _ = reply.send(self.registry.register_vehicles(inputs));
                }
                Command::GeneratePlan {
                    strategy,
                    options,
                    reply,
                } => {
                    let strategy = strategy.unwrap_or(self.config.default_strategy);
                    let options = options.unwrap_or(self.config.default_options);
                    let _ = reply.send(self.plan(strategy, options));
                }
                Command::ApplyUpdate {
                    zone_ref,
                    vehicle_ref,
                    reply,
                } => {
                    let _ = reply.send(self.registry.apply_evacuation_update(&zone_ref, &vehicle_ref));
                }
                Command::Status(reply) => {
                    let _ = reply.send(self.registry.status());
                }
                Command::Zones(reply) => {
                    let _ = reply.send(self.registry.zones().to_vec());
                }
                Command::Vehicles(reply) => {
                    let _ = reply.send(self.registry.vehicles().to_vec());
                }
                Command::ClearAll(reply) => {
                    self.registry.clear_all();
                    self.cache.clear();
                    let _ = reply.send(());
                }
                Command::Shutdown(reply) => {
                    let _ = reply.send(());
                    break;
                }
            }
        }
        info!("planning service stopped");
    }

    fn plan(&mut self, strategy: Strategy, options: PlanOptions) -> EvacuationPlan {
        let key = match fingerprint(self.registry.zones(), self.registry.vehicles(), strategy, &options) {
            Ok(key) => Some(key),
            Err(err) => {
                debug!(%err, "plan not cacheable");
                None
            }
        };

        if let Some(plan) = key.and_then(|k| self.cache.get(k)) {
            return plan;
        }

        let (zones, vehicles) = self.registry.snapshot();
        let plan = generate_plan(&zones, &vehicles, strategy, &options);
        if let Some(key) = key {
            self.cache.insert(key, plan.clone());
        }
        plan
    }
}
