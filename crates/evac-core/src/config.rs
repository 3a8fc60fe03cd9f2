use crate::error::{EvacError, FieldIssue};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 100.0;
pub const DEFAULT_SPEED_FALLBACK_KMH: f64 = 40.0;
pub const DEFAULT_PLAN_CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Greedy,
    Weighted,
}

impl Strategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Greedy => "greedy",
            Strategy::Weighted => "weighted",
        }
    }
}

impl FromStr for Strategy {
    type Err = EvacError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(Strategy::Greedy),
            "weighted" => Ok(Strategy::Weighted),
            _ => Err(EvacError::InvalidStrategy(s.to_string())),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request planning knobs.
///
/// `max_distance_km` removes candidates before scoring in both planners.
/// `allow_multi_vehicle` only changes the greedy planner; the weighted
/// planner always sends one vehicle per zone. `prefer_fewer_trips` lets the
/// greedy planner break score ties in favour of the larger vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanOptions {
    pub max_distance_km: f64,
    pub allow_multi_vehicle: bool,
    pub prefer_fewer_trips: bool,
    pub speed_fallback_kmh: f64,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
            allow_multi_vehicle: true,
            prefer_fewer_trips: true,
            speed_fallback_kmh: DEFAULT_SPEED_FALLBACK_KMH,
        }
    }
}

impl PlanOptions {
    /// Rejects knobs no plan can be computed with. Every bad field is
    /// reported.
    pub fn validate(&self) -> Result<(), EvacError> {
        let mut issues = Vec::new();
        if !self.max_distance_km.is_finite() || self.max_distance_km < 0.0 {
            issues.push(FieldIssue::new(
                "maxDistanceKm",
                "must be a finite number of kilometres, zero or more",
            ));
        }
        if !self.speed_fallback_kmh.is_finite() || self.speed_fallback_kmh <= 0.0 {
            issues.push(FieldIssue::new(
                "speedFallbackKmh",
                "must be a finite speed greater than 0",
            ));
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(EvacError::validation(issues))
        }
    }
}

/// Process-wide settings for the planning service.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    pub default_options: PlanOptions,
    pub default_strategy: Strategy,
    pub plan_cache_ttl: Duration,
    /// Seed for generated ids; entropy when `None`.
    pub id_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_options: PlanOptions::default(),
            default_strategy: Strategy::Greedy,
            plan_cache_ttl: DEFAULT_PLAN_CACHE_TTL,
            id_seed: None,
        }
    }
}

impl EngineConfig {
    /// Reads `EVAC_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, EvacError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EvacError> {
        let mut config = Self::default();
        let opts = &mut config.default_options;

        if let Some(v) = parsed::<f64>(&lookup, "EVAC_MAX_DISTANCE_KM")? {
            if !v.is_finite() || v < 0.0 {
                return Err(config_error("EVAC_MAX_DISTANCE_KM", &v.to_string()));
            }
            opts.max_distance_km = v;
        }
        if let Some(v) = parsed::<bool>(&lookup, "EVAC_ALLOW_MULTI_VEHICLE")? {
            opts.allow_multi_vehicle = v;
        }
        if let Some(v) = parsed::<bool>(&lookup, "EVAC_PREFER_FEWER_TRIPS")? {
            opts.prefer_fewer_trips = v;
        }
        if let Some(v) = parsed::<f64>(&lookup, "EVAC_SPEED_FALLBACK_KMH")? {
            if !v.is_finite() || v <= 0.0 {
                return Err(config_error("EVAC_SPEED_FALLBACK_KMH", &v.to_string()));
            }
            opts.speed_fallback_kmh = v;
        }
        if let Some(raw) = lookup("EVAC_DEFAULT_STRATEGY") {
            config.default_strategy = raw
                .parse()
                .map_err(|_| config_error("EVAC_DEFAULT_STRATEGY", &raw))?;
        }
        if let Some(secs) = parsed::<u64>(&lookup, "EVAC_PLAN_CACHE_TTL_SECS")? {
            config.plan_cache_ttl = Duration::from_secs(secs);
        }
        config.id_seed = parsed::<u64>(&lookup, "EVAC_ID_SEED")?;

        Ok(config)
    }
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, EvacError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| config_error(key, &raw)),
    }
}

fn config_error(key: &str, value: &str) -> EvacError {
    EvacError::Config {
        key: key.to_string(),
        value: value.to_string(),
    }
}
