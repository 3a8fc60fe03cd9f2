//! Content-keyed memo of generated plans.
//!
//! The key covers everything a plan depends on except the clock, so any
//! registry change (a new zone, an evacuation update) produces a new key and
//! stale entries simply age out.

use crate::orchestrator::EvacuationPlan;
use evac_core::{PlanOptions, Strategy, Vehicle, Zone};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::debug;
use xxhash_rust::xxh3::xxh3_64;

pub fn fingerprint(
    zones: &[Zone],
    vehicles: &[Vehicle],
    strategy: Strategy,
    options: &PlanOptions,
) -> Result<u64, serde_json::Error> {
    let bytes = serde_json::to_vec(&(zones, vehicles, strategy, options))?;
    Ok(xxh3_64(&bytes))
}

struct Entry {
    plan: EvacuationPlan,
    stored_at: Instant,
}

pub struct PlanCache {
    ttl: Duration,
    entries: HashMap<u64, Entry>,
}

impl PlanCache {
    pub fn new(ttl: Duration) -> Self {
        PlanCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&mut self, key: u64) -> Option<EvacuationPlan> {
        self.get_at(key, Instant::now())
    }

    pub fn get_at(&mut self, key: u64, now: Instant) -> Option<EvacuationPlan> {
        let ttl = self.ttl;
        let fresh = self
            .entries
            .get(&key)
            .map(|e| now.saturating_duration_since(e.stored_at) < ttl);

        match fresh {
            Some(true) => {
                debug!(key, "plan cache hit");
                self.entries.get(&key).map(|e| e.plan.clone())
            }
            Some(false) => {
                self.entries.remove(&key);
                debug!(key, "plan cache entry expired");
                None
            }
            None => {
                debug!(key, "plan cache miss");
                None
            }
        }
    }

    pub fn insert(&mut self, key: u64, plan: EvacuationPlan) {
        self.insert_at(key, plan, Instant::now());
    }

    pub fn insert_at(&mut self, key: u64, plan: EvacuationPlan, now: Instant) {
        self.purge_expired(now);
        self.entries.insert(key, Entry { plan, stored_at: now });
    }

    /// Drops every entry older than the TTL.
    pub fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, e| now.saturating_duration_since(e.stored_at) < ttl);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            debug!(evicted, "plan cache purged");
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
