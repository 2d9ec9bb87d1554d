//! `PathTable`: an agent's known routes and their pheromone intensities.
//!
//! # Keying
//!
//! Routes are stored oriented from the owning agent: the first hop is the
//! neighbour an ant would be forwarded to.  That first hop is the entry key,
//! so the table holds at most one route per neighbour and its intensity is
//! the weight of "go via this neighbour".
//! The stored route is whatever feasibility news first created the entry;
//! reinforcement only weights the neighbour and never replaces that route.
//!
//! # Intensity lifecycle
//!
//! | Event                  | Effect                                          |
//! |------------------------|-------------------------------------------------|
//! | `add_path`, new key    | entry created at `base_intensity`               |
//! | `add_path`, known key  | nothing (repeat feasibility news is idempotent) |
//! | `update_pheromones`    | intensity += policy reward                      |
//! | `evaporate`            | every intensity *= `evaporation`                |
//!
//! Entries are never removed.  Intensity floors at zero, and a zero-weight
//! entry is never chosen.

use std::collections::BTreeMap;

use dm_core::{AgentId, AgentRng, Point};
use dm_spatial::RoadModel;

use crate::{Path, ReinforcementPolicy};

/// A stored route and its pheromone intensity.
#[derive(Clone, Debug, PartialEq)]
pub struct PathEntry {
    pub path:      Path,
    pub intensity: f64,
}

/// Per-agent route store.
#[derive(Clone, Debug)]
pub struct PathTable {
    entries:        BTreeMap<AgentId, PathEntry>,
    evaporation:    f64,
    base_intensity: f64,
}

impl PathTable {
    /// `evaporation` is the per-tick decay factor, expected in (0, 1).
    pub fn new(evaporation: f64, base_intensity: f64) -> Self {
        Self {
            entries: BTreeMap::new(),
            evaporation,
            base_intensity: base_intensity.max(0.0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entry routing via `first_hop`.
    pub fn get(&self, first_hop: AgentId) -> Option<&PathEntry> {
        self.entries.get(&first_hop)
    }

    pub fn intensity(&self, first_hop: AgentId) -> Option<f64> {
        self.entries.get(&first_hop).map(|e| e.intensity)
    }

    /// Entries in ascending first-hop order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &PathEntry)> {
        self.entries.iter().map(|(k, v)| (*k, v))
    }

    /// Sum of all intensities.
    pub fn total_intensity(&self) -> f64 {
        self.entries.values().map(|e| e.intensity).sum()
    }

    /// Decay every intensity by the evaporation factor.
    pub fn evaporate(&mut self) {
        for entry in self.entries.values_mut() {
            entry.intensity = (entry.intensity * self.evaporation).max(0.0);
        }
    }

    /// Record `path` if nothing routes via its first hop yet.
    ///
    /// Returns `true` if a new entry was created.  An empty path is ignored.
    pub fn add_path(&mut self, path: Path) -> bool {
        let Some(first) = path.first().map(|h| h.agent) else {
            return false;
        };
        if self.entries.contains_key(&first) {
            return false;
        }
        self.entries.insert(first, PathEntry { path, intensity: self.base_intensity });
        true
    }

    /// Reinforce the entry routing via `path_to_eval`'s first hop by the
    /// policy's reward, creating the entry first if it is unknown.
    ///
    /// Returns the reward applied, or `None` if the path is empty or cannot
    /// be costed.
    pub fn update_pheromones(
        &mut self,
        path_to_eval: &Path,
        delivery:     Point,
        road:         &dyn RoadModel,
        policy:       &dyn ReinforcementPolicy,
    ) -> Option<f64> {
        let first = path_to_eval.first()?.agent;
        let reward = policy.reward(path_to_eval, delivery, road)?.max(0.0);
        let base = self.base_intensity;
        let entry = self.entries.entry(first).or_insert_with(|| PathEntry {
            path:      path_to_eval.clone(),
            intensity: base,
        });
        entry.intensity += reward;
        Some(reward)
    }

    /// Pick a route with probability proportional to its intensity.
    ///
    /// Entries are weighed in ascending first-hop order, so the same RNG
    /// state and table contents always yield the same route.  Returns `None`
    /// if the table is empty or every intensity is zero.
    pub fn choose_path(&self, rng: &mut AgentRng) -> Option<&Path> {
        if self.entries.is_empty() {
            return None;
        }
        let weights: Vec<f64> = self.entries.values().map(|e| e.intensity).collect();
        let idx = rng.choose_weighted(&weights)?;
        self.entries.values().nth(idx).map(|e| &e.path)
    }
}
