//! Fluent builder for constructing a [`Sim`].

use dm_comm::CommunicationModel;
use dm_core::{SimConfig, SimRng};
use dm_routing::{InverseCost, Package, ReinforcementPolicy, RoutingConfig};
use dm_spatial::RoadModel;

use crate::{Sim, SimError, SimResult};

/// Seed offset of the communication substrate's reliability stream.
const COMM_STREAM: u64 = 1;

/// Fluent builder for [`Sim<R, P>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: total ticks, seed, tick duration
/// - [`RoutingConfig`]: protocol parameters
/// - `R: RoadModel`: cost estimates for reinforcement (e.g.
///   [`dm_spatial::EuclideanRoad`])
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                   |
/// |-----------------|-------------------------------------------|
/// | `.policy(p)`    | `InverseCost` from the routing config     |
/// | `.packages(v)`  | No packages                               |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, routing, NetworkRoad::new(network))
///     .packages(load_packages_csv(path)?)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<R: RoadModel, P: ReinforcementPolicy = InverseCost> {
    config:   SimConfig,
    routing:  RoutingConfig,
    road:     R,
    policy:   P,
    packages: Vec<Package>,
}

impl<R: RoadModel> SimBuilder<R, InverseCost> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, routing: RoutingConfig, road: R) -> Self {
        Self {
            config,
            policy: routing.policy(),
            routing,
            road,
            packages: Vec::new(),
        }
    }
}

impl<R: RoadModel, P: ReinforcementPolicy> SimBuilder<R, P> {
    /// Replace the reinforcement policy.
    pub fn policy<Q: ReinforcementPolicy>(self, policy: Q) -> SimBuilder<R, Q> {
        SimBuilder {
            config:   self.config,
            routing:  self.routing,
            road:     self.road,
            policy,
            packages: self.packages,
        }
    }

    /// Packages to schedule at build time, in order.
    pub fn packages(mut self, packages: Vec<Package>) -> Self {
        self.packages = packages;
        self
    }

    /// Validate inputs, register every package, and return a ready-to-run
    /// [`Sim`].
    pub fn build(self) -> SimResult<Sim<R, P>> {
        if self.config.tick_duration_ms == 0 {
            return Err(SimError::Config("tick_duration_ms must be positive".into()));
        }
        self.routing.validate()?;

        let comm = CommunicationModel::new(SimRng::new(self.config.seed).child(COMM_STREAM));
        let mut sim = Sim::new(self.config, self.routing, self.road, self.policy, comm);
        for package in self.packages {
            sim.add_package(package)?;
        }
        Ok(sim)
    }
}
