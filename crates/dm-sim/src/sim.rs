//! The `Sim` struct and its tick loop.

use std::collections::BTreeMap;

use dm_comm::CommunicationModel;
use dm_core::{AgentId, AgentRng, DmError, PackageId, Point, SimClock, SimConfig, Tick};
use dm_routing::{
    Ant, Explorer, InverseCost, Package, PackageAgent, ReinforcementPolicy, RoutingConfig,
    RoutingContext,
};
use dm_spatial::RoadModel;
use tracing::{debug, info, trace};

use crate::{SimError, SimObserver, SimResult, TickReport};

// ── Actors ────────────────────────────────────────────────────────────────────

/// Anything the scheduler ticks.
enum Actor {
    Package(PackageAgent),
    Explorer(Explorer),
}

/// Everything the scheduler mutates during a step.  Kept apart from the
/// road and policy so a step can borrow those immutably while it runs.
struct Population {
    comm:         CommunicationModel<Ant>,
    actors:       BTreeMap<AgentId, Actor>,
    packages:     BTreeMap<PackageId, Package>,
    by_package:   BTreeMap<PackageId, AgentId>,
    /// Destination endpoint → owning package agent.
    destinations: BTreeMap<AgentId, AgentId>,
    next_id:      u32,
}

impl Population {
    fn allocate_id(&mut self) -> AgentId {
        let id = AgentId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Evaporate every package agent's table.  Runs before any actor ticks,
    /// so every table has decayed before the first ant of the tick arrives.
    fn evaporate_all(&mut self) {
        for actor in self.actors.values_mut() {
            if let Actor::Package(agent) = actor {
                if let Some(package) = self.packages.get(&agent.package_id()) {
                    agent.begin_tick(package);
                }
            }
        }
    }

    /// Run one phase over every actor in id order, draining the queue after
    /// each.  Returns how many actors did work.
    fn run_phase(&mut self, ctx: &RoutingContext<'_>, after: bool) -> usize {
        let ids: Vec<AgentId> = self.actors.keys().copied().collect();
        let mut active = 0;

        for id in ids {
            match self.actors.get_mut(&id) {
                Some(Actor::Package(agent)) => {
                    let Some(package) = self.packages.get(&agent.package_id()) else {
                        continue;
                    };
                    if package.needs_pickup() {
                        active += 1;
                    }
                    if after {
                        agent.after_tick(package, ctx);
                    } else {
                        agent.tick(package, ctx, &mut self.comm.handle(id));
                    }
                }
                Some(Actor::Explorer(explorer)) => {
                    active += 1;
                    if !after {
                        explorer.tick(ctx, &mut self.comm.handle(id));
                    }
                }
                None => continue,
            }
            self.dispatch(ctx);
        }
        active
    }

    /// Deliver queued envelopes until the queue is empty.
    fn dispatch(&mut self, ctx: &RoutingContext<'_>) {
        while let Some(envelope) = self.comm.pop() {
            let owner = self.destinations.get(&envelope.to).copied().unwrap_or(envelope.to);
            match self.actors.get_mut(&owner) {
                Some(Actor::Package(agent)) => {
                    let Some(package) = self.packages.get(&agent.package_id()) else {
                        continue;
                    };
                    agent.receive(envelope.from, envelope.message, package, ctx, &mut self.comm.handle(owner));
                }
                Some(Actor::Explorer(explorer)) => {
                    explorer.receive(envelope.from, envelope.message, ctx);
                }
                None => {
                    trace!(to = %envelope.to, "no actor for envelope");
                }
            }
        }
    }

    fn package_agent_mut(&mut self, package: PackageId) -> SimResult<(&mut PackageAgent, &mut Package)> {
        let package_ref = self
            .packages
            .get_mut(&package)
            .ok_or(DmError::PackageNotFound(package))?;
        let agent_id = self.by_package.get(&package).copied();
        match agent_id.and_then(|id| self.actors.get_mut(&id)) {
            Some(Actor::Package(agent)) => Ok((agent, package_ref)),
            _ => Err(DmError::PackageNotFound(package).into()),
        }
    }
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim<R, P>` owns every package, package agent and explorer, the
/// communication substrate, the road model `R` used for cost estimates, and
/// the reinforcement policy `P`.
///
/// Package lifecycle transitions are driven from outside through
/// [`pickup_package`](Self::pickup_package),
/// [`drop_package`](Self::drop_package) and
/// [`deliver_package`](Self::deliver_package), standing in for the
/// transporting agents.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<R: RoadModel, P: ReinforcementPolicy = InverseCost> {
    /// Global configuration (total ticks, seed, tick duration).
    pub config: SimConfig,

    /// Simulation clock; tracks the current tick and maps to wall time.
    pub clock: SimClock,

    routing: RoutingConfig,
    road:    R,
    policy:  P,
    pop:     Population,
}

impl<R: RoadModel, P: ReinforcementPolicy> Sim<R, P> {
    pub(crate) fn new(
        config:  SimConfig,
        routing: RoutingConfig,
        road:    R,
        policy:  P,
        comm:    CommunicationModel<Ant>,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            routing,
            road,
            policy,
            pop: Population {
                comm,
                actors:       BTreeMap::new(),
                packages:     BTreeMap::new(),
                by_package:   BTreeMap::new(),
                destinations: BTreeMap::new(),
                next_id:      0,
            },
        }
    }

    // ── Run loop ──────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        info!(
            packages = self.pop.packages.len(),
            end = %self.config.end_tick(),
            "simulation starting"
        );
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer);
        }
        observer.on_sim_end(self.clock.current_tick);
        info!(tick = %self.clock.current_tick, "simulation finished");
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer);
        }
        Ok(())
    }

    fn step<O: SimObserver>(&mut self, observer: &mut O) {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let report = self.process_tick(now);
        observer.on_tick_end(now, &report);
        self.clock.advance();
    }

    fn process_tick(&mut self, now: Tick) -> TickReport {
        let ctx = RoutingContext::new(
            now,
            self.clock.current_millis(),
            self.clock.tick_duration_ms,
            &self.road,
            &self.policy,
        );

        // ── Phase 0: evaporation, before any message moves ────────────────
        self.pop.evaporate_all();

        // ── Phase 1: tick every actor ─────────────────────────────────────
        let ticked = self.pop.run_phase(&ctx, false);

        // ── Phase 2: after-tick ───────────────────────────────────────────
        self.pop.run_phase(&ctx, true);

        let report = TickReport { ticked, messages: self.pop.comm.take_stats() };
        debug!(
            tick = %now,
            ticked,
            delivered = report.delivered(),
            dropped = report.dropped(),
            "tick complete"
        );
        report
    }

    // ── Population ────────────────────────────────────────────────────────

    /// Schedule `package` with a fresh package agent and destination
    /// endpoint.  Returns the agent's id.
    pub fn add_package(&mut self, package: Package) -> SimResult<AgentId> {
        if self.pop.packages.contains_key(&package.id) {
            return Err(SimError::DuplicatePackage(package.id));
        }
        let agent_id = self.pop.allocate_id();
        let destination_id = self.pop.allocate_id();
        let rng = AgentRng::new(self.config.seed, agent_id);
        let agent = PackageAgent::new(agent_id, destination_id, &package, self.routing, rng);

        self.pop.comm.register(agent.endpoint())?;
        if let Err(e) = self.pop.comm.register(agent.destination().endpoint()) {
            self.pop.comm.unregister(agent_id);
            return Err(e.into());
        }

        debug!(agent = %agent_id, package = %package.id, "package scheduled");
        self.pop.destinations.insert(destination_id, agent_id);
        self.pop.by_package.insert(package.id, agent_id);
        self.pop.packages.insert(package.id, package);
        self.pop.actors.insert(agent_id, Actor::Package(agent));
        Ok(agent_id)
    }

    /// Add an explorer endpoint at `position`.  Returns its id.
    pub fn add_explorer(&mut self, position: Point) -> SimResult<AgentId> {
        let id = self.pop.allocate_id();
        let explorer = Explorer::new(id, position);
        self.pop.comm.register(explorer.endpoint())?;
        self.pop.actors.insert(id, Actor::Explorer(explorer));
        Ok(id)
    }

    /// Queue an exploration from `explorer` starting at package agent
    /// `first_hop`, with the configured hop budget.  The forward ant leaves
    /// on the explorer's next tick.
    pub fn explore(&mut self, explorer: AgentId, first_hop: AgentId) -> SimResult<()> {
        let hops = self.routing.exploration_hops;
        self.explorer_mut(explorer)?.request(first_hop, hops);
        Ok(())
    }

    pub fn move_explorer(&mut self, explorer: AgentId, position: Point) -> SimResult<()> {
        self.explorer_mut(explorer)?.set_position(position);
        self.pop.comm.set_position(explorer, position)?;
        Ok(())
    }

    fn explorer_mut(&mut self, id: AgentId) -> SimResult<&mut Explorer> {
        match self.pop.actors.get_mut(&id) {
            Some(Actor::Explorer(explorer)) => Ok(explorer),
            Some(Actor::Package(_)) => Err(SimError::NotAnExplorer(id)),
            None => Err(DmError::AgentNotFound(id).into()),
        }
    }

    // ── Package transitions ───────────────────────────────────────────────

    /// A transporter picked the package up.  Its agent stops routing.
    pub fn pickup_package(&mut self, package: PackageId) -> SimResult<()> {
        let (agent, pkg) = self.pop.package_agent_mut(package)?;
        pkg.pickup()?;
        agent.sync(pkg);
        Ok(())
    }

    /// A transporter put the package down at `at`.  Its agent resumes
    /// routing from there.
    pub fn drop_package(&mut self, package: PackageId, at: Point) -> SimResult<()> {
        let (agent, pkg) = self.pop.package_agent_mut(package)?;
        pkg.drop_at(at)?;
        agent.sync(pkg);
        let agent_id = agent.id();
        self.pop.comm.set_position(agent_id, at)?;
        Ok(())
    }

    /// The package reached its delivery point.  Its agent and destination
    /// leave scheduling and communication; ants still in flight to them are
    /// dropped.
    pub fn deliver_package(&mut self, package: PackageId) -> SimResult<()> {
        let (agent, pkg) = self.pop.package_agent_mut(package)?;
        pkg.deliver()?;
        agent.sync(pkg);
        let agent_id = agent.id();
        let destination_id = agent.destination().id;

        self.pop.comm.unregister(agent_id);
        self.pop.comm.unregister(destination_id);
        self.pop.destinations.remove(&destination_id);
        self.pop.by_package.remove(&package);
        self.pop.actors.remove(&agent_id);
        debug!(agent = %agent_id, %package, "package delivered");
        Ok(())
    }

    // ── Introspection ─────────────────────────────────────────────────────

    pub fn routing_config(&self) -> &RoutingConfig {
        &self.routing
    }

    pub fn package(&self, id: PackageId) -> Option<&Package> {
        self.pop.packages.get(&id)
    }

    /// Every package ever scheduled, delivered ones included.
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.pop.packages.values()
    }

    pub fn agent(&self, id: AgentId) -> Option<&PackageAgent> {
        match self.pop.actors.get(&id) {
            Some(Actor::Package(agent)) => Some(agent),
            _ => None,
        }
    }

    /// The package agent routing for `package`, until it is delivered.
    pub fn agent_for(&self, package: PackageId) -> Option<&PackageAgent> {
        self.pop.by_package.get(&package).and_then(|&id| self.agent(id))
    }

    pub fn explorer(&self, id: AgentId) -> Option<&Explorer> {
        match self.pop.actors.get(&id) {
            Some(Actor::Explorer(explorer)) => Some(explorer),
            _ => None,
        }
    }

    /// The communication substrate, for registration checks and stats.
    pub fn comm(&self) -> &CommunicationModel<Ant> {
        &self.pop.comm
    }
}
