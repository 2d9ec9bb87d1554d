//! `PackageAgent`: a package's routing delegate.
//!
//! # Per-tick behavior
//!
//! 1. [`begin_tick`](PackageAgent::begin_tick) evaporates the path table.
//!    The scheduler calls it for every agent before any agent ticks, so no
//!    ant of this tick can touch a table that has not decayed yet.
//! 2. [`tick`](PackageAgent::tick): if the feasibility countdown has reached
//!    the configured interval, broadcast a fresh [`FeasibilityAnt`] to
//!    destinations and reset the countdown; otherwise increment it.
//!
//! # Message handling
//!
//! | Ant         | Reaction                                                     |
//! |-------------|--------------------------------------------------------------|
//! | Feasibility | drop on loop; else learn the route, relay while budget lasts |
//! | Forward     | forward to a table-chosen neighbour, or turn back            |
//! | Backward    | drop if not on the way back; else reinforce and retrace      |
//!
//! Once its package is picked up (or delivered) the agent stops ticking and
//! ignores every ant.  A dropped package makes it active again.

use dm_comm::{CommunicationApi, Endpoint, Role};
use dm_core::{AgentId, AgentRng, PackageId, Point};
use tracing::{debug, trace};

use crate::{
    Ant, BackwardAnt, FeasibilityAnt, ForwardAnt, Hop, Package, PackageDestination, PathTable,
    RoutingConfig, RoutingContext,
};

pub struct PackageAgent {
    id:          AgentId,
    package:     PackageId,
    destination: PackageDestination,
    table:       PathTable,
    rng:         AgentRng,
    config:      RoutingConfig,
    /// Broadcast position: the package's pickup location.
    position:    Point,
    /// Ticks since the last feasibility wave.
    since_feasibility: u32,
    picked_up:   bool,
}

impl PackageAgent {
    /// Create the agent for `package`, with `destination_id` as the id of its
    /// delivery endpoint.
    pub fn new(
        id:             AgentId,
        destination_id: AgentId,
        package:        &Package,
        config:         RoutingConfig,
        rng:            AgentRng,
    ) -> Self {
        Self {
            id,
            package: package.id,
            destination: PackageDestination::new(
                destination_id,
                id,
                package.id,
                package.delivery_location(),
            ),
            table: PathTable::new(config.evaporation, config.base_intensity),
            rng,
            config,
            position: package.pickup_location(),
            // Start saturated so the first tick sends a wave.
            since_feasibility: config.feasibility_interval,
            picked_up: !package.needs_pickup(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn package_id(&self) -> PackageId {
        self.package
    }

    pub fn destination(&self) -> &PackageDestination {
        &self.destination
    }

    pub fn path_table(&self) -> &PathTable {
        &self.table
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    /// `false` once the package has been picked up.
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.picked_up
    }

    /// Registration for the agent's own broadcasting endpoint.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.id, Role::PackageAgent, self.position)
            .with_radius(self.config.broadcast_range)
            .with_reliability(self.config.reliability)
    }

    /// This agent as a path hop.
    #[inline]
    pub fn hop(&self) -> Hop {
        Hop::new(self.id, self.position)
    }

    /// Refresh the picked-up flag and broadcast position from `package`.
    pub fn sync(&mut self, package: &Package) {
        let picked_up = !package.needs_pickup();
        if picked_up != self.picked_up {
            debug!(agent = %self.id, package = %self.package, state = %package.state(), "package state changed");
        }
        self.picked_up = picked_up;
        self.position = package.pickup_location();
    }

    // ── Scheduler callbacks ───────────────────────────────────────────────

    /// Decay the path table.  Must run before anything else touches the
    /// table this tick.
    pub fn begin_tick(&mut self, package: &Package) {
        self.sync(package);
        if !self.picked_up {
            self.table.evaporate();
        }
    }

    /// Advance the feasibility countdown, broadcasting a wave when it is due.
    pub fn tick(
        &mut self,
        package: &Package,
        ctx:     &RoutingContext<'_>,
        comm:    &mut dyn CommunicationApi<Ant>,
    ) {
        self.sync(package);
        if self.picked_up {
            return;
        }

        if self.since_feasibility >= self.config.feasibility_interval {
            self.since_feasibility = 0;
            self.send_feasibility(ctx, comm);
        } else {
            self.since_feasibility += 1;
        }
    }

    /// Second-phase hook.  Package agents do all their work in `tick` and in
    /// message handlers.
    pub fn after_tick(&mut self, package: &Package, _ctx: &RoutingContext<'_>) {
        self.sync(package);
    }

    fn send_feasibility(&mut self, ctx: &RoutingContext<'_>, comm: &mut dyn CommunicationApi<Ant>) {
        let hops = self.config.max_feasibility_hops;
        if hops == 0 {
            return;
        }
        trace!(agent = %self.id, tick = %ctx.tick, hops, "feasibility wave");
        comm.broadcast(FeasibilityAnt::originate(self.hop(), hops).into(), Role::PackageDestination);
    }

    // ── Message handling ──────────────────────────────────────────────────

    /// Handle an ant delivered to this agent or to its destination endpoint.
    pub fn receive(
        &mut self,
        from:    AgentId,
        ant:     Ant,
        package: &Package,
        ctx:     &RoutingContext<'_>,
        comm:    &mut dyn CommunicationApi<Ant>,
    ) {
        self.sync(package);
        if self.picked_up {
            trace!(agent = %self.id, %from, kind = %ant.kind(), "ignoring ant, package picked up");
            return;
        }
        match ant {
            Ant::Feasibility(ant)         => self.on_feasibility(ant, comm),
            Ant::ForwardExploration(ant)  => self.on_forward(ant, comm),
            Ant::BackwardExploration(ant) => self.on_backward(ant, package, ctx, comm),
        }
    }

    fn on_feasibility(&mut self, ant: FeasibilityAnt, comm: &mut dyn CommunicationApi<Ant>) {
        if ant.path.contains(self.id) {
            trace!(agent = %self.id, path = %ant.path, "feasibility loop dropped");
            return;
        }

        // Received as [origin, .., neighbour]; stored from this agent outward.
        let learned = self.table.add_path(ant.path.reversed());
        if learned {
            debug!(agent = %self.id, path = %ant.path, "learned route");
        }

        if let Some(relay) = ant.relayed(self.hop()) {
            comm.broadcast(relay.into(), Role::PackageDestination);
        }
    }

    fn on_forward(&mut self, ant: ForwardAnt, comm: &mut dyn CommunicationApi<Ant>) {
        if !ant.may_forward() {
            return self.turn_back(&ant, "budget spent", comm);
        }

        let next = self
            .table
            .choose_path(&mut self.rng)
            .and_then(|path| path.first())
            .map(|hop| hop.agent);

        match next {
            None => self.turn_back(&ant, "no route", comm),
            Some(next) if ant.would_loop(self.id, next) => self.turn_back(&ant, "loop", comm),
            Some(next) => {
                trace!(agent = %self.id, %next, hops_left = ant.hops_left, "forwarding exploration");
                comm.send(next, ant.forwarded(self.hop()).into());
            }
        }
    }

    fn turn_back(&self, ant: &ForwardAnt, reason: &'static str, comm: &mut dyn CommunicationApi<Ant>) {
        let (to, back) = ant.turn_back(self.hop());
        trace!(agent = %self.id, %to, reason, path_len = ant.path.len(), "turning exploration back");
        comm.send(to, back.into());
    }

    fn on_backward(
        &mut self,
        ant:     BackwardAnt,
        package: &Package,
        ctx:     &RoutingContext<'_>,
        comm:    &mut dyn CommunicationApi<Ant>,
    ) {
        if !ant.concerns(self.id) {
            trace!(agent = %self.id, "backward ant not for us");
            return;
        }

        let reward = self.table.update_pheromones(
            &ant.path_to_eval,
            package.delivery_location(),
            ctx.road,
            ctx.policy,
        );
        trace!(agent = %self.id, path = %ant.path_to_eval, ?reward, "reinforced");

        if let Some((to, next)) = ant.retraced(self.hop()) {
            comm.send(to, next.into());
        }
    }
}
