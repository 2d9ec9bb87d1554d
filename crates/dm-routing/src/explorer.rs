//! `Explorer`: the transporting side of exploration.
//!
//! A transporter that wants to know where to go after a pickup asks its
//! explorer to probe from a package agent.  The explorer launches a forward
//! ant on its next tick and collects what comes back.

use std::collections::VecDeque;

use dm_comm::{CommunicationApi, Endpoint, Role};
use dm_core::{AgentId, Point, Tick};
use tracing::{debug, trace};

use crate::{Ant, ForwardAnt, Path, RoutingContext};

/// A route reported by a returning backward ant.
#[derive(Clone, Debug, PartialEq)]
pub struct DiscoveredRoute {
    /// Agents from the first hop to the turnaround agent.
    pub path:          Path,
    pub discovered_at: Tick,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Request {
    first_hop: AgentId,
    hops:      u32,
}

pub struct Explorer {
    id:       AgentId,
    position: Point,
    pending:  VecDeque<Request>,
    routes:   Vec<DiscoveredRoute>,
}

impl Explorer {
    pub fn new(id: AgentId, position: Point) -> Self {
        Self { id, position, pending: VecDeque::new(), routes: Vec::new() }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    /// Receive-only registration: explorers never broadcast.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.id, Role::Explorer, self.position)
    }

    /// Queue an exploration starting at `first_hop` with a budget of `hops`.
    pub fn request(&mut self, first_hop: AgentId, hops: u32) {
        self.pending.push_back(Request { first_hop, hops });
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    /// Every route reported so far, oldest first.
    pub fn routes(&self) -> &[DiscoveredRoute] {
        &self.routes
    }

    /// The longest route reported so far; among equals, the most recent.
    pub fn best_route(&self) -> Option<&DiscoveredRoute> {
        self.routes.iter().max_by_key(|r| r.path.len())
    }

    pub fn clear_routes(&mut self) {
        self.routes.clear();
    }

    /// Launch every queued exploration.  A zero budget is discarded.
    pub fn tick(&mut self, ctx: &RoutingContext<'_>, comm: &mut dyn CommunicationApi<Ant>) {
        while let Some(req) = self.pending.pop_front() {
            if req.hops == 0 {
                continue;
            }
            trace!(explorer = %self.id, tick = %ctx.tick, first_hop = %req.first_hop, hops = req.hops, "launching exploration");
            comm.send(req.first_hop, ForwardAnt::launch(self.id, req.hops).into());
        }
    }

    /// Record a completed exploration.  Anything else is ignored.
    pub fn receive(&mut self, from: AgentId, ant: Ant, ctx: &RoutingContext<'_>) {
        match ant {
            Ant::BackwardExploration(ant) if ant.origin == self.id && ant.is_home() => {
                debug!(explorer = %self.id, %from, path = %ant.path_to_eval, "route discovered");
                self.routes.push(DiscoveredRoute { path: ant.path_to_eval, discovered_at: ctx.tick });
            }
            other => {
                trace!(explorer = %self.id, %from, kind = %other.kind(), "ignoring ant");
            }
        }
    }
}
