//! Ant messages: the three kinds of exploration and feedback step.
//!
//! `Ant` is a tagged union dispatched by `match`; [`AntKind`] is its bare
//! discriminant for logging and counting.
//!
//! The pure state transitions (extend, turn back, retrace) live here so the
//! agent handlers only decide *when* to apply them.

use std::fmt;

use dm_core::AgentId;

use crate::{Hop, Path};

/// Broadcast probe advertising "a route through these agents exists".
#[derive(Clone, Debug, PartialEq)]
pub struct FeasibilityAnt {
    /// Agents the probe has visited, originator first.
    pub path:      Path,
    pub hops_left: u32,
}

/// Point-to-point probe following table-guided choices.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardAnt {
    /// The endpoint that launched the exploration; it receives the final
    /// backward ant.
    pub origin:    AgentId,
    /// Agents that have forwarded the ant so far, in travel order.
    pub path:      Path,
    pub hops_left: u32,
}

/// Point-to-point feedback retracing a forward ant's path.
#[derive(Clone, Debug, PartialEq)]
pub struct BackwardAnt {
    pub origin:       AgentId,
    /// Agents still to visit, consumed from the tail.  The last hop is the
    /// current recipient.
    pub path_to_do:   Path,
    /// The route evaluated so far, from the next hop onward to the
    /// turnaround agent.
    pub path_to_eval: Path,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Ant {
    Feasibility(FeasibilityAnt),
    ForwardExploration(ForwardAnt),
    BackwardExploration(BackwardAnt),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AntKind {
    Feasibility,
    ForwardExploration,
    BackwardExploration,
}

impl AntKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AntKind::Feasibility         => "feasibility",
            AntKind::ForwardExploration  => "forward",
            AntKind::BackwardExploration => "backward",
        }
    }
}

impl fmt::Display for AntKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ant {
    pub fn kind(&self) -> AntKind {
        match self {
            Ant::Feasibility(_)         => AntKind::Feasibility,
            Ant::ForwardExploration(_)  => AntKind::ForwardExploration,
            Ant::BackwardExploration(_) => AntKind::BackwardExploration,
        }
    }
}

impl From<FeasibilityAnt> for Ant {
    fn from(ant: FeasibilityAnt) -> Self {
        Ant::Feasibility(ant)
    }
}

impl From<ForwardAnt> for Ant {
    fn from(ant: ForwardAnt) -> Self {
        Ant::ForwardExploration(ant)
    }
}

impl From<BackwardAnt> for Ant {
    fn from(ant: BackwardAnt) -> Self {
        Ant::BackwardExploration(ant)
    }
}

// ── Feasibility ───────────────────────────────────────────────────────────────

impl FeasibilityAnt {
    /// A fresh probe originated by `origin`.
    pub fn originate(origin: Hop, hops: u32) -> Self {
        Self { path: Path::single(origin), hops_left: hops }
    }

    /// The rebroadcast copy from `relay`, or `None` once the budget is spent.
    pub fn relayed(&self, relay: Hop) -> Option<FeasibilityAnt> {
        if self.hops_left <= 1 {
            return None;
        }
        Some(FeasibilityAnt {
            path:      self.path.extended(relay),
            hops_left: self.hops_left - 1,
        })
    }
}

// ── Forward exploration ───────────────────────────────────────────────────────

impl ForwardAnt {
    /// A fresh exploration launched by `origin`.  The traveled path starts
    /// empty: the origin is not a routing agent.
    pub fn launch(origin: AgentId, hops: u32) -> Self {
        Self { origin, path: Path::empty(), hops_left: hops }
    }

    /// `true` if `at` may still forward this ant.
    pub fn may_forward(&self) -> bool {
        self.hops_left > 1
    }

    /// `true` if forwarding to `next` would revisit an agent.
    pub fn would_loop(&self, at: AgentId, next: AgentId) -> bool {
        next == at || self.path.contains(next)
    }

    /// The copy `at` forwards onward.
    pub fn forwarded(&self, at: Hop) -> ForwardAnt {
        ForwardAnt {
            origin:    self.origin,
            path:      self.path.extended(at),
            hops_left: self.hops_left.saturating_sub(1),
        }
    }

    /// Convert into a backward ant at turnaround agent `at`.
    ///
    /// Returns the recipient (the last agent on the traveled path, or the
    /// origin if the path is empty) and the backward ant.
    pub fn turn_back(&self, at: Hop) -> (AgentId, BackwardAnt) {
        let to = self.path.last().map_or(self.origin, |h| h.agent);
        let ant = BackwardAnt {
            origin:       self.origin,
            path_to_do:   self.path.clone(),
            path_to_eval: Path::single(at),
        };
        (to, ant)
    }
}

// ── Backward exploration ──────────────────────────────────────────────────────

impl BackwardAnt {
    /// `true` if `agent` is still on the way back.
    pub fn concerns(&self, agent: AgentId) -> bool {
        self.path_to_do.contains(agent)
    }

    /// `true` once every agent has been revisited.
    pub fn is_home(&self) -> bool {
        self.path_to_do.is_empty()
    }

    /// The continuation after `at` has evaluated the ant.
    ///
    /// Drops the last hop of `path_to_do` and prepends `at` to
    /// `path_to_eval`.  Returns the next recipient (the new last hop, or the
    /// origin when nothing is left) and the continued ant.  `None` if
    /// `path_to_do` was already empty.
    pub fn retraced(&self, at: Hop) -> Option<(AgentId, BackwardAnt)> {
        let (rest, _) = self.path_to_do.remove_last()?;
        let to = rest.last().map_or(self.origin, |h| h.agent);
        let ant = BackwardAnt {
            origin:       self.origin,
            path_to_do:   rest,
            path_to_eval: self.path_to_eval.prepended(at),
        };
        Some((to, ant))
    }
}
