//! `Path`: an immutable sequence of agent hops.
//!
//! Every extension produces a new `Path`; nothing mutates a path in place.
//! Ants carry paths from agent to agent, and a path table stores one per
//! entry, so value semantics keep every holder's copy stable.
//!
//! Each [`Hop`] records the agent and the position it broadcast from, so a
//! receiver can estimate road costs for the path without asking anyone.

use std::fmt;
use std::sync::Arc;

use dm_core::{AgentId, Point};

/// One agent on a path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Hop {
    pub agent:    AgentId,
    pub position: Point,
}

impl Hop {
    #[inline]
    pub const fn new(agent: AgentId, position: Point) -> Self {
        Self { agent, position }
    }
}

/// An ordered, immutable sequence of hops.
///
/// Cloning is cheap (the hops are behind an `Arc`).
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    hops: Arc<[Hop]>,
}

impl Path {
    /// The path with no hops.
    pub fn empty() -> Self {
        Self { hops: Arc::from(Vec::new()) }
    }

    /// A one-hop path.
    pub fn single(hop: Hop) -> Self {
        Self { hops: Arc::from(vec![hop]) }
    }

    pub fn from_hops(hops: impl IntoIterator<Item = Hop>) -> Self {
        Self { hops: hops.into_iter().collect() }
    }

    /// Hop count.
    #[inline]
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    pub fn hops(&self) -> &[Hop] {
        &self.hops
    }

    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.hops.iter().map(|h| h.agent)
    }

    /// `true` if `agent` occurs anywhere on the path.
    pub fn contains(&self, agent: AgentId) -> bool {
        self.hops.iter().any(|h| h.agent == agent)
    }

    pub fn first(&self) -> Option<&Hop> {
        self.hops.first()
    }

    pub fn last(&self) -> Option<&Hop> {
        self.hops.last()
    }

    /// A new path with `hop` appended.
    pub fn extended(&self, hop: Hop) -> Path {
        let mut hops = Vec::with_capacity(self.len() + 1);
        hops.extend_from_slice(&self.hops);
        hops.push(hop);
        Path { hops: hops.into() }
    }

    /// A new path with `hop` placed in front.
    pub fn prepended(&self, hop: Hop) -> Path {
        let mut hops = Vec::with_capacity(self.len() + 1);
        hops.push(hop);
        hops.extend_from_slice(&self.hops);
        Path { hops: hops.into() }
    }

    /// Split off the final hop.  Returns the remaining prefix and the removed
    /// hop, or `None` for an empty path.  `self` is left untouched.
    pub fn remove_last(&self) -> Option<(Path, Hop)> {
        let (last, prefix) = self.hops.split_last()?;
        Some((Path { hops: prefix.into() }, *last))
    }

    /// The same hops in reverse order.
    pub fn reversed(&self) -> Path {
        Path { hops: self.hops.iter().rev().copied().collect() }
    }

    /// `true` if no agent appears twice.
    pub fn is_loop_free(&self) -> bool {
        self.hops
            .iter()
            .enumerate()
            .all(|(i, h)| !self.hops[..i].iter().any(|earlier| earlier.agent == h.agent))
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, hop) in self.hops.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", hop.agent.0)?;
        }
        f.write_str("]")
    }
}
