//! `CommunicationModel`: endpoint registry plus the same-step message queue.

use std::collections::{BTreeMap, VecDeque};

use dm_core::{AgentId, Point, SimRng};
use tracing::{debug, trace, warn};

use crate::{CommError, CommResult, CommunicationApi, Endpoint, Envelope, Role};

// ── DeliveryStats ─────────────────────────────────────────────────────────────

/// Message counters, accumulated until [`CommunicationModel::take_stats`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Point-to-point messages enqueued.
    pub sent:        u64,
    /// Broadcast copies enqueued (one per reached recipient).
    pub broadcast:   u64,
    /// Envelopes handed to a registered recipient.
    pub delivered:   u64,
    /// Broadcast copies lost to the sender's reliability draw.
    pub lost:        u64,
    /// Envelopes whose recipient was unregistered when they were popped, or
    /// broadcasts from an unregistered sender.
    pub undeliverable: u64,
}

impl DeliveryStats {
    /// Total envelopes that never reached a recipient.
    pub fn dropped(&self) -> u64 {
        self.lost + self.undeliverable
    }
}

// ── CommunicationModel ────────────────────────────────────────────────────────

/// Registry of communicating endpoints and the FIFO queue of envelopes that
/// have been emitted but not yet dispatched.
///
/// The model never calls recipients itself.  The scheduler pops envelopes
/// with [`pop`](Self::pop) and routes them to the owning agent.
pub struct CommunicationModel<M> {
    endpoints: BTreeMap<AgentId, Endpoint>,
    queue:     VecDeque<Envelope<M>>,
    rng:       SimRng,
    stats:     DeliveryStats,
}

impl<M> CommunicationModel<M> {
    /// Create an empty model whose reliability draws come from `rng`.
    pub fn new(rng: SimRng) -> Self {
        Self {
            endpoints: BTreeMap::new(),
            queue:     VecDeque::new(),
            rng,
            stats:     DeliveryStats::default(),
        }
    }

    // ── Registration ──────────────────────────────────────────────────────

    pub fn register(&mut self, endpoint: Endpoint) -> CommResult<()> {
        if self.endpoints.contains_key(&endpoint.id) {
            return Err(CommError::AlreadyRegistered(endpoint.id));
        }
        if !(0.0..=1.0).contains(&endpoint.reliability) {
            return Err(CommError::InvalidEndpoint {
                id:     endpoint.id,
                reason: format!("reliability {} outside [0, 1]", endpoint.reliability),
            });
        }
        if endpoint.radius.is_nan() || endpoint.radius < 0.0 {
            return Err(CommError::InvalidEndpoint {
                id:     endpoint.id,
                reason: format!("radius {} is negative or NaN", endpoint.radius),
            });
        }
        debug!(endpoint = %endpoint.id, role = %endpoint.role, "registered endpoint");
        self.endpoints.insert(endpoint.id, endpoint);
        Ok(())
    }

    /// Remove `id`.  Envelopes already queued for it are dropped when popped.
    pub fn unregister(&mut self, id: AgentId) -> Option<Endpoint> {
        let removed = self.endpoints.remove(&id);
        if removed.is_some() {
            debug!(endpoint = %id, "unregistered endpoint");
        }
        removed
    }

    pub fn is_registered(&self, id: AgentId) -> bool {
        self.endpoints.contains_key(&id)
    }

    pub fn endpoint(&self, id: AgentId) -> Option<&Endpoint> {
        self.endpoints.get(&id)
    }

    /// Move a registered endpoint.
    pub fn set_position(&mut self, id: AgentId, position: Point) -> CommResult<()> {
        let ep = self.endpoints.get_mut(&id).ok_or(CommError::NotRegistered(id))?;
        ep.position = position;
        Ok(())
    }

    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    // ── Queue ─────────────────────────────────────────────────────────────

    /// A sending handle bound to `sender`.
    pub fn handle(&mut self, sender: AgentId) -> CommHandle<'_, M> {
        CommHandle { model: self, sender }
    }

    /// Pop the next deliverable envelope, silently discarding (and counting)
    /// any whose recipient is no longer registered.
    pub fn pop(&mut self) -> Option<Envelope<M>> {
        while let Some(env) = self.queue.pop_front() {
            if self.endpoints.contains_key(&env.to) {
                self.stats.delivered += 1;
                return Some(env);
            }
            trace!(from = %env.from, to = %env.to, "dropping envelope for unregistered endpoint");
            self.stats.undeliverable += 1;
        }
        None
    }

    /// Number of envelopes waiting to be dispatched.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.stats
    }

    /// Return the counters and reset them.
    pub fn take_stats(&mut self) -> DeliveryStats {
        std::mem::take(&mut self.stats)
    }
}

// ── CommHandle ────────────────────────────────────────────────────────────────

/// [`CommunicationApi`] implementation bound to one sender.
pub struct CommHandle<'a, M> {
    model:  &'a mut CommunicationModel<M>,
    sender: AgentId,
}

impl<M: Clone> CommunicationApi<M> for CommHandle<'_, M> {
    fn sender(&self) -> AgentId {
        self.sender
    }

    fn send(&mut self, to: AgentId, message: M) {
        self.model.stats.sent += 1;
        self.model.queue.push_back(Envelope { from: self.sender, to, message });
    }

    fn broadcast(&mut self, message: M, role: Role) {
        let Some(origin) = self.model.endpoints.get(&self.sender) else {
            warn!(sender = %self.sender, "broadcast from unregistered endpoint dropped");
            self.model.stats.undeliverable += 1;
            return;
        };
        let reliability = origin.reliability;

        let targets: Vec<AgentId> = self
            .model
            .endpoints
            .values()
            .filter(|ep| ep.role == role && ep.id != self.sender && origin.reaches(ep))
            .map(|ep| ep.id)
            .collect();

        trace!(sender = %self.sender, %role, reached = targets.len(), "broadcast");

        for to in targets {
            if !self.model.rng.gen_bool(reliability) {
                self.model.stats.lost += 1;
                continue;
            }
            self.model.stats.broadcast += 1;
            self.model.queue.push_back(Envelope {
                from:    self.sender,
                to,
                message: message.clone(),
            });
        }
    }
}
