//! The sending side of the substrate, as seen by an agent.

use dm_core::AgentId;

use crate::Role;

/// A message in flight.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope<M> {
    pub from:    AgentId,
    pub to:      AgentId,
    pub message: M,
}

/// Handle through which an agent emits messages.
///
/// Agents receive `&mut dyn CommunicationApi<M>` on every tick and message
/// callback.  The production implementation is
/// [`CommHandle`][crate::CommHandle]; tests substitute a recording fake.
pub trait CommunicationApi<M> {
    /// The endpoint messages are sent from.
    fn sender(&self) -> AgentId;

    /// Point-to-point delivery to `to`, later in the same step.
    fn send(&mut self, to: AgentId, message: M);

    /// Deliver a copy of `message` to every registered endpoint of `role`
    /// within the sender's broadcast radius, each subject to the sender's
    /// reliability.  The sender never receives its own broadcast.
    fn broadcast(&mut self, message: M, role: Role);
}
