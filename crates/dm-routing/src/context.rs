//! Read-only collaborators handed to every routing callback.

use dm_core::Tick;
use dm_spatial::RoadModel;

use crate::ReinforcementPolicy;

/// What an agent may consult while handling a tick or an ant.
///
/// Built once per step by the scheduler and shared by every callback in
/// that step.  The communication handle is passed separately because it is
/// mutable and bound to the acting agent.
#[derive(Copy, Clone)]
pub struct RoutingContext<'a> {
    pub tick:    Tick,
    /// Simulated wall-clock time at the start of the step, in milliseconds.
    pub time_ms: u64,
    /// Length of one step, in milliseconds.
    pub step_ms: u64,
    pub road:    &'a dyn RoadModel,
    pub policy:  &'a dyn ReinforcementPolicy,
}

impl<'a> RoutingContext<'a> {
    #[inline]
    pub fn new(
        tick:    Tick,
        time_ms: u64,
        step_ms: u64,
        road:    &'a dyn RoadModel,
        policy:  &'a dyn ReinforcementPolicy,
    ) -> Self {
        Self { tick, time_ms, step_ms, road, policy }
    }
}
