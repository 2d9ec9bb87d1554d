//! Routing protocol parameters.

use crate::{InverseCost, RoutingError, RoutingResult};

/// Tunables shared by every package agent and explorer in a run.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RoutingConfig {
    /// Idle ticks between an agent's feasibility waves.  The first wave goes
    /// out on the agent's first tick.
    pub feasibility_interval: u32,

    /// Hop budget of a freshly originated feasibility ant.
    pub max_feasibility_hops: u32,

    /// Hop budget of a freshly launched forward exploration ant.
    pub exploration_hops: u32,

    /// Broadcast radius of package agents, in metres.
    pub broadcast_range: f64,

    /// Per-recipient delivery probability of package agent broadcasts.
    pub reliability: f64,

    /// Per-tick pheromone decay factor, in (0, 1).
    pub evaporation: f64,

    /// Intensity of a newly learned path.
    pub base_intensity: f64,

    /// Maximum reinforcement per backward ant visit.
    pub deposit: f64,

    /// Cost, in metres, at which reinforcement falls to half of `deposit`.
    pub reference_cost: f64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            feasibility_interval: 10,
            max_feasibility_hops: 3,
            exploration_hops:     4,
            broadcast_range:      2_500.0,
            reliability:          1.0,
            evaporation:          0.95,
            base_intensity:       1.0,
            deposit:              1.0,
            reference_cost:       1_000.0,
        }
    }
}

impl RoutingConfig {
    /// Reject values the protocol cannot run with.
    pub fn validate(&self) -> RoutingResult<()> {
        if !(self.evaporation > 0.0 && self.evaporation < 1.0) {
            return Err(RoutingError::Config(format!(
                "evaporation must be in (0, 1), got {}",
                self.evaporation
            )));
        }
        if !(0.0..=1.0).contains(&self.reliability) {
            return Err(RoutingError::Config(format!(
                "reliability must be in [0, 1], got {}",
                self.reliability
            )));
        }
        if self.broadcast_range.is_nan() || self.broadcast_range < 0.0 {
            return Err(RoutingError::Config(format!(
                "broadcast_range must be non-negative, got {}",
                self.broadcast_range
            )));
        }
        if !(self.base_intensity.is_finite() && self.base_intensity > 0.0) {
            return Err(RoutingError::Config(format!(
                "base_intensity must be positive, got {}",
                self.base_intensity
            )));
        }
        // A zero deposit rewards every route equally.
        if !(self.deposit.is_finite() && self.deposit > 0.0) {
            return Err(RoutingError::Config(format!(
                "deposit must be positive, got {}",
                self.deposit
            )));
        }
        if !(self.reference_cost.is_finite() && self.reference_cost > 0.0) {
            return Err(RoutingError::Config(format!(
                "reference_cost must be positive, got {}",
                self.reference_cost
            )));
        }
        Ok(())
    }

    /// The reinforcement policy these parameters describe.
    pub fn policy(&self) -> InverseCost {
        InverseCost::new(self.deposit, self.reference_cost)
    }
}
