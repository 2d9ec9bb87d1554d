//! Pheromone reinforcement policies.
//!
//! A backward ant asks its host table to reinforce the path it evaluated.  How
//! much intensity that earns is a policy decision; the only fixed contract is
//! monotonicity: for paths of equal length, a strictly cheaper estimated cost
//! earns a strictly larger reward.

use dm_core::Point;
use dm_spatial::RoadModel;

use crate::Path;

/// Maps an evaluated path to a pheromone deposit.
pub trait ReinforcementPolicy {
    /// Intensity to add for `path`, given the host package's `delivery`
    /// location.  `None` means the path cannot be costed and earns nothing.
    fn reward(&self, path: &Path, delivery: Point, road: &dyn RoadModel) -> Option<f64>;
}

/// Deposit inversely proportional to the road distance from the path's
/// terminal hop to the delivery location:
///
/// ```text
/// reward = deposit * reference_cost / (reference_cost + cost)
/// ```
///
/// A path ending on the delivery point earns the full `deposit`; one ending
/// `reference_cost` metres away earns half.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseCost {
    pub deposit:        f64,
    pub reference_cost: f64,
}

impl InverseCost {
    pub fn new(deposit: f64, reference_cost: f64) -> Self {
        Self { deposit, reference_cost }
    }

    /// The reward for a known `cost`, in metres.
    pub fn reward_for_cost(&self, cost: f64) -> f64 {
        self.deposit * self.reference_cost / (self.reference_cost + cost.max(0.0))
    }
}

impl ReinforcementPolicy for InverseCost {
    fn reward(&self, path: &Path, delivery: Point, road: &dyn RoadModel) -> Option<f64> {
        let end = path.last()?;
        let cost = road.distance(end.position, delivery)?;
        Some(self.reward_for_cost(cost))
    }
}
