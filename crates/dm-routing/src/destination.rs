use dm_comm::{Endpoint, Role};
use dm_core::{AgentId, PackageId, Point};

/// The communication endpoint standing for a package's delivery point.
///
/// Feasibility ants are broadcast to destinations; whatever a destination
/// receives is handled by its owning [`PackageAgent`][crate::PackageAgent].
/// It stays registered until the package is delivered.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageDestination {
    pub id:       AgentId,
    pub owner:    AgentId,
    pub package:  PackageId,
    pub position: Point,
}

impl PackageDestination {
    pub fn new(id: AgentId, owner: AgentId, package: PackageId, position: Point) -> Self {
        Self { id, owner, package, position }
    }

    /// Receive-only registration: zero broadcast radius.
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.id, Role::PackageDestination, self.position)
    }
}
