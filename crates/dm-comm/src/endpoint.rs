//! Registered communicating endpoints.

use std::fmt;

use dm_core::{AgentId, Point};

/// What kind of endpoint a registration is.  Broadcasts are addressed to a
/// role rather than to individual ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    /// Owns a package's routing state.
    PackageAgent,
    /// A package's delivery point; target of feasibility broadcasts.
    PackageDestination,
    /// Originates exploration on behalf of a transporting agent.
    Explorer,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::PackageAgent       => "package_agent",
            Role::PackageDestination => "package_destination",
            Role::Explorer           => "explorer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registration in the [`CommunicationModel`][crate::CommunicationModel].
#[derive(Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub id:       AgentId,
    pub role:     Role,
    /// Where the endpoint currently is.  Broadcast range is measured from
    /// the sender's position to each candidate's position.
    pub position: Point,
    /// Broadcast radius in metres.
    pub radius:   f64,
    /// Per-recipient delivery probability of this endpoint's broadcasts.
    pub reliability: f64,
}

impl Endpoint {
    pub fn new(id: AgentId, role: Role, position: Point) -> Self {
        Self { id, role, position, radius: 0.0, reliability: 1.0 }
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_reliability(mut self, reliability: f64) -> Self {
        self.reliability = reliability;
        self
    }

    /// `true` if `other` is inside this endpoint's broadcast radius.
    #[inline]
    pub fn reaches(&self, other: &Endpoint) -> bool {
        self.position.within(other.position, self.radius)
    }
}
