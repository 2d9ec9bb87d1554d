//! `Package`: the pickup/delivery state machine.
//!
//! ```text
//!                 pickup            deliver
//!  NeedsPickup ───────────▶ PickedUp ───────────▶ Delivered
//!       ▲                      │
//!       └──── drop_at(point) ──┘
//! ```
//!
//! Transitions are driven by the transporting side (the scheduler on its
//! behalf).  Routing code only reads the state.

use std::fmt;

use dm_core::{PackageId, Point};

use crate::{RoutingError, RoutingResult};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PackageState {
    NeedsPickup,
    PickedUp,
    /// Terminal.
    Delivered,
}

impl PackageState {
    pub fn as_str(self) -> &'static str {
        match self {
            PackageState::NeedsPickup => "needs_pickup",
            PackageState::PickedUp    => "picked_up",
            PackageState::Delivered   => "delivered",
        }
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Package {
    pub id:   PackageId,
    pickup:   Point,
    delivery: Point,
    state:    PackageState,
}

impl Package {
    pub fn new(id: PackageId, pickup: Point, delivery: Point) -> Self {
        Self { id, pickup, delivery, state: PackageState::NeedsPickup }
    }

    /// Where the package currently waits (or last waited) for a transporter.
    #[inline]
    pub fn pickup_location(&self) -> Point {
        self.pickup
    }

    #[inline]
    pub fn delivery_location(&self) -> Point {
        self.delivery
    }

    #[inline]
    pub fn state(&self) -> PackageState {
        self.state
    }

    #[inline]
    pub fn needs_pickup(&self) -> bool {
        self.state == PackageState::NeedsPickup
    }

    #[inline]
    pub fn is_picked_up(&self) -> bool {
        self.state == PackageState::PickedUp
    }

    #[inline]
    pub fn is_delivered(&self) -> bool {
        self.state == PackageState::Delivered
    }

    pub fn pickup(&mut self) -> RoutingResult<()> {
        self.transition(PackageState::NeedsPickup, PackageState::PickedUp, "pick up")
    }

    /// Put a picked-up package down at `at`, which becomes its new pickup
    /// location.
    pub fn drop_at(&mut self, at: Point) -> RoutingResult<()> {
        self.transition(PackageState::PickedUp, PackageState::NeedsPickup, "drop")?;
        self.pickup = at;
        Ok(())
    }

    pub fn deliver(&mut self) -> RoutingResult<()> {
        self.transition(PackageState::PickedUp, PackageState::Delivered, "deliver")
    }

    fn transition(
        &mut self,
        from:   PackageState,
        to:     PackageState,
        action: &'static str,
    ) -> RoutingResult<()> {
        if self.state != from {
            return Err(RoutingError::InvalidTransition { package: self.id, from: self.state, action });
        }
        self.state = to;
        Ok(())
    }
}
