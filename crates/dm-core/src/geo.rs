//! Planar coordinates.
//!
//! The courier world is a flat map measured in metres.  Pickup and delivery
//! locations, endpoint positions, and road nodes all use [`Point`].

use std::fmt;

/// A position on the planar map, in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance to `other`.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Squared distance; cheaper for comparisons.
    #[inline]
    pub fn distance_sq(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    /// `true` if `other` lies inside the closed disc of `radius` around `self`.
    #[inline]
    pub fn within(self, other: Point, radius: f64) -> bool {
        radius >= 0.0 && self.distance_sq(other) <= radius * radius
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}
