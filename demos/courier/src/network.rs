//! Synthetic district road grid.

use dm_core::Point;
use dm_spatial::{RoadNetwork, RoadNetworkBuilder};

/// Nodes per side of the grid.
pub const GRID_SIDE: u32 = 5;

/// Distance between neighbouring intersections, in metres.
pub const BLOCK_M: f64 = 500.0;

/// Build a `GRID_SIDE` × `GRID_SIDE` grid of two-way streets with the
/// origin at the south-west corner.  The middle row is congested, so its
/// blocks cost 20% more than their straight-line length.
pub fn build_grid() -> RoadNetwork {
    let mut b = RoadNetworkBuilder::new();
    let mut nodes = Vec::with_capacity((GRID_SIDE * GRID_SIDE) as usize);
    for row in 0..GRID_SIDE {
        for col in 0..GRID_SIDE {
            nodes.push(b.add_node(Point::new(col as f64 * BLOCK_M, row as f64 * BLOCK_M)));
        }
    }

    let at = |row: u32, col: u32| nodes[(row * GRID_SIDE + col) as usize];
    for row in 0..GRID_SIDE {
        for col in 0..GRID_SIDE {
            if col + 1 < GRID_SIDE {
                let len = if row == GRID_SIDE / 2 { BLOCK_M * 1.2 } else { BLOCK_M };
                b.add_road(at(row, col), at(row, col + 1), len);
            }
            if row + 1 < GRID_SIDE {
                b.add_straight_road(at(row, col), at(row + 1, col));
            }
        }
    }
    b.build()
}
