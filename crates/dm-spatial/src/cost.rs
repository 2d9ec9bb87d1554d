//! Road cost estimates.
//!
//! # Pluggability
//!
//! Pheromone reinforcement asks "how far is this location from that one by
//! road?" through the [`RoadModel`] trait.  Two implementations ship:
//!
//! | Type           | Estimate                                               |
//! |----------------|--------------------------------------------------------|
//! | `EuclideanRoad`| Straight-line distance; no network needed.             |
//! | `NetworkRoad`  | Snap both points to the network, Dijkstra over lengths.|
//!
//! # Cost units
//!
//! Metres.  Dijkstra runs on integer millimetres internally so heap ordering
//! is exact and ties break on `NodeId`.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use dm_core::{NodeId, Point};

use crate::network::RoadNetwork;
use crate::{SpatialError, SpatialResult};

// ── RoadModel trait ───────────────────────────────────────────────────────────

/// Distance oracle between two locations.
pub trait RoadModel {
    /// Estimated travel distance from `from` to `to`, in metres.
    ///
    /// `None` means the two points are not connected.
    fn distance(&self, from: Point, to: Point) -> Option<f64>;
}

// ── EuclideanRoad ─────────────────────────────────────────────────────────────

/// Straight-line distance.  Always connected.
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanRoad;

impl RoadModel for EuclideanRoad {
    fn distance(&self, from: Point, to: Point) -> Option<f64> {
        Some(from.distance(to))
    }
}

// ── NetworkRoad ───────────────────────────────────────────────────────────────

/// Shortest road distance over a [`RoadNetwork`].
///
/// Off-network points are snapped to their nearest node and the two
/// straight-line snap legs are added to the network distance.
pub struct NetworkRoad {
    pub network: RoadNetwork,
}

impl NetworkRoad {
    pub fn new(network: RoadNetwork) -> Self {
        Self { network }
    }

    /// Shortest distance in metres between two nodes.
    pub fn shortest_distance(&self, from: NodeId, to: NodeId) -> SpatialResult<f64> {
        let n = self.network.node_count();
        if from.index() >= n {
            return Err(SpatialError::NodeNotFound(from));
        }
        if to.index() >= n {
            return Err(SpatialError::NodeNotFound(to));
        }
        dijkstra_mm(&self.network, from, to)
            .map(|mm| mm as f64 / 1000.0)
            .ok_or(SpatialError::NoRoute { from, to })
    }

    fn snapped_distance(&self, from: Point, to: Point) -> SpatialResult<f64> {
        let a = self.network.snap_to_node(from).ok_or(SpatialError::EmptyNetwork)?;
        let b = self.network.snap_to_node(to).ok_or(SpatialError::EmptyNetwork)?;
        let leg_a = self.network.position(a).map_or(0.0, |p| p.distance(from));
        let leg_b = self.network.position(b).map_or(0.0, |p| p.distance(to));
        Ok(leg_a + self.shortest_distance(a, b)? + leg_b)
    }
}

impl RoadModel for NetworkRoad {
    fn distance(&self, from: Point, to: Point) -> Option<f64> {
        self.snapped_distance(from, to).ok()
    }
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

#[inline]
fn edge_cost_mm(network: &RoadNetwork, edge: usize) -> u64 {
    (network.edge_length_m[edge].max(0.0) * 1000.0).round() as u64
}

fn dijkstra_mm(network: &RoadNetwork, from: NodeId, to: NodeId) -> Option<u64> {
    if from == to {
        return Some(0);
    }

    let mut dist = vec![u64::MAX; network.node_count()];
    dist[from.index()] = 0;

    // Reverse turns the max-heap into a min-heap; NodeId breaks ties.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, from)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if node == to {
            return Some(cost);
        }
        if cost > dist[node.index()] {
            continue;
        }
        for edge in network.out_edges(node) {
            let neighbor = network.edge_to[edge.index()];
            let next = cost.saturating_add(edge_cost_mm(network, edge.index()));
            if next < dist[neighbor.index()] {
                dist[neighbor.index()] = next;
                heap.push(Reverse((next, neighbor)));
            }
        }
    }

    None
}
