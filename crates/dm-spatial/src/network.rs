//! Road network representation and builder.
//!
//! # Data layout
//!
//! Outgoing edges are stored in **Compressed Sparse Row (CSR)** form.  Given
//! a `NodeId n`, its outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! `edge_to` and `edge_length_m` are sorted by source node and indexed by
//! `EdgeId`, so a node's neighbours are a contiguous scan.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps a planar [`Point`] to the nearest `NodeId`.
//! Pickup and delivery locations are snapped through it before a distance
//! query.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use dm_core::{EdgeId, NodeId, Point};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a spatial index for node snapping.
///
/// Build with [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    /// CSR row pointer, length `node_count + 1`.
    pub node_out_start: Vec<u32>,

    /// Destination node of each edge.
    pub edge_to: Vec<NodeId>,

    /// Length of each edge in metres; the Dijkstra edge cost.
    pub edge_length_m: Vec<f64>,

    spatial_idx: RTree<NodeEntry>,
}

impl RoadNetwork {
    /// A network with no nodes.  Every distance query against it fails.
    pub fn empty() -> Self {
        RoadNetworkBuilder::new().build()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    /// Position of `node`, or `None` if it is out of range.
    pub fn position(&self, node: NodeId) -> Option<Point> {
        self.node_pos.get(node.index()).copied()
    }

    /// Outgoing edges of `node` as a contiguous id range.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    /// Nearest road node to `pos`.  `None` only for an empty network.
    pub fn snap_to_node(&self, pos: Point) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.x, pos.y])
            .map(|e| e.id)
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use dm_core::Point;
/// use dm_spatial::RoadNetworkBuilder;
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(1_200.0, 0.0));
/// b.add_road(a, c, 1_200.0);
/// let net = b.build();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // bidirectional
/// ```
#[derive(Default)]
pub struct RoadNetworkBuilder {
    nodes:     Vec<Point>,
    raw_edges: Vec<(NodeId, NodeId, f64)>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    /// Add a **directed** edge of `length_m` metres.
    pub fn add_directed_edge(&mut self, from: NodeId, to: NodeId, length_m: f64) {
        self.raw_edges.push((from, to, length_m));
    }

    /// Add edges in both directions.
    pub fn add_road(&mut self, a: NodeId, b: NodeId, length_m: f64) {
        self.add_directed_edge(a, b, length_m);
        self.add_directed_edge(b, a, length_m);
    }

    /// Add a bidirectional road whose length is the straight-line distance
    /// between its endpoints.  Ignored if either endpoint is unknown.
    pub fn add_straight_road(&mut self, a: NodeId, b: NodeId) {
        let (Some(&pa), Some(&pb)) = (self.nodes.get(a.index()), self.nodes.get(b.index())) else {
            return;
        };
        self.add_road(a, b, pa.distance(pb));
    }

    /// Consume the builder and produce a [`RoadNetwork`].
    ///
    /// Edges whose endpoints were never added are discarded.
    pub fn build(self) -> RoadNetwork {
        let node_count = self.nodes.len();

        let mut raw: Vec<_> = self
            .raw_edges
            .into_iter()
            .filter(|(from, to, _)| from.index() < node_count && to.index() < node_count)
            .collect();
        raw.sort_unstable_by_key(|(from, _, _)| from.0);

        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.1).collect();
        let edge_length_m: Vec<f64>    = raw.iter().map(|e| e.2).collect();

        let mut node_out_start = vec![0u32; node_count + 1];
        for (from, _, _) in &raw {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, pos)| NodeEntry { point: [pos.x, pos.y], id: NodeId(i as u32) })
            .collect();

        RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            edge_to,
            edge_length_m,
            spatial_idx: RTree::bulk_load(entries),
        }
    }
}
