// In-memory pedestrian street graph.
//
// The upstream extractor hands us a fully materialized node/edge set; this
// module only stores it and answers read queries. Topology is a plain
// adjacency map rather than a CSR array - graphs here are city-sized at most
// and the search touches a small fraction of them per query.

use crate::NodeId;
use ahash::AHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Projected or raw coordinates of a node, as supplied by the extractor.
/// `x` is longitude (or easting), `y` is latitude (or northing). The graph
/// does not know which; see the heuristic module for the consequences.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One directed edge. `length_m` is missing when the source data carried no
/// usable length attribute; such an edge is kept for bookkeeping but is never
/// traversable.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StreetEdge {
    pub target: NodeId,
    pub length_m: Option<f64>,
}

/// Read-only view of a weighted directed graph, as the search engine sees it.
///
/// Implementations must tolerate queries about ids they have never heard of:
/// upstream data preparation can leave dangling edge targets, and the engine
/// probes those rather than assuming they resolve.
pub trait WeightedGraphView {
    fn has_node(&self, node: NodeId) -> bool;

    /// Distinct successors reachable by at least one outgoing edge.
    /// Empty for a node with no outgoing edges or an unknown id.
    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;

    /// Minimum length among parallel edges from `u` to `v` that carry a
    /// length. `None` means the transition is not traversable at all,
    /// which is different from costing zero.
    fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64>;
}

/// Narrow positional read used by heuristics. Kept separate from
/// [`WeightedGraphView`] so the search engine itself never sees coordinates.
pub trait NodePositions {
    fn position(&self, node: NodeId) -> Option<Position>;
}

/// Concrete graph storage. Construction is append-only; the search only ever
/// borrows it immutably, so a shared reference is safe across concurrent
/// queries.
#[derive(Clone, Debug, Default)]
pub struct StreetGraph {
    nodes: HashMap<NodeId, Option<Position>>,
    adjacency: HashMap<NodeId, Vec<StreetEdge>>,
}

impl StreetGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. A node without a position is legal - the heuristics
    /// report an infinite estimate for it and the search carries on.
    pub fn add_node(&mut self, id: NodeId, position: Option<Position>) {
        self.nodes.insert(id, position);
    }

    /// Add a directed edge. Parallel edges between the same pair are allowed
    /// and all retained; weight resolution picks the cheapest usable one.
    /// Lengths must be non-negative.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, length_m: Option<f64>) {
        self.adjacency.entry(from).or_default().push(StreetEdge {
            target: to,
            length_m,
        });
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }
}

impl WeightedGraphView for StreetGraph {
    fn has_node(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let Some(edges) = self.adjacency.get(&node) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(edges.len());
        for edge in edges {
            // Street-node out-degree is tiny, a linear dedup is fine.
            if !out.contains(&edge.target) {
                out.push(edge.target);
            }
        }
        out
    }

    fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<f64> {
        let edges = self.adjacency.get(&u)?;
        edges
            .iter()
            .filter(|e| e.target == v)
            .filter_map(|e| e.length_m)
            .min_by(|a, b| a.total_cmp(b))
    }
}

impl NodePositions for StreetGraph {
    fn position(&self, node: NodeId) -> Option<Position> {
        self.nodes.get(&node).copied().flatten()
    }
}
