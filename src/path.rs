use crate::NodeId;
use crate::error::BrokenPath;
use crate::street_graph::WeightedGraphView;
use ahash::AHashMap as HashMap;

/// Walk the predecessor map back from `goal` to the seed entry (the one whose
/// predecessor is `None`) and return the sequence start-first.
///
/// Total over any map produced by a successful search run; when the goal is
/// the start itself the result is the single-element sequence.
pub(crate) fn reconstruct_path(
    came_from: &HashMap<NodeId, Option<NodeId>>,
    goal: NodeId,
) -> Vec<NodeId> {
    let mut nodes = Vec::new();
    let mut cursor = Some(goal);
    while let Some(node) = cursor {
        nodes.push(node);
        cursor = came_from.get(&node).copied().flatten();
    }
    nodes.reverse();
    nodes
}

/// Re-price an arbitrary node sequence against the graph, independently of
/// whatever produced it.
///
/// Each consecutive pair is charged the minimum usable length among the
/// parallel edges connecting it; a pair with no such edge makes the whole
/// sequence [`BrokenPath`]. Sequences of length 0 or 1 cost 0. For a route
/// returned by the search this reproduces the recorded cost exactly, since
/// both sum the same weights in the same order.
pub fn evaluate_cost<G: WeightedGraphView>(graph: &G, nodes: &[NodeId]) -> Result<f64, BrokenPath> {
    let mut total = 0.0;
    for pair in nodes.windows(2) {
        match graph.edge_weight(pair[0], pair[1]) {
            Some(length) => total += length,
            None => {
                return Err(BrokenPath {
                    from: pair[0],
                    to: pair[1],
                });
            }
        }
    }
    Ok(total)
}
