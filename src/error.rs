use crate::NodeId;
use thiserror::Error;

/// Rejected before any expansion happens. Distinct from an exhausted search:
/// a search over a graph that simply has no route ends with an empty result,
/// not one of these.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("start node {0} is not in the graph")]
    UnknownStart(NodeId),
    #[error("goal node {0} is not in the graph")]
    UnknownGoal(NodeId),
}

/// A caller-supplied node sequence claims an edge the graph does not have
/// (or only has without a usable length).
#[derive(Error, Debug, Clone, Copy, PartialEq)]
#[error("no traversable edge between {from} and {to}")]
pub struct BrokenPath {
    pub from: NodeId,
    pub to: NodeId,
}
