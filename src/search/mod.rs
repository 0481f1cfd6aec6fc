// Shared frontier-expansion engine behind both route-finding strategies.
//
// Uniform-cost search and A* are the same loop parameterized by the queue
// priority: plain accumulated cost for the former, accumulated cost plus a
// heuristic estimate for the latter. The queue is append-only; superseded
// entries are discarded when popped instead of being mutated in place.

use crate::NodeId;
use crate::error::SearchError;
use crate::heuristic::Heuristic;
use crate::path::reconstruct_path;
use crate::street_graph::{NodePositions, WeightedGraphView};
use ahash::AHashMap as HashMap;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[cfg(test)]
mod test_search;

#[derive(Copy, Clone, PartialEq, Eq)]
struct State {
    priority: OrderedFloat<f64>,
    node: NodeId,
}

// The priority queue depends on `Ord`.
// Explicitly implement the trait so the queue becomes a min-heap instead of a max-heap.
impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        // Notice that we flip the ordering on priorities.
        // In case of a tie we compare node ids - this step is necessary
        // to make implementations of `PartialEq` and `Ord` consistent,
        // and it makes pop order deterministic.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| self.node.cmp(&other.node))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// How the frontier is ordered. The informed strategy carries its heuristic
/// with it, so an informed search without one is unrepresentable.
pub enum Strategy<'a> {
    /// Expand by accumulated cost alone (uniform-cost / Dijkstra).
    UniformCost,
    /// Expand by accumulated cost plus the heuristic's estimate of the rest.
    AStar(&'a dyn Heuristic),
}

impl Strategy<'_> {
    fn label(&self) -> &'static str {
        match self {
            Strategy::UniformCost => "ucs",
            Strategy::AStar(_) => "astar",
        }
    }
}

/// Exploration-effort counters for one search call. Observational only:
/// nothing in the algorithm reads them back.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes dequeued and expanded (goal dequeue and stale skips excluded).
    pub nodes_expanded: u64,
    /// Successful relaxations, i.e. pushes onto the frontier after seeding.
    pub edges_relaxed: u64,
    /// Popped entries discarded because a cheaper copy already won.
    pub stale_skips: u64,
    /// High-water mark of the frontier size.
    pub max_frontier: usize,
}

/// A start-to-goal node sequence and its total edge cost as recorded by the
/// search that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub nodes: Vec<NodeId>,
    pub cost: f64,
}

impl Route {
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }
}

/// Outcome of one search call. `route` is `None` when the frontier drained
/// without ever dequeuing the goal - an expected result, not an error.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub route: Option<Route>,
    pub stats: SearchStats,
}

/// Find a cheapest path from `start` to `goal`.
///
/// Both ids must name nodes the graph knows, otherwise the call is rejected
/// before any expansion. Edge weights must be non-negative; under that
/// invariant the uninformed strategy always returns a minimum-cost route,
/// and the informed one does too whenever its heuristic never overestimates.
/// With an inadmissible heuristic the informed search still terminates and
/// still returns *a* route, just not necessarily the cheapest.
pub fn search<G>(
    graph: &G,
    start: NodeId,
    goal: NodeId,
    strategy: Strategy<'_>,
) -> Result<SearchReport, SearchError>
where
    G: WeightedGraphView + NodePositions,
{
    if !graph.has_node(start) {
        return Err(SearchError::UnknownStart(start));
    }
    if !graph.has_node(goal) {
        return Err(SearchError::UnknownGoal(goal));
    }

    // Per-call record; dropped wholesale when this function returns.
    let mut g_score: HashMap<NodeId, f64> = HashMap::new();
    let mut came_from: HashMap<NodeId, Option<NodeId>> = HashMap::new();
    let mut frontier = BinaryHeap::new();
    let mut stats = SearchStats::default();

    g_score.insert(start, 0.0);
    came_from.insert(start, None);
    let seed_priority = match &strategy {
        Strategy::UniformCost => 0.0,
        Strategy::AStar(heuristic) => heuristic.estimate(graph, start, goal),
    };
    frontier.push(State {
        priority: OrderedFloat(seed_priority),
        node: start,
    });
    stats.max_frontier = 1;

    while let Some(State { priority, node: current }) = frontier.pop() {
        let current_g = g_score.get(&current).copied().unwrap_or(f64::INFINITY);

        if matches!(strategy, Strategy::UniformCost) && priority.0 > current_g {
            // A cheaper entry for this node was already processed; under
            // uniform cost the popped priority *is* the g at push time, so
            // this comparison detects superseded entries exactly. The
            // informed strategy instead relies on the improvement guard
            // below never pushing a worse path.
            stats.stale_skips += 1;
            continue;
        }

        if current == goal {
            let nodes = reconstruct_path(&came_from, goal);
            tracing::debug!(
                strategy = strategy.label(),
                start,
                goal,
                cost = current_g,
                hops = nodes.len().saturating_sub(1),
                expanded = stats.nodes_expanded,
                "goal reached"
            );
            return Ok(SearchReport {
                route: Some(Route {
                    nodes,
                    cost: current_g,
                }),
                stats,
            });
        }

        stats.nodes_expanded += 1;
        tracing::trace!(
            node = current,
            g = current_g,
            frontier = frontier.len(),
            "expanding"
        );

        for neighbor in graph.neighbors(current) {
            if !graph.has_node(neighbor) {
                // Dangling target left behind by upstream data preparation.
                continue;
            }
            // An absent weight means no usable edge at all between the pair,
            // so the transition is skipped rather than treated as free.
            let Some(length) = graph.edge_weight(current, neighbor) else {
                continue;
            };

            let tentative_g = current_g + length;
            let best_known = g_score.get(&neighbor).copied().unwrap_or(f64::INFINITY);
            if tentative_g < best_known {
                g_score.insert(neighbor, tentative_g);
                came_from.insert(neighbor, Some(current));
                let priority = match &strategy {
                    Strategy::UniformCost => tentative_g,
                    Strategy::AStar(heuristic) => {
                        tentative_g + heuristic.estimate(graph, neighbor, goal)
                    }
                };
                frontier.push(State {
                    priority: OrderedFloat(priority),
                    node: neighbor,
                });
                stats.edges_relaxed += 1;
                stats.max_frontier = stats.max_frontier.max(frontier.len());
            }
        }
    }

    tracing::debug!(
        strategy = strategy.label(),
        start,
        goal,
        expanded = stats.nodes_expanded,
        "frontier exhausted, no route"
    );
    Ok(SearchReport {
        route: None,
        stats,
    })
}
