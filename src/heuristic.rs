use crate::NodeId;
use crate::street_graph::NodePositions;

/// Estimate of the remaining cost from `node` to `goal`.
///
/// Returns `f64::INFINITY` - never panics - when the estimate cannot be
/// computed (typically a node without coordinates). An infinite estimate
/// deprioritizes expansion through that node but does not forbid it.
pub trait Heuristic {
    fn estimate(&self, positions: &dyn NodePositions, node: NodeId, goal: NodeId) -> f64;
}

/// Straight-line planar distance over the stored coordinates, whatever unit
/// they are in.
///
/// When coordinates are geographic degrees rather than a projected metric
/// CRS, the result is not a lower bound on metric path length, so A* loses
/// its optimality guarantee (it still terminates and returns a route).
/// Callers that need the guarantee should project their graph or use
/// [`GreatCircle`].
pub struct StraightLine;

impl Heuristic for StraightLine {
    fn estimate(&self, positions: &dyn NodePositions, node: NodeId, goal: NodeId) -> f64 {
        let (Some(a), Some(b)) = (positions.position(node), positions.position(goal)) else {
            return f64::INFINITY;
        };
        (a.x - b.x).hypot(a.y - b.y)
    }
}

/// Haversine distance in meters, for graphs whose positions are
/// (lon, lat) WGS84 degrees and whose edge lengths are meters. Great-circle
/// distance never exceeds walked distance, so this one is admissible.
pub struct GreatCircle;

impl Heuristic for GreatCircle {
    fn estimate(&self, positions: &dyn NodePositions, node: NodeId, goal: NodeId) -> f64 {
        let (Some(a), Some(b)) = (positions.position(node), positions.position(goal)) else {
            return f64::INFINITY;
        };
        haversine_distance(a.y, a.x, b.y, b.x)
    }
}

pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let r = 6371000.0;
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    r * c
}
