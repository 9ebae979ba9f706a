//! Nearest-node resolution from an arbitrary coordinate. The trait is the
//! seam: callers never assume a particular index structure, so the linear
//! scan can be swapped for a spatial tree without touching them.

use crate::geometry::haversine_distance;
use crate::graph::NavigationGraph;
use crate::models::GeoPoint;
use crate::options::SearchScope;

pub trait NearestNodeIndex {
    /// Dense index of the closest node within `radius_m` of `position`,
    /// optionally restricted to a building/floor scope. Ties resolve to the
    /// lowest index for determinism.
    fn nearest(
        &self,
        graph: &NavigationGraph,
        position: GeoPoint,
        radius_m: f64,
        scope: Option<&SearchScope>,
    ) -> Option<usize>;
}

/// Linear scan over the node arena. Adequate for the tens-to-thousands of
/// nodes this graph carries.
#[derive(Clone, Copy, Debug, Default)]
pub struct LinearNearestIndex;

fn in_scope(node: &crate::graph::GraphNode, scope: Option<&SearchScope>) -> bool {
    let Some(scope) = scope else { return true };
    if let Some(b) = &scope.building_id {
        if node.building_id.as_deref() != Some(b.as_str()) {
            return false;
        }
    }
    if let Some(f) = &scope.floor_id {
        if node.floor_id.as_deref() != Some(f.as_str()) {
            return false;
        }
    }
    true
}

impl NearestNodeIndex for LinearNearestIndex {
    fn nearest(
        &self,
        graph: &NavigationGraph,
        position: GeoPoint,
        radius_m: f64,
        scope: Option<&SearchScope>,
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, node) in graph.nodes() {
            if !in_scope(node, scope) {
                continue;
            }
            let d = haversine_distance(position, node.position);
            if d > radius_m {
                continue;
            }
            if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| idx)
    }
}
