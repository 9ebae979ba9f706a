//! A* search over the navigation graph. Single-shot, synchronous and pure:
//! the graph is treated as immutable for the duration of one call, so any
//! number of searches may share it concurrently.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::geometry::haversine_distance;
use crate::graph::nearest::{LinearNearestIndex, NearestNodeIndex};
use crate::graph::{GraphEdge, NavigationGraph};
use crate::instructions::{self, Segment};
use crate::models::{
    FailureReason, FloorTransition, GeoPoint, PathfindingResult, RouteLeg, TransitionKind,
};
use crate::options::SearchOptions;

/// Cooperative cancellation flag, polled once per frontier pop. Clone it into
/// whatever owns the request lifetime and call `cancel()` to abandon the
/// search.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, AtomicOrdering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(AtomicOrdering::Relaxed)
    }
}

#[derive(Clone, Copy, Debug)]
struct QueueNode {
    idx: usize,
    f: f64,
    g: f64,
    seq: u64,
}

impl PartialEq for QueueNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for QueueNode {}
impl PartialOrd for QueueNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for QueueNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; invert for min-heap behavior. Order by
        // f, then lower g, then insertion order for determinism.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.g.total_cmp(&self.g))
            .then_with(|| other.seq.cmp(&self.seq))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

pub struct Pathfinder<'a, N: NearestNodeIndex> {
    graph: &'a NavigationGraph,
    nearest: &'a N,
}

/// Convenience entry point with the default linear nearest-node index.
pub fn find_path(
    graph: &NavigationGraph,
    start: GeoPoint,
    goal: GeoPoint,
    options: &SearchOptions,
    cancel: Option<&CancelToken>,
) -> PathfindingResult {
    Pathfinder::new(graph, &LinearNearestIndex).find_path(start, goal, options, cancel)
}

impl<'a, N: NearestNodeIndex> Pathfinder<'a, N> {
    pub fn new(graph: &'a NavigationGraph, nearest: &'a N) -> Self {
        Self { graph, nearest }
    }

    pub fn find_path(
        &self,
        start: GeoPoint,
        goal: GeoPoint,
        options: &SearchOptions,
        cancel: Option<&CancelToken>,
    ) -> PathfindingResult {
        let scope = options.scope.as_ref();
        let Some(start_idx) = self.nearest.nearest(self.graph, start, options.nearest_radius_m, scope)
        else {
            return PathfindingResult::failure(FailureReason::NoNearbyNode, 0);
        };
        let Some(goal_idx) = self.nearest.nearest(self.graph, goal, options.nearest_radius_m, scope)
        else {
            return PathfindingResult::failure(FailureReason::NoNearbyNode, 0);
        };

        if start_idx == goal_idx {
            let node = self.graph.node(start_idx);
            return PathfindingResult {
                success: true,
                reason: None,
                nodes: vec![node.id.clone()],
                legs: Vec::new(),
                polyline: vec![node.position],
                total_distance_m: 0.0,
                floor_transitions: Vec::new(),
                instructions: Vec::new(),
                expanded: 0,
            };
        }

        self.search(start_idx, goal_idx, options, cancel)
    }

    fn search(
        &self,
        start_idx: usize,
        goal_idx: usize,
        options: &SearchOptions,
        cancel: Option<&CancelToken>,
    ) -> PathfindingResult {
        let goal_pos = self.graph.node(goal_idx).position;

        let mut open = BinaryHeap::new();
        let mut g_score: FxHashMap<usize, f64> = FxHashMap::default();
        // came_from maps a node to (predecessor, edge offset in its list)
        let mut came_from: FxHashMap<usize, (usize, usize)> = FxHashMap::default();
        let mut expanded: u64 = 0;
        let mut seq: u64 = 0;

        let h0 = haversine_distance(self.graph.node(start_idx).position, goal_pos);
        g_score.insert(start_idx, 0.0);
        open.push(QueueNode { idx: start_idx, f: h0, g: 0.0, seq });

        while let Some(qn) = open.pop() {
            if let Some(token) = cancel {
                if token.is_cancelled() {
                    return PathfindingResult::failure(FailureReason::Cancelled, expanded);
                }
            }
            // Discard stale heap entries
            if let Some(&best_g) = g_score.get(&qn.idx) {
                if qn.g > best_g {
                    continue;
                }
            }
            expanded += 1;
            if expanded > options.max_expansions {
                return PathfindingResult::failure(FailureReason::ExpansionLimit, expanded);
            }

            if qn.idx == goal_idx {
                debug!(expanded, "route found");
                return self.reconstruct(start_idx, goal_idx, &came_from, expanded);
            }

            for (edge_offset, edge) in self.graph.edges_from(qn.idx).iter().enumerate() {
                let weight = self.effective_weight(qn.idx, edge, options);
                let tentative_g = qn.g + weight;
                let better = g_score.get(&edge.to).map(|&bg| tentative_g < bg).unwrap_or(true);
                if better {
                    g_score.insert(edge.to, tentative_g);
                    came_from.insert(edge.to, (qn.idx, edge_offset));
                    let h = haversine_distance(self.graph.node(edge.to).position, goal_pos);
                    seq += 1;
                    open.push(QueueNode { idx: edge.to, f: tentative_g + h, g: tentative_g, seq });
                }
            }
        }

        PathfindingResult::failure(FailureReason::NoPathFound, expanded)
    }

    /// Edge weight as seen by the search. When elevators are preferred, a
    /// stairs transition is multiplied by the bias only if this node also has
    /// an elevator edge to the same floor, so stairs-only paths stay usable.
    fn effective_weight(&self, from: usize, edge: &GraphEdge, options: &SearchOptions) -> f64 {
        if !options.prefer_elevator || edge.vertical != Some(TransitionKind::Stairs) {
            return edge.weight_m;
        }
        let dest_floor = &self.graph.node(edge.to).floor_id;
        let has_elevator_alternative = self.graph.edges_from(from).iter().any(|other| {
            other.vertical == Some(TransitionKind::Elevator)
                && &self.graph.node(other.to).floor_id == dest_floor
        });
        if has_elevator_alternative {
            edge.weight_m * options.stairs_bias_multiplier
        } else {
            edge.weight_m
        }
    }

    fn reconstruct(
        &self,
        start_idx: usize,
        goal_idx: usize,
        came_from: &FxHashMap<usize, (usize, usize)>,
        expanded: u64,
    ) -> PathfindingResult {
        // Walk back-pointers into (node, incoming edge) order
        let mut indices = vec![goal_idx];
        let mut edges: Vec<&GraphEdge> = Vec::new();
        let mut current = goal_idx;
        while current != start_idx {
            let &(prev, edge_offset) = came_from
                .get(&current)
                .expect("reconstruct missing came_from entry");
            edges.push(&self.graph.edges_from(prev)[edge_offset]);
            indices.push(prev);
            current = prev;
        }
        indices.reverse();
        edges.reverse();

        let nodes = indices.iter().map(|&i| self.graph.node(i).id.clone()).collect();

        let mut legs = Vec::with_capacity(edges.len());
        let mut floor_transitions = Vec::new();
        let mut total_distance_m = 0.0;
        let mut polyline: Vec<GeoPoint> = vec![self.graph.node(start_idx).position];
        let mut segments: Vec<Segment> = Vec::with_capacity(edges.len());

        for (i, edge) in edges.iter().enumerate() {
            let from_node = self.graph.node(indices[i]);
            let to_node = self.graph.node(indices[i + 1]);
            total_distance_m += edge.weight_m;
            legs.push(RouteLeg {
                from: from_node.id.clone(),
                to: to_node.id.clone(),
                distance_m: edge.weight_m,
                vertical: edge.vertical,
            });
            if let Some(kind) = edge.vertical {
                floor_transitions.push(FloorTransition {
                    from_floor: from_node.floor_id.clone(),
                    to_floor: to_node.floor_id.clone(),
                    kind,
                    via: to_node.id.clone(),
                });
            }

            // Edge-level geometry keeps the road curvature in the polyline
            let points: Vec<GeoPoint> = if edge.geometry.is_empty() {
                vec![from_node.position, to_node.position]
            } else {
                edge.geometry.clone()
            };
            for &p in &points {
                if polyline.last().map(|&l| l != p).unwrap_or(true) {
                    polyline.push(p);
                }
            }
            segments.push(Segment {
                points: if edge.vertical.is_some() { Vec::new() } else { points },
                vertical: edge.vertical,
                to_floor: to_node.floor_id.clone(),
                at: from_node.position,
            });
        }

        let instructions = instructions::synthesize(&segments);

        PathfindingResult {
            success: true,
            reason: None,
            nodes,
            legs,
            polyline,
            total_distance_m,
            floor_transitions,
            instructions,
            expanded,
        }
    }
}
