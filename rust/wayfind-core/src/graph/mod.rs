//! The navigation graph: an arena of nodes with per-node adjacency lists and
//! an external-id lookup map. Ids go in and out of the public contract; all
//! traversal runs on dense indices.

pub mod builder;
pub mod cache;
pub mod nearest;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, NodeId, TransitionKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Intersection,
    Landmark,
    RoadWaypoint,
    FloorTransitionAnchor,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: NodeId,
    pub position: GeoPoint,
    pub kind: NodeKind,
    /// None for outdoor nodes.
    pub floor_id: Option<String>,
    /// None for outdoor nodes.
    pub building_id: Option<String>,
}

/// Directed edge stored in the source node's adjacency list.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphEdge {
    /// Dense index of the destination node.
    pub to: usize,
    /// Non-negative. Meters for road edges, meters-equivalent penalty for
    /// vertical transitions.
    pub weight_m: f64,
    pub one_way: bool,
    pub vertical: Option<TransitionKind>,
    /// Edge-level waypoints from source to destination, preserving road
    /// curvature. Empty for vertical transitions.
    pub geometry: Vec<GeoPoint>,
}

impl GraphEdge {
    pub fn is_vertical(&self) -> bool {
        self.vertical.is_some()
    }
}

#[derive(Clone, Debug, Default)]
pub struct NavigationGraph {
    nodes: Vec<GraphNode>,
    adjacency: Vec<Vec<GraphEdge>>,
    index: FxHashMap<NodeId, usize>,
}

impl NavigationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Adds a node and returns its dense index. Ids are unique across the
    /// whole graph; adding an id that already exists returns the existing
    /// index and leaves the stored node untouched.
    pub fn add_node(&mut self, node: GraphNode) -> usize {
        if let Some(&idx) = self.index.get(&node.id) {
            return idx;
        }
        let idx = self.nodes.len();
        self.index.insert(node.id.clone(), idx);
        self.nodes.push(node);
        self.adjacency.push(Vec::new());
        idx
    }

    /// Appends a directed edge to `from`'s adjacency list.
    pub fn add_edge(&mut self, from: usize, edge: GraphEdge) {
        debug_assert!(edge.weight_m >= 0.0, "edge weight must be non-negative");
        debug_assert!(edge.to < self.nodes.len());
        self.adjacency[from].push(edge);
    }

    /// Removes every edge from `from` to `to`. Returns how many were removed.
    pub fn remove_edge(&mut self, from: usize, to: usize) -> usize {
        let before = self.adjacency[from].len();
        self.adjacency[from].retain(|e| e.to != to);
        before - self.adjacency[from].len()
    }

    /// Removes a node together with every edge touching it. The last node is
    /// swapped into the vacated slot, so one other node's index changes; the
    /// id map and all edge targets are rewritten accordingly.
    pub fn remove_node(&mut self, idx: usize) -> GraphNode {
        let last = self.nodes.len() - 1;
        let removed = self.nodes.swap_remove(idx);
        self.adjacency.swap_remove(idx);
        self.index.remove(&removed.id);
        if idx != last {
            let moved_id = self.nodes[idx].id.clone();
            self.index.insert(moved_id, idx);
        }
        for edges in &mut self.adjacency {
            edges.retain(|e| e.to != idx);
            for e in edges.iter_mut() {
                if e.to == last {
                    e.to = idx;
                }
            }
        }
        removed
    }

    pub fn node(&self, idx: usize) -> &GraphNode {
        &self.nodes[idx]
    }

    pub fn index_of(&self, id: &NodeId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn node_by_id(&self, id: &NodeId) -> Option<&GraphNode> {
        self.index_of(id).map(|i| &self.nodes[i])
    }

    pub fn edges_from(&self, idx: usize) -> &[GraphEdge] {
        &self.adjacency[idx]
    }

    pub fn out_degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// In-degrees of all nodes in one pass over the adjacency lists.
    pub fn in_degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edges in &self.adjacency {
            for e in edges {
                degrees[e.to] += 1;
            }
        }
        degrees
    }

    pub fn nodes(&self) -> impl Iterator<Item = (usize, &GraphNode)> {
        self.nodes.iter().enumerate()
    }

    /// Connects `a` and `b` with a mirrored pair of directed edges of equal
    /// weight.
    pub fn connect_bidirectional(
        &mut self,
        a: usize,
        b: usize,
        weight_m: f64,
        vertical: Option<TransitionKind>,
        geometry: Vec<GeoPoint>,
    ) {
        let mut reverse_geometry = geometry.clone();
        reverse_geometry.reverse();
        self.add_edge(
            a,
            GraphEdge { to: b, weight_m, one_way: false, vertical, geometry },
        );
        self.add_edge(
            b,
            GraphEdge { to: a, weight_m, one_way: false, vertical, geometry: reverse_geometry },
        );
    }
}
