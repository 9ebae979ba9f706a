//! Converts a spatial-model snapshot into a `NavigationGraph`. Deterministic
//! and idempotent: node and edge identity derive from source entity ids, and
//! every pass iterates the model in declaration order.

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::geometry::haversine_distance;
use crate::graph::{GraphEdge, GraphNode, NavigationGraph, NodeKind};
use crate::models::{GeoPoint, NodeId, TransitionKind};
use crate::options::BuildOptions;
use crate::spatial::{Landmark, LandmarkKind, LayerRef, SpatialModel};

/// Two coordinates closer than this (in degrees on either axis) are treated
/// as the same physical point, so a road endpoint reuses the intersection
/// node it sits on.
const COINCIDENT_EPS_DEG: f64 = 1e-9;

pub fn build_graph(model: &SpatialModel, options: &BuildOptions) -> NavigationGraph {
    let mut builder = GraphBuilder::new(options);
    for layer in model.layers() {
        builder.add_layer(&layer);
    }
    builder.link_vertical_circulation(model);
    let graph = builder.finish();
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        version = model.version,
        "navigation graph built"
    );
    graph
}

fn scope_prefix(layer: &LayerRef<'_>) -> String {
    match (layer.building_id(), layer.floor_id()) {
        (Some(b), Some(f)) => format!("{b}/{f}"),
        _ => "outdoor".to_string(),
    }
}

pub(crate) fn intersection_node_id(layer: &LayerRef<'_>, id: &str) -> NodeId {
    NodeId(format!("{}/ix/{id}", scope_prefix(layer)))
}

pub(crate) fn landmark_node_id(layer: &LayerRef<'_>, id: &str) -> NodeId {
    NodeId(format!("{}/lm/{id}", scope_prefix(layer)))
}

fn waypoint_node_id(layer: &LayerRef<'_>, road_id: &str, point_index: usize) -> NodeId {
    NodeId(format!("{}/wp/{road_id}/{point_index}", scope_prefix(layer)))
}

fn coincident(a: GeoPoint, b: GeoPoint) -> bool {
    (a.lat - b.lat).abs() < COINCIDENT_EPS_DEG && (a.lon - b.lon).abs() < COINCIDENT_EPS_DEG
}

struct GraphBuilder<'a> {
    graph: NavigationGraph,
    options: &'a BuildOptions,
    /// Node-index pairs already joined by a vertical transition.
    linked_vertical: FxHashSet<(usize, usize)>,
}

impl<'a> GraphBuilder<'a> {
    fn new(options: &'a BuildOptions) -> Self {
        Self {
            graph: NavigationGraph::new(),
            options,
            linked_vertical: FxHashSet::default(),
        }
    }

    fn finish(self) -> NavigationGraph {
        self.graph
    }

    fn add_layer(&mut self, layer: &LayerRef<'_>) {
        // Intersections first so road endpoints can reuse them.
        let mut intersections: Vec<usize> = Vec::with_capacity(layer.layer.intersections.len());
        for ix in &layer.layer.intersections {
            let idx = self.graph.add_node(GraphNode {
                id: intersection_node_id(layer, &ix.id),
                position: ix.position,
                kind: NodeKind::Intersection,
                floor_id: layer.floor_id().map(str::to_string),
                building_id: layer.building_id().map(str::to_string),
            });
            intersections.push(idx);
        }

        // Road nodes of this layer, used for landmark linking below.
        let mut road_nodes: Vec<usize> = intersections.clone();

        for road in &layer.layer.roads {
            if road.points.len() < 2 {
                // Degenerate geometry degrades the build instead of failing
                // it; the validator reports the gap.
                warn!(road = %road.id, points = road.points.len(), "skipping road with fewer than two points");
                continue;
            }
            let resolved: Vec<usize> = road
                .points
                .iter()
                .enumerate()
                .map(|(i, &p)| self.resolve_road_point(layer, &road.id, i, p, &intersections, &mut road_nodes))
                .collect();

            for window in resolved.windows(2) {
                let (from, to) = (window[0], window[1]);
                if from == to {
                    continue; // repeated or coincident consecutive points
                }
                let a = self.graph.node(from).position;
                let b = self.graph.node(to).position;
                let weight_m = haversine_distance(a, b);
                if road.one_way {
                    self.graph.add_edge(
                        from,
                        GraphEdge { to, weight_m, one_way: true, vertical: None, geometry: vec![a, b] },
                    );
                } else {
                    self.graph.connect_bidirectional(from, to, weight_m, None, vec![a, b]);
                }
            }
        }

        for lm in &layer.layer.landmarks {
            self.add_landmark(layer, lm, &road_nodes);
        }
    }

    fn resolve_road_point(
        &mut self,
        layer: &LayerRef<'_>,
        road_id: &str,
        point_index: usize,
        point: GeoPoint,
        intersections: &[usize],
        road_nodes: &mut Vec<usize>,
    ) -> usize {
        for &idx in intersections {
            if coincident(self.graph.node(idx).position, point) {
                return idx;
            }
        }
        let idx = self.graph.add_node(GraphNode {
            id: waypoint_node_id(layer, road_id, point_index),
            position: point,
            kind: NodeKind::RoadWaypoint,
            floor_id: layer.floor_id().map(str::to_string),
            building_id: layer.building_id().map(str::to_string),
        });
        road_nodes.push(idx);
        idx
    }

    fn add_landmark(&mut self, layer: &LayerRef<'_>, lm: &Landmark, road_nodes: &[usize]) {
        let kind = match lm.kind {
            LandmarkKind::Vertical { .. } => NodeKind::FloorTransitionAnchor,
            _ => NodeKind::Landmark,
        };
        let idx = self.graph.add_node(GraphNode {
            id: landmark_node_id(layer, &lm.id),
            position: lm.position,
            kind,
            floor_id: layer.floor_id().map(str::to_string),
            building_id: layer.building_id().map(str::to_string),
        });

        // Link to the closest road/intersection node within the connection
        // radius; out-of-range landmarks stay isolated for the validator.
        let mut best: Option<(usize, f64)> = None;
        for &road_idx in road_nodes {
            let d = haversine_distance(lm.position, self.graph.node(road_idx).position);
            if best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((road_idx, d));
            }
        }
        match best {
            Some((road_idx, d)) if d <= self.options.landmark_connection_radius_m => {
                let geometry = vec![lm.position, self.graph.node(road_idx).position];
                self.graph.connect_bidirectional(idx, road_idx, d, None, geometry);
            }
            _ => {
                debug!(landmark = %lm.id, "landmark out of connection radius, left isolated");
            }
        }
    }

    /// Joins per-floor instances of each vertical-circulation landmark with
    /// penalty-weighted transition edges. Counterparts match on kind within
    /// the same building, by equal name or a reciprocal floor listing.
    fn link_vertical_circulation(&mut self, model: &SpatialModel) {
        for building in &model.buildings {
            for floor in &building.floors {
                for lm in &floor.layer.landmarks {
                    let LandmarkKind::Vertical { kind, connected_floors } = &lm.kind else {
                        continue;
                    };
                    for target_floor in connected_floors {
                        let Some(other) = self.find_counterpart(model, building, floor, lm, *kind, target_floor)
                        else {
                            debug!(
                                landmark = %lm.id,
                                floor = %target_floor,
                                "no matching vertical landmark on connected floor"
                            );
                            continue;
                        };
                        self.link_pair(building, floor, lm, target_floor, &other, *kind);
                    }
                }
            }
        }
    }

    fn find_counterpart(
        &self,
        model: &SpatialModel,
        building: &crate::spatial::Building,
        floor: &crate::spatial::Floor,
        lm: &Landmark,
        kind: TransitionKind,
        target_floor: &str,
    ) -> Option<Landmark> {
        let target = model.find_floor(&building.id, target_floor)?;
        target
            .layer
            .landmarks
            .iter()
            .find(|other| match &other.kind {
                LandmarkKind::Vertical { kind: ok, connected_floors: of } => {
                    *ok == kind && (other.name == lm.name || of.iter().any(|f| f == &floor.id))
                }
                _ => false,
            })
            .cloned()
    }

    fn link_pair(
        &mut self,
        building: &crate::spatial::Building,
        floor: &crate::spatial::Floor,
        lm: &Landmark,
        target_floor: &str,
        other: &Landmark,
        kind: TransitionKind,
    ) {
        let here = LayerRef { building: Some(building), floor: Some(floor), layer: &floor.layer };
        let there_floor = building.floors.iter().find(|f| f.id == target_floor);
        let Some(there_floor) = there_floor else { return };
        let there = LayerRef {
            building: Some(building),
            floor: Some(there_floor),
            layer: &there_floor.layer,
        };

        let a = self.graph.index_of(&landmark_node_id(&here, &lm.id));
        let b = self.graph.index_of(&landmark_node_id(&there, &other.id));
        let (Some(a), Some(b)) = (a, b) else { return };
        let key = (a.min(b), a.max(b));
        if !self.linked_vertical.insert(key) {
            return; // already joined from the other floor's listing
        }
        self.graph.connect_bidirectional(
            a,
            b,
            self.options.vertical_transition_penalty_m,
            Some(kind),
            Vec::new(),
        );
    }
}
