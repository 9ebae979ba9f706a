//! Structural audit of the navigation network. Pure function of the graph
//! and the spatial model: issues are collected into the result, never thrown,
//! and statistics are computed regardless of what is found.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::haversine_distance;
use crate::graph::{NavigationGraph, NodeKind};
use crate::models::TransitionKind;
use crate::options::BuildOptions;
use crate::spatial::{LandmarkKind, LayerRef, SpatialModel};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCategory {
    Connectivity,
    Navigation,
    DataIntegrity,
    Performance,
    Accessibility,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub category: IssueCategory,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Aggregate network statistics, always populated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub outdoor_road_length_m: f64,
    pub indoor_road_length_m: f64,
    pub intersection_count: usize,
    pub landmark_count: usize,
    pub vertical_circulation_count: usize,
    pub elevator_count: usize,
    pub stairs_count: usize,
    pub accessible_entrance_count: usize,
    pub connected_components: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
    pub stats: NetworkStats,
}

impl ValidationResult {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }
}

/// Graphs past this size get a performance note about the linear
/// nearest-node scan.
const LARGE_GRAPH_NODE_COUNT: usize = 10_000;

pub fn validate(
    graph: &NavigationGraph,
    model: &SpatialModel,
    options: &BuildOptions,
) -> ValidationResult {
    let mut issues = Vec::new();

    check_isolated_nodes(graph, &mut issues);
    check_dead_end_roads(model, &mut issues);
    check_unreachable_landmarks(model, options, &mut issues);
    check_vertical_circulation(model, &mut issues);
    check_data_integrity(model, &mut issues);
    let components = check_connectivity(graph, &mut issues);

    if graph.node_count() > LARGE_GRAPH_NODE_COUNT {
        issues.push(ValidationIssue {
            severity: Severity::Info,
            category: IssueCategory::Performance,
            message: format!(
                "graph has {} nodes; nearest-node queries scan linearly",
                graph.node_count()
            ),
            suggestion: Some("consider a spatial index implementation of NearestNodeIndex".into()),
        });
    }

    let stats = compute_stats(graph, model, components);
    debug!(
        issues = issues.len(),
        errors = issues.iter().filter(|i| i.severity == Severity::Error).count(),
        "network validation finished"
    );
    ValidationResult { issues, stats }
}

fn scope_label(layer: &LayerRef<'_>) -> String {
    match (layer.building_id(), layer.floor_id()) {
        (Some(b), Some(f)) => format!("building {b} floor {f}"),
        _ => "outdoor".to_string(),
    }
}

fn check_isolated_nodes(graph: &NavigationGraph, issues: &mut Vec<ValidationIssue>) {
    let in_degrees = graph.in_degrees();
    for (idx, node) in graph.nodes() {
        if graph.out_degree(idx) == 0 && in_degrees[idx] == 0 {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                category: IssueCategory::Connectivity,
                message: format!("node {} has no edges in either direction", node.id),
                suggestion: Some("connect it to a nearby road or remove it".into()),
            });
        }
    }
}

/// Road names that declare the dead end intentional. "Court" must stand as
/// its own word so names like "Courtland Avenue" are not exempted.
fn is_cul_de_sac_name(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("cul-de-sac") || name.split_whitespace().any(|w| w == "court")
}

fn check_dead_end_roads(model: &SpatialModel, issues: &mut Vec<ValidationIssue>) {
    for layer in model.layers() {
        for road in &layer.layer.roads {
            if road.points.len() < 2 {
                continue; // reported by the data-integrity check
            }
            if is_cul_de_sac_name(&road.name) {
                continue; // dead end by design
            }
            let touches = |p: crate::models::GeoPoint| {
                layer
                    .layer
                    .intersections
                    .iter()
                    .any(|ix| haversine_distance(ix.position, p) < 1.0)
            };
            let first = *road.points.first().unwrap();
            let last = *road.points.last().unwrap();
            let connected = usize::from(touches(first)) + usize::from(touches(last));
            if connected <= 1 {
                issues.push(ValidationIssue {
                    severity: Severity::Warning,
                    category: IssueCategory::Navigation,
                    message: format!(
                        "road {} ({}) is a dead end: {connected} of 2 endpoints meet an intersection",
                        road.id,
                        scope_label(&layer)
                    ),
                    suggestion: Some("extend the road to an intersection or mark it a cul-de-sac".into()),
                });
            }
        }
    }
}

fn check_unreachable_landmarks(
    model: &SpatialModel,
    options: &BuildOptions,
    issues: &mut Vec<ValidationIssue>,
) {
    for layer in model.layers() {
        for lm in &layer.layer.landmarks {
            let mut min_dist = f64::INFINITY;
            for ix in &layer.layer.intersections {
                min_dist = min_dist.min(haversine_distance(lm.position, ix.position));
            }
            for road in &layer.layer.roads {
                for &p in &road.points {
                    min_dist = min_dist.min(haversine_distance(lm.position, p));
                }
            }
            if min_dist > options.landmark_connection_radius_m {
                let message = if min_dist.is_finite() {
                    format!(
                        "landmark {} ({}) is {:.0} m from the nearest road, beyond the {:.0} m connection radius",
                        lm.id,
                        scope_label(&layer),
                        min_dist,
                        options.landmark_connection_radius_m
                    )
                } else {
                    format!(
                        "landmark {} ({}) has no road or intersection on its layer to connect to",
                        lm.id,
                        scope_label(&layer)
                    )
                };
                issues.push(ValidationIssue {
                    severity: Severity::Warning,
                    category: IssueCategory::Navigation,
                    message,
                    suggestion: Some("add a road or path near this landmark".into()),
                });
            }
        }
    }
}

fn check_vertical_circulation(model: &SpatialModel, issues: &mut Vec<ValidationIssue>) {
    for building in &model.buildings {
        if building.floors.len() <= 1 {
            continue;
        }
        let mut has_vertical = false;
        let mut has_elevator = false;
        for floor in &building.floors {
            for lm in &floor.layer.landmarks {
                match lm.vertical_kind() {
                    Some(TransitionKind::Elevator) => {
                        has_vertical = true;
                        has_elevator = true;
                    }
                    Some(TransitionKind::Stairs) => has_vertical = true,
                    None => {}
                }
            }
        }
        if !has_vertical {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                category: IssueCategory::Accessibility,
                message: format!(
                    "building {} has {} floors but no elevator or stairs landmark",
                    building.id,
                    building.floors.len()
                ),
                suggestion: Some("add a vertical-circulation landmark with connected floors".into()),
            });
        } else if !has_elevator {
            issues.push(ValidationIssue {
                severity: Severity::Warning,
                category: IssueCategory::Accessibility,
                message: format!(
                    "building {} has multiple floors but no elevator",
                    building.id
                ),
                suggestion: Some("wheelchair users cannot change floors here".into()),
            });
        }

        let has_accessible_entrance = building.floors.iter().any(|f| {
            f.layer
                .landmarks
                .iter()
                .any(|lm| matches!(lm.kind, LandmarkKind::Entrance { accessible: true }))
        });
        if !has_accessible_entrance {
            issues.push(ValidationIssue {
                severity: Severity::Info,
                category: IssueCategory::Accessibility,
                message: format!("building {} has no marked accessible entrance", building.id),
                suggestion: Some("mark at least one entrance landmark as accessible".into()),
            });
        }
    }
}

fn check_data_integrity(model: &SpatialModel, issues: &mut Vec<ValidationIssue>) {
    for layer in model.layers() {
        let mut seen: FxHashMap<&str, usize> = FxHashMap::default();
        for id in layer
            .layer
            .intersections
            .iter()
            .map(|i| i.id.as_str())
            .chain(layer.layer.roads.iter().map(|r| r.id.as_str()))
            .chain(layer.layer.landmarks.iter().map(|l| l.id.as_str()))
        {
            *seen.entry(id).or_default() += 1;
        }
        let mut duplicates: Vec<(&str, usize)> =
            seen.into_iter().filter(|&(_, n)| n > 1).collect();
        duplicates.sort();
        for (id, n) in duplicates {
            issues.push(ValidationIssue {
                severity: Severity::Error,
                category: IssueCategory::DataIntegrity,
                message: format!("id {id} appears {n} times in {}", scope_label(&layer)),
                suggestion: Some("entity ids must be unique within a layer".into()),
            });
        }

        for road in &layer.layer.roads {
            if road.points.len() < 2 {
                issues.push(ValidationIssue {
                    severity: Severity::Warning,
                    category: IssueCategory::DataIntegrity,
                    message: format!(
                        "road {} ({}) has {} points and was skipped by the graph builder",
                        road.id,
                        scope_label(&layer),
                        road.points.len()
                    ),
                    suggestion: Some("a road needs at least two polyline points".into()),
                });
            }
        }
    }
}

/// Union-find over the node arena, ignoring edge direction. Returns the
/// component count; every component other than the largest is flagged.
fn check_connectivity(graph: &NavigationGraph, issues: &mut Vec<ValidationIssue>) -> usize {
    if graph.node_count() == 0 {
        return 0;
    }
    let mut uf = UnionFind::new(graph.node_count());
    for (idx, _) in graph.nodes() {
        for edge in graph.edges_from(idx) {
            uf.union(idx, edge.to);
        }
    }

    let mut sizes: FxHashMap<usize, usize> = FxHashMap::default();
    for idx in 0..graph.node_count() {
        *sizes.entry(uf.find(idx)).or_default() += 1;
    }
    let component_count = sizes.len();
    if component_count > 1 {
        let largest = sizes.iter().map(|(&root, &n)| (n, root)).max().map(|(_, r)| r);
        let mut minor: Vec<(usize, usize)> = sizes
            .into_iter()
            .filter(|&(root, _)| Some(root) != largest)
            .collect();
        minor.sort();
        for (root, size) in minor {
            let sample = &graph.node(root).id;
            issues.push(ValidationIssue {
                severity: Severity::Error,
                category: IssueCategory::Connectivity,
                message: format!(
                    "{size} node(s) around {sample} are disconnected from the main network"
                ),
                suggestion: Some("add a road or transition linking this area".into()),
            });
        }
    }
    component_count
}

fn compute_stats(
    graph: &NavigationGraph,
    model: &SpatialModel,
    connected_components: usize,
) -> NetworkStats {
    let mut stats = NetworkStats {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        connected_components,
        ..NetworkStats::default()
    };

    for (_, node) in graph.nodes() {
        match node.kind {
            NodeKind::Intersection => stats.intersection_count += 1,
            NodeKind::Landmark => stats.landmark_count += 1,
            NodeKind::FloorTransitionAnchor => stats.vertical_circulation_count += 1,
            NodeKind::RoadWaypoint => {}
        }
    }

    for layer in model.layers() {
        let outdoor = layer.building.is_none();
        for road in &layer.layer.roads {
            let length: f64 = road
                .points
                .windows(2)
                .map(|w| haversine_distance(w[0], w[1]))
                .sum();
            if outdoor {
                stats.outdoor_road_length_m += length;
            } else {
                stats.indoor_road_length_m += length;
            }
        }
        for lm in &layer.layer.landmarks {
            match &lm.kind {
                LandmarkKind::Vertical { kind: TransitionKind::Elevator, .. } => {
                    stats.elevator_count += 1
                }
                LandmarkKind::Vertical { kind: TransitionKind::Stairs, .. } => {
                    stats.stairs_count += 1
                }
                LandmarkKind::Entrance { accessible: true } => {
                    stats.accessible_entrance_count += 1
                }
                _ => {}
            }
        }
    }
    stats
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            // Path halving
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Anchor on the smaller root so component roots are stable
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}
