use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Stable graph-node identifier, derived from the source entity id and its
/// owning scope so it stays unique across floors and buildings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

/// Kind of vertical-circulation element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionKind {
    Elevator,
    Stairs,
}

/// Why a search call did not produce a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    /// No graph node within the nearest-node radius of a supplied coordinate.
    NoNearbyNode,
    /// Frontier exhausted without reaching the goal.
    NoPathFound,
    /// Caller abandoned the search via the cancellation token.
    Cancelled,
    /// Node-expansion cap hit before the goal was reached.
    ExpansionLimit,
}

/// One traversed edge in a returned route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    pub from: NodeId,
    pub to: NodeId,
    pub distance_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical: Option<TransitionKind>,
}

/// A floor change along a route.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FloorTransition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_floor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_floor: Option<String>,
    pub kind: TransitionKind,
    /// Graph node of the vertical-circulation landmark used.
    pub via: NodeId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Maneuver {
    Depart,
    Straight,
    TurnLeft,
    TurnRight,
    UseElevator,
    UseStairs,
    Arrive,
}

/// One turn-by-turn step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteInstruction {
    pub maneuver: Maneuver,
    pub text: String,
    /// Distance to travel after this maneuver, before the next one. Zero for
    /// vertical transitions and for the arrival step.
    pub distance_m: f64,
    pub position: GeoPoint,
}

/// Result of one `find_path` call. A failed search is a value, not an error;
/// callers render "route not found" states from `reason`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PathfindingResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    /// Ordered node ids from start to goal.
    pub nodes: Vec<NodeId>,
    /// Ordered traversed edges.
    pub legs: Vec<RouteLeg>,
    /// Concatenated edge-level waypoints, preserving road curvature.
    pub polyline: Vec<GeoPoint>,
    pub total_distance_m: f64,
    pub floor_transitions: Vec<FloorTransition>,
    pub instructions: Vec<RouteInstruction>,
    /// Number of nodes expanded by the search.
    pub expanded: u64,
}

impl PathfindingResult {
    pub fn failure(reason: FailureReason, expanded: u64) -> Self {
        Self {
            success: false,
            reason: Some(reason),
            nodes: Vec::new(),
            legs: Vec::new(),
            polyline: Vec::new(),
            total_distance_m: 0.0,
            floor_transitions: Vec::new(),
            instructions: Vec::new(),
            expanded,
        }
    }
}
