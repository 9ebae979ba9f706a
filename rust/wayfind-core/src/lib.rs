pub mod astar;
pub mod errors;
pub mod geometry;
pub mod graph;
pub mod instructions;
pub mod models;
pub mod options;
pub mod spatial;
pub mod validate;

pub use astar::{find_path, CancelToken, Pathfinder};
pub use errors::GraphError;
pub use graph::builder::build_graph;
pub use graph::cache::GraphCache;
pub use graph::nearest::{LinearNearestIndex, NearestNodeIndex};
pub use graph::{GraphEdge, GraphNode, NavigationGraph, NodeKind};
pub use models::{
    FailureReason, FloorTransition, GeoPoint, Maneuver, NodeId, PathfindingResult,
    RouteInstruction, RouteLeg, TransitionKind,
};
pub use options::{BuildOptions, SearchOptions, SearchScope};
pub use spatial::{Building, Floor, Intersection, Landmark, LandmarkKind, Layer, Road, SpatialModel};
pub use validate::{validate, IssueCategory, NetworkStats, Severity, ValidationIssue, ValidationResult};
